use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingDecision, BookingStatus, ChatMessage, Role};
use crate::state::AppState;

/// Creates a booking in `pending` against an existing service and alerts the
/// owning worker. The push dispatch is fire-and-forget: delivery failure is
/// logged and never fails the booking.
pub fn create_booking(
    state: &Arc<AppState>,
    customer_id: &str,
    service_id: &str,
    scheduled_at: NaiveDateTime,
) -> Result<Booking, AppError> {
    let (booking, worker_token, service_name) = {
        let db = state.db.lock().unwrap();

        let customer = queries::get_user(&db, customer_id)?
            .ok_or_else(|| AppError::NotFound(format!("user {customer_id}")))?;
        if customer.role != Role::Customer {
            return Err(AppError::Forbidden(
                "only customers can create bookings".to_string(),
            ));
        }

        let service = queries::get_service(&db, service_id)?
            .ok_or_else(|| AppError::ServiceNotFound(service_id.to_string()))?;

        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            worker_id: service.worker_id.clone(),
            service_id: service.id.clone(),
            status: BookingStatus::Pending,
            scheduled_at,
            created_at: now,
            updated_at: now,
        };
        queries::create_booking(&db, &booking)?;

        let worker_token = queries::get_user(&db, &service.worker_id)?
            .and_then(|w| w.push_token);
        (booking, worker_token, service.name)
    };

    tracing::info!(booking_id = %booking.id, worker_id = %booking.worker_id, "booking created");

    notify(
        state,
        worker_token,
        "New booking request".to_string(),
        format!("You have a new request for {service_name}"),
        serde_json::json!({ "booking_id": booking.id, "kind": "booking_created" }),
    );

    Ok(booking)
}

/// The owning worker accepts or rejects a pending booking.
pub fn respond_to_booking(
    state: &Arc<AppState>,
    booking_id: &str,
    worker_id: &str,
    decision: BookingDecision,
) -> Result<Booking, AppError> {
    let target = decision.target_status();

    let (booking, customer_token) = {
        let db = state.db.lock().unwrap();

        let mut booking = queries::get_booking(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        if booking.worker_id != worker_id {
            return Err(AppError::Forbidden(
                "only the booking's worker may respond".to_string(),
            ));
        }
        if !booking.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "cannot move booking from {} to {}",
                booking.status.as_str(),
                target.as_str()
            )));
        }

        queries::update_booking_status(&db, &booking.id, target)?;
        booking.status = target;
        booking.updated_at = Utc::now().naive_utc();

        let customer_token = queries::get_user(&db, &booking.customer_id)?
            .and_then(|c| c.push_token);
        (booking, customer_token)
    };

    tracing::info!(booking_id = %booking.id, status = booking.status.as_str(), "booking responded");

    let title = match decision {
        BookingDecision::Accept => "Booking accepted",
        BookingDecision::Reject => "Booking declined",
    };
    notify(
        state,
        customer_token,
        title.to_string(),
        format!("Your booking is now {}", booking.status.as_str()),
        serde_json::json!({ "booking_id": booking.id, "kind": "booking_responded" }),
    );

    Ok(booking)
}

/// Either party marks an accepted booking as completed.
pub fn complete_booking(
    state: &Arc<AppState>,
    booking_id: &str,
    actor_id: &str,
) -> Result<Booking, AppError> {
    let (booking, other_token) = {
        let db = state.db.lock().unwrap();

        let mut booking = queries::get_booking(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        if !booking.is_party(actor_id) {
            return Err(AppError::Forbidden(
                "only the booking's customer or worker may complete it".to_string(),
            ));
        }
        if !booking.status.can_transition_to(BookingStatus::Completed) {
            return Err(AppError::InvalidTransition(format!(
                "cannot complete a booking in status {}",
                booking.status.as_str()
            )));
        }

        queries::update_booking_status(&db, &booking.id, BookingStatus::Completed)?;
        booking.status = BookingStatus::Completed;
        booking.updated_at = Utc::now().naive_utc();

        let other_id = counterparty(&booking, actor_id);
        let other_token = queries::get_user(&db, other_id)?.and_then(|u| u.push_token);
        (booking, other_token)
    };

    tracing::info!(booking_id = %booking.id, "booking completed");

    notify(
        state,
        other_token,
        "Booking completed".to_string(),
        "Your booking has been marked completed".to_string(),
        serde_json::json!({ "booking_id": booking.id, "kind": "booking_completed" }),
    );

    Ok(booking)
}

/// Appends to the booking's chat. Allowed only for the two parties, and only
/// while the booking is pending or accepted.
pub fn append_chat_message(
    state: &Arc<AppState>,
    booking_id: &str,
    sender_id: &str,
    text: &str,
) -> Result<ChatMessage, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("message text is required".to_string()));
    }

    let (message, other_token) = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        if !booking.is_party(sender_id) {
            return Err(AppError::Forbidden(
                "only the booking's customer or worker may chat".to_string(),
            ));
        }
        if !booking.status.allows_chat() {
            return Err(AppError::InvalidTransition(format!(
                "chat is closed for a booking in status {}",
                booking.status.as_str()
            )));
        }

        let sent_at = Utc::now().naive_utc();
        let id = queries::insert_chat_message(&db, &booking.id, sender_id, text, &sent_at)?;
        let message = ChatMessage {
            id,
            booking_id: booking.id.clone(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            sent_at,
        };

        let other_id = counterparty(&booking, sender_id);
        let other_token = queries::get_user(&db, other_id)?.and_then(|u| u.push_token);
        (message, other_token)
    };

    notify(
        state,
        other_token,
        "New message".to_string(),
        text.to_string(),
        serde_json::json!({ "booking_id": message.booking_id, "kind": "chat_message" }),
    );

    Ok(message)
}

pub fn get_chat_messages(
    state: &Arc<AppState>,
    booking_id: &str,
    user_id: &str,
) -> Result<Vec<ChatMessage>, AppError> {
    let db = state.db.lock().unwrap();

    let booking = queries::get_booking(&db, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
    if !booking.is_party(user_id) {
        return Err(AppError::Forbidden(
            "only the booking's customer or worker may read the chat".to_string(),
        ));
    }

    Ok(queries::get_chat_messages(&db, &booking.id)?)
}

fn counterparty<'a>(booking: &'a Booking, user_id: &str) -> &'a str {
    if booking.customer_id == user_id {
        &booking.worker_id
    } else {
        &booking.customer_id
    }
}

fn notify(
    state: &Arc<AppState>,
    push_token: Option<String>,
    title: String,
    body: String,
    data: serde_json::Value,
) {
    let Some(token) = push_token else {
        return;
    };
    let state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(e) = state.push.send(&token, &title, &body, data).await {
            tracing::error!(error = %e, "push notification failed");
        }
    });
}
