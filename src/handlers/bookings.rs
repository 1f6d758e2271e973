use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingDecision, ChatMessage, Role};
use crate::services::booking;
use crate::state::AppState;

// POST /bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let scheduled_at =
        NaiveDateTime::parse_from_str(&format!("{} {}", body.date, body.time), "%Y-%m-%d %H:%M")
            .map_err(|_| {
                AppError::Validation(
                    "date must be YYYY-MM-DD and time must be HH:MM".to_string(),
                )
            })?;

    let booking =
        booking::create_booking(&state, &body.customer_id, &body.service_id, scheduled_at)?;
    Ok(Json(booking))
}

// GET /bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let db = state.db.lock().unwrap();
    let booking = queries::get_booking(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    Ok(Json(booking))
}

// GET /bookings/user/:id/:role
pub async fn get_bookings_for_user(
    State(state): State<Arc<AppState>>,
    Path((id, role)): Path<(String, String)>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let role = Role::parse_assignable(&role).ok_or_else(|| {
        AppError::Validation(format!("role must be 'customer' or 'worker', got '{role}'"))
    })?;

    let db = state.db.lock().unwrap();
    let bookings = match role {
        Role::Customer => queries::list_bookings_for_customer(&db, &id)?,
        Role::Worker => queries::list_bookings_for_worker(&db, &id)?,
        Role::Unset => unreachable!("parse_assignable never yields Unset"),
    };
    Ok(Json(bookings))
}

// POST /bookings/:id/respond
#[derive(Deserialize)]
pub struct RespondRequest {
    pub worker_id: String,
    pub decision: BookingDecision,
}

pub async fn respond_to_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking::respond_to_booking(&state, &id, &body.worker_id, body.decision)?;
    Ok(Json(booking))
}

// POST /bookings/:id/complete
#[derive(Deserialize)]
pub struct CompleteRequest {
    pub actor_id: String,
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking::complete_booking(&state, &id, &body.actor_id)?;
    Ok(Json(booking))
}

// POST /bookings/:id/chat
#[derive(Deserialize)]
pub struct ChatRequest {
    pub sender_id: String,
    pub text: String,
}

pub async fn append_chat_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let message = booking::append_chat_message(&state, &id, &body.sender_id, &body.text)?;
    Ok(Json(message))
}

// GET /bookings/:id/chat?user_id=
#[derive(Deserialize)]
pub struct ChatQuery {
    pub user_id: Option<String>,
}

pub async fn get_chat_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::Validation("user_id query parameter is required".to_string()))?;

    let messages = booking::get_chat_messages(&state, &id, &user_id)?;
    Ok(Json(messages))
}
