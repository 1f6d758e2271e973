use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub worker_id: String,
    pub service_id: String,
    pub status: BookingStatus,
    pub scheduled_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn is_party(&self, user_id: &str) -> bool {
        self.customer_id == user_id || self.worker_id == user_id
    }
}

/// Lifecycle: pending -> accepted | rejected, accepted -> completed.
/// Rejected and completed are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Completed,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Completed => "completed",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => BookingStatus::Accepted,
            "completed" => BookingStatus::Completed,
            "rejected" => BookingStatus::Rejected,
            _ => BookingStatus::Pending,
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (*self, next),
            (BookingStatus::Pending, BookingStatus::Accepted)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Accepted, BookingStatus::Completed)
        )
    }

    /// Chat stays open only while the booking is live.
    pub fn allows_chat(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Accepted)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingDecision {
    Accept,
    Reject,
}

impl BookingDecision {
    pub fn target_status(&self) -> BookingStatus {
        match self {
            BookingDecision::Accept => BookingStatus::Accepted,
            BookingDecision::Reject => BookingStatus::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_accepted_or_rejected() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Accepted));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Rejected));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn only_accepted_can_complete() {
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Rejected.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn terminal_states_reject_all_transitions() {
        for next in [
            BookingStatus::Pending,
            BookingStatus::Accepted,
            BookingStatus::Completed,
            BookingStatus::Rejected,
        ] {
            assert!(!BookingStatus::Completed.can_transition_to(next));
            assert!(!BookingStatus::Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn chat_closes_on_terminal_states() {
        assert!(BookingStatus::Pending.allows_chat());
        assert!(BookingStatus::Accepted.allows_chat());
        assert!(!BookingStatus::Completed.allows_chat());
        assert!(!BookingStatus::Rejected.allows_chat());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Accepted,
            BookingStatus::Completed,
            BookingStatus::Rejected,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), status);
        }
    }
}
