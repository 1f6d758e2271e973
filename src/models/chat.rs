use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub booking_id: String,
    pub sender_id: String,
    pub text: String,
    pub sent_at: NaiveDateTime,
}
