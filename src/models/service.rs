use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A service listing owned by exactly one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub worker_id: String,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub created_at: NaiveDateTime,
}
