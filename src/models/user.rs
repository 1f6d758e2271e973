use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Unset,
    Customer,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unset => "unset",
            Role::Customer => "customer",
            Role::Worker => "worker",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "customer" => Role::Customer,
            "worker" => Role::Worker,
            _ => Role::Unset,
        }
    }

    /// Strict parse for client input: only the two assignable roles are
    /// accepted, so legacy vocabularies ("hirer") cannot leak back in.
    pub fn parse_assignable(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "worker" => Some(Role::Worker),
            _ => None,
        }
    }
}
