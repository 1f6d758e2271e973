pub mod booking;
pub mod chat;
pub mod service;
pub mod session;
pub mod settings;
pub mod user;

pub use booking::{Booking, BookingDecision, BookingStatus};
pub use chat::ChatMessage;
pub use service::Service;
pub use session::VerificationSession;
pub use settings::{FaqEntry, Settings};
pub use user::{Role, User};
