pub mod booking;
pub mod otp;
pub mod push;
pub mod sms;
