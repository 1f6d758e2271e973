pub mod auth;
pub mod bookings;
pub mod health;
pub mod services;
pub mod settings;
