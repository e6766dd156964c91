pub mod admin;
pub mod auth;
pub mod bookings;
pub mod chalets;
pub mod health;
pub mod host;
