pub mod bookings;
pub mod chalets;
pub mod cookies;
pub mod mailer;
pub mod sessions;
pub mod users;
