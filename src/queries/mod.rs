pub mod bookings;
pub mod chalets;
pub mod users;
