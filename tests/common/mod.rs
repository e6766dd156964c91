#![allow(dead_code)]

pub mod database;
pub mod test_app;

pub use database::postgres_store;
pub use helpers::{
    generate_test_email, login_as, seeded_store, RecordingNotifier, ADMIN_EMAIL, ADMIN_PASSWORD,
    GUEST_EMAIL, GUEST_PASSWORD, HOST_EMAIL, HOST_PASSWORD, PENDING_HOST_EMAIL, PENDING_HOST_PASSWORD,
};
pub use test_app::TestApp;
