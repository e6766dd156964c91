//! First-run fixture loading.

use chrono::Utc;
use serde::Deserialize;

use super::{Record, RecordStore};
use crate::{
    error::{Error, Result},
    models::{
        bookings::Booking,
        chalets::Chalet,
        users::{User, UserRole, UserStatus},
    },
    services::users::hash_password,
};

const SEED_FIXTURES: &str = include_str!("../../fixtures/seed.yaml");

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: String,
    name: String,
    email: String,
    role: UserRole,
    password: String,
    is_approved: bool,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Fixtures {
    users: Vec<SeedUser>,
    chalets: Vec<Chalet>,
    bookings: Vec<Booking>,
}

/// How many records were inserted per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub chalets: usize,
    pub bookings: usize,
}

fn parse_fixtures(source: &str) -> Result<Fixtures> {
    serde_yaml::from_str(source)
        .map_err(|e| Error::Internal(format!("Invalid seed fixtures: {}", e)))
}

async fn put_all<R: Record>(store: &RecordStore, records: Vec<R>) -> Result<usize> {
    let count = records.len();
    for record in &records {
        store.put(record).await?;
    }
    Ok(count)
}

/// Populate every empty collection from the embedded fixtures. Collections
/// that already hold records are left untouched.
pub async fn seed_if_empty(store: &RecordStore) -> Result<SeedReport> {
    let fixtures = parse_fixtures(SEED_FIXTURES)?;
    let mut report = SeedReport::default();

    if store.count::<User>().await? == 0 {
        let now = Utc::now();
        let mut users = Vec::with_capacity(fixtures.users.len());
        for seed in fixtures.users {
            users.push(User {
                id: seed.id,
                name: seed.name,
                email: seed.email.to_lowercase(),
                role: seed.role,
                password_hash: hash_password(&seed.password)?,
                is_approved: seed.is_approved,
                otp: None,
                otp_expires_at: None,
                otp_attempts: 0,
                status: UserStatus::Active,
                phone: seed.phone,
                created_at: now,
            });
        }
        report.users = put_all(store, users).await?;
    }

    if store.count::<Chalet>().await? == 0 {
        report.chalets = put_all(store, fixtures.chalets).await?;
    }

    if store.count::<Booking>().await? == 0 {
        report.bookings = put_all(store, fixtures.bookings).await?;
    }

    tracing::info!(
        users = report.users,
        chalets = report.chalets,
        bookings = report.bookings,
        "Seed fixtures loaded"
    );

    Ok(report)
}
