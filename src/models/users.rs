use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::database::{Collection, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    Owner,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
    pub is_approved: bool,
    /// Most recently issued login code, cleared once verified
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    /// Wrong guesses against the current code
    #[serde(default)]
    pub otp_attempts: u32,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Account view that is safe to hand to clients (no hash, no OTP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_approved: bool,
    pub status: UserStatus,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_approved: user.is_approved,
            status: user.status,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Signup draft as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Signup draft held while waiting for the code; the password is already hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSignup {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtp {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub user: PublicUser,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a verified signup. Owners get no session until approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResult {
    pub user: PublicUser,
    pub session: Option<LoginResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUserApproval {
    pub is_approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUserStatus {
    pub status: UserStatus,
}

/// Session record kept server-side under the hash of its token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
