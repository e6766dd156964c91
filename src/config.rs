use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
    pub email: EmailConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which record store backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// How long a login OTP stays valid
    pub otp_ttl_seconds: i64,
    /// How long a pending signup (draft + code) is kept
    pub signup_ttl_seconds: u64,
    /// Session lifetime after OTP verification
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingConfig {
    /// Platform share of a booking's total price (0.0..=1.0)
    pub commission_rate: f64,
}

/// Transactional email API used to deliver one-time codes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    #[serde(skip_serializing, default)]
    pub public_key: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedConfig {
    pub enabled: bool,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            // e.g., REVA__BOOKING__COMMISSION_RATE="0.12"
            .add_source(
                config::Environment::with_prefix("REVA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.booking.validate()
    }
}

impl BookingConfig {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !self.commission_rate.is_finite() || !(0.0..=1.0).contains(&self.commission_rate) {
            return Err(config::ConfigError::Message(format!(
                "booking.commission_rate must be between 0.0 and 1.0, got {}",
                self.commission_rate
            )));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Constructs the database connection string.
    pub fn connection_string(&self) -> SecretString {
        let password = self
            .password
            .as_ref()
            .map(|p| p.expose_secret().to_string())
            .unwrap_or_default();
        SecretString::from(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, password, self.host, self.port, self.database
        ))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: None,
            host: "localhost".to_string(),
            port: 5432,
            database: "reva".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_seconds: 600,
            signup_ttl_seconds: 900,
            session_ttl_seconds: 60 * 60 * 24 * 7,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            commission_rate: 0.15,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: None,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets are skipped by serde
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}
