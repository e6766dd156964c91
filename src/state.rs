use crate::{
    cache::{Cache, CacheConfig},
    config::Config,
    database::RecordStore,
    models::users::{PendingSignup, UserSession},
    services::mailer::OtpNotifier,
};
use std::sync::Arc;

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store holding users, chalets and bookings
    pub store: RecordStore,
    /// Live sessions keyed by token hash
    pub sessions: Cache<UserSession>,
    /// Signup drafts waiting for their code, keyed by email
    pub pending_signups: Cache<PendingSignup>,
    /// Out-of-band channel for one-time codes
    pub notifier: Arc<dyn OtpNotifier>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state with fresh session and signup caches.
    ///
    /// Must be called inside a Tokio runtime (the caches spawn sweepers).
    pub fn new(store: RecordStore, notifier: Arc<dyn OtpNotifier>, config: Config) -> Self {
        let cache_config = CacheConfig {
            cleanup_interval_seconds: 60,
            default_ttl_seconds: None,
        };

        Self {
            store,
            sessions: Cache::new_local(cache_config.clone()),
            pending_signups: Cache::new_local(cache_config),
            notifier,
            config: Arc::new(config),
        }
    }
}
