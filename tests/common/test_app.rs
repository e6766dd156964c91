use std::{net::SocketAddr, sync::Arc};

use reqwest::{redirect::Policy, Client};
use reva::{build_router, AppState, Config};
use tokio::net::TcpListener;

use crate::common::{seeded_store, RecordingNotifier};

/// HTTP test application wrapper
///
/// Manages an Axum server running on a random port for HTTP testing.
/// Each test gets its own server and its own seeded in-memory store, so tests
/// run in parallel without sharing state.
pub struct TestApp {
    /// Server base URL (e.g., "http://127.0.0.1:54321")
    pub address: String,
    /// HTTP client for making requests
    pub client: Client,
    /// State shared with the server, for direct inspection
    pub state: AppState,
    /// Every code the server tried to send
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Create a new HTTP test app with server on random port
    ///
    /// # How it works:
    /// 1. Seeds an in-memory record store with the demo fixtures
    /// 2. Builds the full router with a recording notifier
    /// 3. Binds to port 0 (OS assigns random available port)
    /// 4. Starts server in background task
    /// 5. Creates reqwest client configured for testing
    pub async fn new() -> Self {
        let store = seeded_store().await;
        let notifier = RecordingNotifier::new();
        let state = AppState::new(store, notifier.clone(), Config::default());
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Create HTTP client with persistent cookies
        let client = Client::builder()
            .redirect(Policy::none())
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            client,
            state,
            notifier,
        }
    }

    /// Get the full URL for an API endpoint
    ///
    /// # Example
    /// ```rust
    /// let url = app.url("/api/v1/health");
    /// // Returns: "http://127.0.0.1:54321/api/v1/health"
    /// ```
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// A client without the shared cookie jar, for anonymous requests.
    pub fn anonymous_client(&self) -> Client {
        Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}
