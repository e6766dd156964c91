use reva::{
    build_router, database::seed_if_empty, load_config, services::mailer::notifier_from_config,
    AppState, RecordStore,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reva=info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!(config = %config, "Configuration loaded");

    let store = RecordStore::open(&config.storage).await?;
    if config.seed.enabled {
        let report = seed_if_empty(&store).await?;
        tracing::info!(
            users = report.users,
            chalets = report.chalets,
            bookings = report.bookings,
            "Seed data applied"
        );
    }

    let notifier = notifier_from_config(&config.email)?;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(store.clone(), notifier, config);
    let app = build_router(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
