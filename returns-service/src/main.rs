use dotenvy::dotenv;
use returns_service::config::get_configuration;
use returns_service::services::mailer::{Mailer, MockMailer, SmtpMailer};
use returns_service::services::store::InMemoryStore;
use returns_service::startup::build_router;
use returns_service::AppState;
use service_core::observability::init_tracing;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("returns-service", "info");

    let store = match configuration.store.fixture_path.as_deref() {
        Some(path) => {
            info!("Seeding in-memory store from {}", path);
            Arc::new(InMemoryStore::from_fixture_file(Path::new(path))?)
        }
        None => Arc::new(InMemoryStore::new()),
    };

    let mailer: Arc<dyn Mailer> = if configuration.smtp.enabled {
        Arc::new(SmtpMailer::new(configuration.smtp.clone())?)
    } else {
        info!("SMTP disabled; outbound mail will be logged only");
        Arc::new(MockMailer::new())
    };

    let state = AppState::new(
        store.clone(),
        store,
        mailer,
        configuration.store.admin_email.clone(),
        configuration.server.nonce_secret.clone(),
    );

    let app = build_router(state);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting returns-service on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
