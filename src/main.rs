//! customer-api server binary

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use customer_api::api::{create_router, AppState};
use customer_api::config::{AppConfig, LogFormat};
use customer_api::repository::{CustomerRepository, DocumentRepository};
use customer_api::service::CustomerService;
use customer_api::storage::{create_storage, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config)?;

    let storage_config = config
        .storage_runtime()
        .context("invalid storage configuration")?;
    tracing::info!(storage = ?storage_config, "Opening customer store");

    let storage: Arc<dyn StorageBackend> = Arc::from(create_storage(storage_config).await?);
    let repository: Arc<dyn CustomerRepository> = Arc::new(DocumentRepository::new(storage));

    let service = build_service(&config, repository)?;
    let router = create_router(AppState::new(Arc::new(service)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!(%addr, "Listening for HTTP traffic");

    axum::serve(listener, router).await?;

    Ok(())
}

fn build_service(
    config: &AppConfig,
    repository: Arc<dyn CustomerRepository>,
) -> anyhow::Result<CustomerService> {
    let latency = config
        .latency_source()
        .context("invalid latency configuration")?;

    tracing::info!(
        enabled = config.latency.enabled,
        max_ms = config.latency.max_ms,
        high_threshold_ms = config.latency.high_threshold_ms,
        "Simulated latency configured",
    );

    let service = CustomerService::new(repository).with_latency(latency);

    Ok(match config.observation_sink() {
        Some(sink) => service.with_observer(sink),
        None => {
            tracing::info!("Observations disabled via configuration");
            service
        }
    })
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("customer_api=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    Ok(())
}
