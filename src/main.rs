use anyhow::Result;
use cafe_orders::config::{AppConfig, StorageBackend};
use cafe_orders::server::ServerBuilder;
use cafe_orders::storage::InMemoryOrderRepository;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let builder = match config.storage.backend {
        StorageBackend::InMemory => {
            tracing::info!("Using in-memory order storage");
            ServerBuilder::new().with_repository(InMemoryOrderRepository::new())
        }
        StorageBackend::Postgres => postgres_builder(&config).await?,
    };

    builder.serve(&config.bind_address()).await
}

#[cfg(feature = "postgres")]
async fn postgres_builder(config: &AppConfig) -> Result<ServerBuilder> {
    use cafe_orders::storage::PostgresOrderRepository;
    use cafe_orders::storage::postgres::{connect, ensure_schema};

    let url = config
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database_url is required for the postgres backend"))?;

    let pool = connect(url, config.storage.max_connections).await?;
    ensure_schema(&pool).await?;
    tracing::info!(
        max_connections = config.storage.max_connections,
        "Using PostgreSQL order storage"
    );

    Ok(ServerBuilder::new().with_repository(PostgresOrderRepository::new(pool)))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_builder(_config: &AppConfig) -> Result<ServerBuilder> {
    anyhow::bail!("the postgres backend requires building with `--features postgres`")
}
