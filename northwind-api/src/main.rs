use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use northwind_api::{app, AppState};
use northwind_core::OrderRepository;
use northwind_order::OrderService;
use northwind_store::app_config::{Config, StoreBackend};
use northwind_store::{DbClient, MemoryOrderRepository, PgOrderRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "northwind_api=debug,northwind_order=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Northwind Orders API on port {}", config.server.port);

    let repo: Arc<dyn OrderRepository> = match config.database.backend {
        StoreBackend::Postgres => {
            let db = DbClient::new(&config.database)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Arc::new(PgOrderRepository::new(db.pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; data is lost on restart");
            Arc::new(MemoryOrderRepository::new())
        }
    };

    let app_state = AppState {
        orders: OrderService::new(repo),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
