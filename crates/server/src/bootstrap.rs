use std::sync::Arc;

use axum::Router;
use storefront_core::config::{AppConfig, ConfigError, LoadOptions};
use storefront_db::{
    connect_with_settings, migrations, DbPool, DemoCatalog, ProductRepository, RepositoryError,
    SqlProductRepository,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{catalog, health, service::CatalogService};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("demo catalog seed failed: {0}")]
    DemoSeed(#[source] RepositoryError),
}

impl Application {
    /// Catalog and health routes over the application's pool, with request tracing.
    pub fn router(&self) -> Router {
        let products: Arc<dyn ProductRepository> =
            Arc::new(SqlProductRepository::new(self.db_pool.clone()));
        build_router(CatalogService::new(products), self.db_pool.clone())
    }
}

pub fn build_router(service: CatalogService, db_pool: DbPool) -> Router {
    catalog::router(service).merge(health::router(db_pool)).layer(TraceLayer::new_for_http())
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    if config.catalog.seed_demo_data {
        let seeded = DemoCatalog::load(&db_pool).await.map_err(BootstrapError::DemoSeed)?;
        info!(
            event_name = "system.bootstrap.demo_catalog_seeded",
            correlation_id = "bootstrap",
            products = seeded.products_seeded.len(),
            "demo catalog loaded"
        );
    }

    Ok(Application { config, db_pool })
}
