//! Backend entry-point: loads settings, prepares persistence and serves the
//! proposal API with health probes and OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use trip_canvas::inbound::http::health::HealthState;
use trip_canvas::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("failed to load server settings")?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let mut config = ServerConfig::new(bind_addr);

    match settings.database_url.as_deref() {
        Some(database_url) => {
            if settings.run_migrations {
                run_migrations(database_url)
                    .await
                    .wrap_err("failed to apply migrations")?;
            }
            let pool = DbPool::new(
                PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
            )
            .await
            .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; serving fixture proposals"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(%bind_addr, "trip canvas backend listening");
    server.await.wrap_err("server terminated with an error")
}
