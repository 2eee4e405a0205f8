//! Storage booking service entry point.

mod server;

use actix_web::cookie::Key;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use storage_booking::inbound::http::health::HealthState;
use storage_booking::outbound::persistence::{DbPool, PoolConfig, run_migrations};

fn load_session_key(settings: &ServerSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) if cfg!(debug_assertions) || settings.session_allow_ephemeral() => {
            warn!(path = %key_path.display(), %error, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(error) => Err(std::io::Error::other(format!(
            "failed to read session key at {}: {error}",
            key_path.display()
        ))),
    }
}

async fn connect_database(settings: &ServerSettings) -> std::io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    if settings.run_migrations() {
        run_migrations(url).await.map_err(std::io::Error::other)?;
    }
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(std::io::Error::other)?;
    info!(max_size = settings.pool_max_size(), "database pool ready");
    Ok(Some(pool))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let key = load_session_key(&settings)?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(key, settings.cookie_secure(), bind_addr);
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "storage booking service listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
