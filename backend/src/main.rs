//! Storefront entry-point: loads settings, prepares persistence, and serves
//! the cart API alongside health checks and OpenAPI docs.

mod server;

use std::path::Path;

use actix_web::cookie::Key;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use storefront::inbound::http::health::HealthState;
use storefront::outbound::persistence::{DbPool, run_pending_migrations};

const MIN_KEY_MATERIAL: usize = 32;

fn load_session_key(path: &Path, allow_ephemeral: bool) -> std::io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.len() >= MIN_KEY_MATERIAL => Ok(Key::derive_from(&bytes)),
        Ok(bytes) => Err(std::io::Error::other(format!(
            "session key at {} holds {} bytes; at least {MIN_KEY_MATERIAL} required",
            path.display(),
            bytes.len()
        ))),
        Err(e) if cfg!(debug_assertions) || allow_ephemeral => {
            warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(e) => Err(std::io::Error::other(format!(
            "failed to read session key at {}: {e}",
            path.display()
        ))),
    }
}

async fn connect_database(settings: &ServerSettings) -> std::io::Result<Option<DbPool>> {
    let Some(pool_config) = settings.pool_config() else {
        return Ok(None);
    };

    if settings.run_migrations() {
        run_pending_migrations(pool_config.database_url())
            .await
            .map_err(std::io::Error::other)?;
    }

    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let key = load_session_key(settings.session_key_file(), settings.session_allow_ephemeral())?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let same_site = settings.same_site().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(key, settings.cookie_secure(), same_site, bind_addr);
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "storefront listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn derives_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&[7_u8; 64]).expect("write key material");

        let first = load_session_key(file.path(), false).expect("key from file");
        let second = load_session_key(file.path(), false).expect("key from file");
        assert_eq!(first.master(), second.master());
    }

    #[rstest]
    fn rejects_short_key_material() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"too short").expect("write key material");

        assert!(load_session_key(file.path(), true).is_err());
    }

    #[rstest]
    fn missing_key_file_falls_back_when_allowed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent");

        assert!(load_session_key(&missing, true).is_ok());
    }
}
