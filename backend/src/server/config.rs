//! Server settings loaded via OrthoConfig and the resolved server config.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::Key;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use storage_booking::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Layered settings: defaults, then config file, then `STORAGE_BOOKING_*`
/// environment variables, then command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STORAGE_BOOKING")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps bookings in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a generated session key when the key file is missing.
    pub session_allow_ephemeral: Option<bool>,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: Option<bool>,
    /// Apply pending schema migrations before serving.
    pub run_migrations: Option<bool>,
}

impl ServerSettings {
    /// Parsed bind address.
    ///
    /// # Errors
    /// Returns [`std::io::ErrorKind::InvalidInput`] for malformed addresses.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }

    /// Configured key file or the mounted-secret default.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Configured pool size or the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Whether a missing key file may be replaced by a generated key.
    /// Off unless enabled.
    pub fn session_allow_ephemeral(&self) -> bool {
        self.session_allow_ephemeral.unwrap_or(false)
    }

    /// Whether session cookies carry `Secure`. On unless disabled.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Whether migrations run at startup. Off unless enabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(false)
    }
}

/// Everything `create_server` needs once settings are resolved.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration without a database; bookings are kept in memory.
    #[must_use]
    pub const fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            bind_addr,
            db_pool: None,
        }
    }

    /// Back the booking ports with PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "STORAGE_BOOKING_BIND_ADDR",
        "STORAGE_BOOKING_DATABASE_URL",
        "STORAGE_BOOKING_POOL_MAX_SIZE",
        "STORAGE_BOOKING_SESSION_KEY_FILE",
        "STORAGE_BOOKING_SESSION_ALLOW_EPHEMERAL",
        "STORAGE_BOOKING_COOKIE_SECURE",
        "STORAGE_BOOKING_RUN_MIGRATIONS",
    ];

    fn load() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("storage-booking")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_suit_local_development() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(
            settings.session_key_file(),
            PathBuf::from(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(settings.cookie_secure());
        assert!(!settings.run_migrations());
        assert!(!settings.session_allow_ephemeral());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("STORAGE_BOOKING_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "STORAGE_BOOKING_DATABASE_URL",
                Some("postgres://booking@db/storage".to_owned()),
            ),
            ("STORAGE_BOOKING_POOL_MAX_SIZE", Some("4".to_owned())),
            (
                "STORAGE_BOOKING_SESSION_KEY_FILE",
                Some("/tmp/session.key".to_owned()),
            ),
            ("STORAGE_BOOKING_SESSION_ALLOW_EPHEMERAL", Some("true".to_owned())),
            ("STORAGE_BOOKING_COOKIE_SECURE", Some("false".to_owned())),
            ("STORAGE_BOOKING_RUN_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("parses"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://booking@db/storage")
        );
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.session_key_file(), PathBuf::from("/tmp/session.key"));
        assert!(settings.session_allow_ephemeral());
        assert!(!settings.cookie_secure());
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn malformed_bind_address_is_rejected() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        let mut settings = load();
        settings.bind_addr = Some("not-an-address".to_owned());

        let err = settings.bind_addr().expect_err("invalid address");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
