//! Server settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `TODO_*` environment variables over an
//! optional configuration file. Optional fields fall back to the defaults
//! exposed by the accessor methods.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Default listen address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8058";
/// Default pool size.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Domain on which CORS headers are emitted.
pub const DEFAULT_DOMAIN: &str = "localhost";
/// Default tracing directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default deadline for the store work of one domain operation.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 6;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The listen address did not parse.
    #[error("invalid http address {value:?}: {source}")]
    HttpAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Configuration for the todo server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TODO")]
pub struct Settings {
    /// PostgreSQL connection string. In-memory stores are used when unset.
    pub db_dsn: Option<String>,
    /// Log every store operation with its elapsed time.
    #[ortho_config(default = false)]
    pub db_query_logging: bool,
    /// Maximum pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Listen address.
    pub http_addr: Option<String>,
    /// Administrative API key. A random key is generated when unset.
    pub api_key: Option<String>,
    /// Public domain of the server.
    pub domain: Option<String>,
    /// Whether clients reach the server over TLS.
    #[ortho_config(default = false)]
    pub tls: bool,
    /// Comma-separated origins granted cross-origin access on localhost;
    /// `*` allows any origin.
    pub cors_allowed_origins: Option<String>,
    /// Default tracing filter directive.
    pub log_level: Option<String>,
    /// Store deadline per domain operation, in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::HttpAddr`] when the configured value is not a
    /// socket address.
    pub fn http_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.http_addr.as_deref().unwrap_or(DEFAULT_HTTP_ADDR);
        value.parse().map_err(|source| SettingsError::HttpAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }

    pub fn cors_allowed_origins(&self) -> &str {
        self.cors_allowed_origins.as_deref().unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Store deadline per domain operation.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// The configured admin key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "TODO_DB_DSN",
        "TODO_DB_QUERY_LOGGING",
        "TODO_DB_MAX_CONNECTIONS",
        "TODO_HTTP_ADDR",
        "TODO_API_KEY",
        "TODO_DOMAIN",
        "TODO_TLS",
        "TODO_CORS_ALLOWED_ORIGINS",
        "TODO_LOG_LEVEL",
        "TODO_REQUEST_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> Settings {
        Settings::load_from_iter([OsString::from("todo-server")]).expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert!(settings.db_dsn.is_none());
        assert!(!settings.db_query_logging);
        assert!(!settings.tls);
        assert_eq!(settings.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(
            settings.http_addr().expect("default address"),
            DEFAULT_HTTP_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(settings.domain(), "localhost");
        assert_eq!(settings.cors_allowed_origins(), "");
        assert_eq!(settings.log_level(), "info");
        assert_eq!(settings.request_timeout(), Duration::from_secs(6));
        assert!(settings.api_key().is_none());
    }

    fn env_with(overrides: &[(&str, &str)]) -> [(&'static str, Option<String>); 10] {
        VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        })
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("TODO_DB_DSN", "postgres://localhost/todo"),
            ("TODO_DB_QUERY_LOGGING", "true"),
            ("TODO_DB_MAX_CONNECTIONS", "3"),
            ("TODO_HTTP_ADDR", "127.0.0.1:9000"),
            ("TODO_API_KEY", "0123456789abcdef"),
            ("TODO_DOMAIN", "todo.example.com"),
            ("TODO_TLS", "true"),
            ("TODO_REQUEST_TIMEOUT_SECS", "2"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.db_dsn.as_deref(), Some("postgres://localhost/todo"));
        assert!(settings.db_query_logging);
        assert!(settings.tls);
        assert_eq!(settings.db_max_connections(), 3);
        assert_eq!(
            settings.http_addr().expect("address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(settings.api_key(), Some("0123456789abcdef"));
        assert_eq!(settings.domain(), "todo.example.com");
        assert_eq!(settings.request_timeout(), Duration::from_secs(2));
    }

    #[rstest]
    fn malformed_address_is_reported() {
        let _guard = lock_env(env_with(&[("TODO_HTTP_ADDR", "not an address")]));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.http_addr(),
            Err(SettingsError::HttpAddr { .. })
        ));
    }
}
