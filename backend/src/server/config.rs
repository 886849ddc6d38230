//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use todo_backend::middleware::Cors;

/// Everything `create_server` needs besides the handler state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cors: Cors,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Construct a configuration from cookie and listener settings.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        cors: Cors,
        #[cfg(feature = "metrics")] prometheus: PrometheusMetrics,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            cors,
            #[cfg(feature = "metrics")]
            prometheus,
        }
    }
}
