//! HTTP inbound adapter exposing the JSON API under `/api`.
//!
//! Handlers stay thin: they resolve the acting identity, parse the request
//! and delegate to the domain services held in [`state::HttpState`].

pub mod auth;
pub mod build;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod todos;
pub mod users;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::web;

pub use crate::domain::ApiResult;

/// Name of the encrypted session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Register every API handler. Mount under `/api`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use todo_backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(build::build_info)
        .service(health::ready)
        .service(health::live);
    users::configure(cfg);
    todos::configure(cfg);
}

/// Cookie middleware carrying the opaque session token.
///
/// The cookie is encrypted, HTTP-only and lives as long as the server-side
/// session deadline.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(24)),
        )
        .build()
}
