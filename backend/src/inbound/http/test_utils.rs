//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use super::state::HttpState;
use crate::domain::{
    ApiKey, SessionService, StoreContext, StoreItemListService, StoreUserService,
};
use crate::outbound::memory::{MemorySessionStore, MemoryTodoStore};
use crate::test_support::MutableClock;

/// Admin key used by [`memory_state`].
pub const TEST_ADMIN_KEY: &str = "adminadminadmin1";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag for
/// plain HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Handler state over fresh in-memory stores and a fixed clock.
pub fn memory_state() -> HttpState {
    let clock = Arc::new(MutableClock::fixed());
    let context = StoreContext::new(Arc::new(MemoryTodoStore::new()), clock.clone());
    HttpState::new(
        Arc::new(StoreUserService::new(context.clone())),
        Arc::new(StoreItemListService::new(context)),
        SessionService::new(Arc::new(MemorySessionStore::new()), clock),
        ApiKey::from(TEST_ADMIN_KEY),
    )
}
