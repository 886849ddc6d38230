//! Shared harness for HTTP integration suites.
//!
//! Builds the full application (session cookies, CORS, trace ids, the
//! not-found fallback) over in-memory stores and a fixed clock.

use std::sync::Arc;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName};
use actix_web::{App, web};

use todo_backend::Trace;
use todo_backend::domain::{
    ApiKey, NewUser, SessionService, StoreContext, StoreItemListService, StoreUserService, User,
};
use todo_backend::inbound::http::error::{json_config, not_found};
use todo_backend::inbound::http::health::HealthState;
use todo_backend::inbound::http::state::HttpState;
use todo_backend::inbound::http::{SESSION_COOKIE_NAME, configure_api, session_middleware};
use todo_backend::middleware::Cors;
use todo_backend::outbound::memory::{MemorySessionStore, MemoryTodoStore};
use todo_backend::test_support::MutableClock;

/// Admin key configured on every harness.
pub const ADMIN_KEY: &str = "0123456789abcdef";

/// Origin allowed by the harness CORS policy.
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Handler state plus the clock driving it.
pub struct Harness {
    pub state: HttpState,
    pub clock: Arc<MutableClock>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::fixed());
        let context = StoreContext::new(Arc::new(MemoryTodoStore::new()), clock.clone());
        let state = HttpState::new(
            Arc::new(StoreUserService::new(context.clone())),
            Arc::new(StoreItemListService::new(context)),
            SessionService::new(Arc::new(MemorySessionStore::new()), clock.clone()),
            ApiKey::from(ADMIN_KEY),
        );
        Self { state, clock }
    }

    /// Register `name` through the domain service, as the signup form would.
    pub async fn register(&self, name: &str) -> User {
        self.state
            .users
            .register_user(NewUser::new(name))
            .await
            .expect("registration succeeds")
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl actix_web::body::MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(HealthState::new()))
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .service(
                web::scope("/api")
                    .wrap(session_middleware(Key::generate(), false, SameSite::Lax))
                    .configure(configure_api),
            )
            .default_service(web::to(not_found))
            .wrap(Cors::new("localhost", ALLOWED_ORIGIN))
            .wrap(Trace)
    }
}

/// `Authorization: Bearer` header carrying `user`'s API key.
pub fn bearer(user: &User) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", user.api_key.expose()))
}

/// The session cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}
