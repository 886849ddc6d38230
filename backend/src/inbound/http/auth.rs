//! Request identity resolution and the administrative key guard.
//!
//! Identity is resolved once per request, in order:
//!
//! 1. a live server-side session named by the session cookie;
//! 2. an `Authorization: Bearer <api key>` header, where a key that matches
//!    nobody fails the request instead of falling through;
//! 3. otherwise the caller is anonymous.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{ApiResult, Error, ErrorCode, User};

/// Header carrying the administrative API key.
pub const ADMIN_KEY_HEADER: &str = "Todo-Api-Key";

fn missing_state() -> Error {
    Error::internal("http state is not configured")
}

/// The identity attached to the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity(Option<User>);

impl RequestIdentity {
    /// The acting user, or `None` for anonymous callers.
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Extract the API key from an `Authorization: Bearer` header.
///
/// The scheme is matched case-insensitively; an empty token counts as no
/// header at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

/// Resolve the acting user for one request.
///
/// # Errors
///
/// Fails `UNAUTHORIZED` when a bearer key matches no user, and propagates
/// store failures.
pub async fn resolve_identity(
    state: &HttpState,
    session: &SessionContext,
    bearer: Option<String>,
) -> ApiResult<Option<User>> {
    if let Some(token) = session.token() {
        if let Some(user) = state.sessions.load(&token).await? {
            debug!(user_id = %user.id, "identity from session");
            return Ok(Some(user));
        }
    }

    let Some(api_key) = bearer else {
        return Ok(None);
    };
    match state.users.find_user_by_api_key(&api_key).await {
        Ok(user) => {
            debug!(user_id = %user.id, "identity from bearer token");
            Ok(Some(user))
        }
        Err(err) if err.is(ErrorCode::NotFound) => {
            warn!("bearer token matched no user");
            Err(Error::unauthorized("invalid credentials"))
        }
        Err(err) => Err(err),
    }
}

impl FromRequest for RequestIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        let bearer = bearer_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(missing_state)?;
            let session = session.await?;
            let user = resolve_identity(&state, &session, bearer).await?;
            Ok(Self(user))
        })
    }
}

/// Proof that the request carried the administrative API key.
///
/// A missing or wrong key answers `NOT_FOUND` so the administrative routes
/// stay hidden.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

fn check_admin_key(req: &HttpRequest) -> ApiResult<AdminAccess> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(missing_state)?;
    let presented = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if state.admin_key.verify(presented) {
        Ok(AdminAccess)
    } else {
        warn!(
            peer = ?req.peer_addr(),
            path = req.path(),
            "rejected administrative request"
        );
        Err(Error::not_found("not found"))
    }
}

impl FromRequest for AdminAccess {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(check_admin_key(req).map_err(Into::into))
    }
}

#[cfg(test)]
mod tests;
