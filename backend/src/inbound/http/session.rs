//! Session cookie helpers keeping handlers free of framework details.
//!
//! The encrypted cookie carries only the opaque session token. The record it
//! points at lives in the configured session store.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionToken};

pub(crate) const TOKEN_KEY: &str = "token";

/// Newtype wrapper exposing token-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Token stored in the cookie, if any.
    ///
    /// A cookie holding something other than a token string is treated as
    /// absent.
    pub fn token(&self) -> Option<SessionToken> {
        match self.0.get::<String>(TOKEN_KEY) {
            Ok(token) => token.map(SessionToken::from),
            Err(error) => {
                warn!(%error, "ignoring undecodable session cookie");
                None
            }
        }
    }

    /// Store `token` in a freshly rotated cookie.
    pub fn persist(&self, token: &SessionToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(TOKEN_KEY, token.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Clear the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
