//! Guards over the acting identity of a request.
//!
//! Every domain operation receives the acting user explicitly as an
//! `Option<&User>`. `None` means the caller is anonymous.

use tracing::debug;

use super::{Error, User};

/// Return the acting user when it is present and well formed.
///
/// Missing and malformed identities are indistinguishable to the caller;
/// both fail as unauthorised.
///
/// # Examples
/// ```
/// use todo_backend::domain::{identity, ErrorCode};
///
/// let err = identity::require_authenticated(None).expect_err("anonymous");
/// assert!(err.is(ErrorCode::Unauthorized));
/// ```
pub fn require_authenticated(identity: Option<&User>) -> Result<&User, Error> {
    let Some(user) = identity else {
        debug!("rejecting anonymous caller");
        return Err(unauthorized());
    };
    if let Err(err) = user.validate() {
        debug!(user_id = %user.id, reason = %err, "rejecting malformed identity");
        return Err(unauthorized());
    }
    Ok(user)
}

/// Fail when an identity is already attached to the request.
pub fn require_anonymous(identity: Option<&User>) -> Result<(), Error> {
    match identity {
        None => Ok(()),
        Some(user) => {
            debug!(user_id = %user.id, "rejecting authenticated caller on anonymous route");
            Err(unauthorized())
        }
    }
}

/// The canonical unauthorised error.
pub fn unauthorized() -> Error {
    Error::unauthorized("unauthorized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiKey, ErrorCode, UserId};
    use chrono::Utc;
    use rstest::rstest;

    fn user(id: i64, name: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(id),
            name: name.into(),
            email: None,
            api_key: ApiKey::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some(user(0, "alice")))]
    #[case(Some(user(-3, "alice")))]
    #[case(Some(user(1, "")))]
    fn malformed_or_missing_identity_is_unauthorized(#[case] identity: Option<User>) {
        let err = require_authenticated(identity.as_ref()).expect_err("must be rejected");
        assert!(err.is(ErrorCode::Unauthorized));
        assert_eq!(err.message(), "unauthorized");
    }

    #[rstest]
    fn valid_identity_passes() {
        let alice = user(1, "alice");
        let resolved = require_authenticated(Some(&alice)).expect("valid identity");
        assert_eq!(resolved.id, alice.id);
    }

    #[rstest]
    fn anonymous_guard() {
        assert!(require_anonymous(None).is_ok());
        let err = require_anonymous(Some(&user(1, "alice"))).expect_err("identity present");
        assert_eq!(err.kind(), ErrorCode::Unauthorized);
    }
}
