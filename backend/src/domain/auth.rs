//! Login credentials.
//!
//! Inbound adapters build [`LoginCredentials`] from raw payload strings so the
//! user service only ever sees validated input.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// API key was blank.
    EmptyApiKey,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyApiKey => write!(f, "api key must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `api_key` is non-empty and kept verbatim.
///
/// # Examples
/// ```
/// use todo_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "k3y").expect("valid");
/// assert_eq!(creds.name(), "alice");
/// assert_eq!(creds.api_key(), "k3y");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    name: String,
    api_key: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw name and key inputs.
    pub fn try_from_parts(name: &str, api_key: &str) -> Result<Self, LoginValidationError> {
        let normalized = name.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyName);
        }
        if api_key.is_empty() {
            return Err(LoginValidationError::EmptyApiKey);
        }
        Ok(Self {
            name: normalized.to_owned(),
            api_key: Zeroizing::new(api_key.to_owned()),
        })
    }

    /// Name used for the case-insensitive user lookup.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Key supplied by the caller.
    pub fn api_key(&self) -> &str {
        self.api_key.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
