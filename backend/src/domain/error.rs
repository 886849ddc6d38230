//! Domain-level error taxonomy.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope.
//!
//! Every error carries a code string. The code is either one of the five
//! [`ErrorCode`] kinds verbatim (`NOT_FOUND`) or a kind-prefixed refinement
//! (`INVALID_NAME_REQUIRED`). Callers that only care about the broad kind use
//! [`Error::is`] or [`Error::kind`]; the refinement survives for logs and
//! clients that want it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::trace_id::TraceId;

/// Closed set of error kinds shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The requested resource does not exist.
    NotFound,
    /// The request is malformed or fails validation.
    Invalid,
    /// Authentication failed, is missing, or the resource is not accessible.
    Unauthorized,
    /// The request collides with existing state.
    Conflict,
    /// An unexpected failure inside the service.
    Internal,
}

impl ErrorCode {
    /// Kinds in the order used for prefix resolution.
    pub const ALL: [Self; 5] = [
        Self::NotFound,
        Self::Invalid,
        Self::Unauthorized,
        Self::Conflict,
        Self::Internal,
    ];

    /// Wire representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Invalid => "INVALID",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
        }
    }

    /// Return true when `code` is this kind or a refinement of it.
    ///
    /// # Examples
    /// ```
    /// use todo_backend::domain::ErrorCode;
    ///
    /// assert!(ErrorCode::Invalid.matches_code("INVALID_NAME_REQUIRED"));
    /// assert!(!ErrorCode::Invalid.matches_code("NOT_FOUND"));
    /// ```
    #[must_use]
    pub fn matches_code(self, code: &str) -> bool {
        code.starts_with(self.as_str())
    }

    /// Resolve a code string to its kind. Unknown codes are internal.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.matches_code(code))
            .unwrap_or(Self::Internal)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use todo_backend::domain::{Error, ErrorCode};
///
/// let err = Error::with_code("INVALID_NAME_REQUIRED", "name required");
/// assert!(err.is(ErrorCode::Invalid));
/// assert_eq!(err.kind(), ErrorCode::Invalid);
/// assert_eq!(err.code(), "INVALID_NAME_REQUIRED");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "NOT_FOUND")]
    code: String,
    #[schema(example = "could not find list with id 7")]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create an error of the given kind.
    ///
    /// Captures the current trace identifier if one is in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_code(code.as_str(), message)
    }

    /// Create an error with a fine-grained, kind-prefixed code.
    ///
    /// An empty code is treated as internal.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let code = if code.trim().is_empty() {
            ErrorCode::Internal.as_str().to_owned()
        } else {
            code
        };
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Full code string, including any refinement suffix.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Broad kind of the error.
    pub fn kind(&self) -> ErrorCode {
        ErrorCode::from_code(&self.code)
    }

    /// Sentinel matching: exact kind or kind-prefixed refinement.
    pub fn is(&self, kind: ErrorCode) -> bool {
        kind.matches_code(&self.code)
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier captured at construction, if any.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Invalid`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Invalid, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for Error {}
