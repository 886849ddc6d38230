//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into consistent JSON responses. Status mapping is
//! prefix-aware, so `INVALID_NAME_REQUIRED` answers 400 like `INVALID`.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use tracing::{debug, error};

use crate::domain::{ApiResult, Error, ErrorCode, TRACE_ID_HEADER};

/// Message returned for every unauthorised response.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
/// Message returned for every internal failure.
pub const INTERNAL_MESSAGE: &str = "internal error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Invalid => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The payload clients are allowed to see.
///
/// Unauthorised and internal errors lose their message and details; the
/// trace id survives so operators can find the log line.
fn client_view(error: &Error) -> Error {
    let kind = error.kind();
    let message = match kind {
        ErrorCode::Unauthorized => UNAUTHORIZED_MESSAGE,
        ErrorCode::Internal => INTERNAL_MESSAGE,
        _ => return error.clone(),
    };
    let redacted = Error::new(kind, message);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        match self.kind() {
            ErrorCode::Internal => error!(
                code = self.code(),
                message = self.message(),
                trace_id = self.trace_id(),
                "internal error"
            ),
            ErrorCode::Unauthorized => debug!(
                code = self.code(),
                message = self.message(),
                "unauthorised request"
            ),
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self))
    }
}

/// JSON extractor configuration answering malformed bodies with `INVALID`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!(error = %err, "rejecting request body");
        Error::invalid(format!("invalid request body: {err}")).into()
    })
}

/// Parse the integer path segment `name`.
///
/// # Errors
///
/// Returns `INVALID` "`name` must be an integer" when the segment is missing
/// or not a 64-bit integer.
pub fn path_id(req: &HttpRequest, name: &str) -> ApiResult<i64> {
    req.match_info()
        .get(name)
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| Error::invalid(format!("{name} must be an integer")))
}

/// Default service for unknown routes.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("not found"))
}
