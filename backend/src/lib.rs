//! Todo backend library modules.
//!
//! The domain is transport-agnostic; `inbound` adapts HTTP onto it and
//! `outbound` implements its storage, session and metrics ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
