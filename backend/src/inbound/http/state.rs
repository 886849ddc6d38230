//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only depend on domain ports, so
//! they stay testable with in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{ItemListService, UserService};
use crate::domain::{ApiKey, SessionService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User account use-cases.
    pub users: Arc<dyn UserService>,
    /// List and item use-cases.
    pub lists: Arc<dyn ItemListService>,
    /// Server-side session lifecycle.
    pub sessions: SessionService,
    /// Shared secret guarding the administrative routes.
    pub admin_key: ApiKey,
}

impl HttpState {
    /// Bundle the given services.
    pub fn new(
        users: Arc<dyn UserService>,
        lists: Arc<dyn ItemListService>,
        sessions: SessionService,
        admin_key: ApiKey,
    ) -> Self {
        Self {
            users,
            lists,
            sessions,
            admin_key,
        }
    }
}
