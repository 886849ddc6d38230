//! Domain primitives, services and ports.
//!
//! Purpose: define the todo domain independently of transport and storage.
//! Services take the acting identity explicitly and run their work inside
//! store transactions reached through the ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: the closed error taxonomy shared by every layer.
//! - User, List, Item and their payload, update and filter types.
//! - SessionService: server-side session lifecycle.
//! - StoreUserService / StoreItemListService: the store-backed use-cases.

pub mod auth;
pub mod build_info;
pub mod error;
pub mod identity;
pub mod ids;
pub mod item_list_service;
pub mod page;
pub mod ports;
pub mod session;
pub mod stats_monitor;
pub mod store_context;
pub mod todo;
pub mod trace_id;
pub mod user;
pub mod user_service;

#[cfg(test)]
mod service_test_helpers;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::build_info::BuildInfo;
pub use self::error::{Error, ErrorCode};
pub use self::ids::{ItemId, ListId, UserId};
pub use self::item_list_service::StoreItemListService;
pub use self::page::Page;
pub use self::session::{SessionPolicy, SessionService, SessionToken};
pub use self::stats_monitor::{STATS_SAMPLE_PERIOD, StoreStatsMonitor};
pub use self::store_context::{DEFAULT_STORE_DEADLINE, StoreContext};
pub use self::todo::{
    Item, ItemFilter, ItemUpdate, List, ListFilter, ListUpdate, NewItem, NewList,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{API_KEY_LEN, ApiKey, NewUser, User, UserFilter, UserUpdate};
pub use self::user_service::{DEFAULT_LIST_NAME, StoreUserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use todo_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
