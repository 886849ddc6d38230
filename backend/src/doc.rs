//! OpenAPI documentation for the todo API.
//!
//! [`ApiDoc`] collects every handler under `/api` together with the domain
//! schemas they exchange. Swagger UI serves it at `/docs` in debug builds and
//! `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    BuildInfo, Error, ErrorCode, Item, ItemUpdate, List, ListUpdate, NewItem, NewList, NewUser,
    User, UserUpdate,
};
use crate::inbound::http::auth::ADMIN_KEY_HEADER;
use crate::inbound::http::users::LoginRequest;

/// Register the three ways a caller can authenticate.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/user/login.",
            ))),
        );
        components.add_security_scheme(
            "bearer_key",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("The user's API key."))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                ADMIN_KEY_HEADER,
                "Administrative API key.",
            ))),
        );
    }
}

/// OpenAPI document for the todo API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Todo API",
        description = "Multi-user todo lists with session and API key authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("session_cookie" = []), ("bearer_key" = [])),
    paths(
        crate::inbound::http::build::build_info,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::current_user_key,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::todos::list_lists,
        crate::inbound::http::todos::create_list,
        crate::inbound::http::todos::get_list,
        crate::inbound::http::todos::update_list,
        crate::inbound::http::todos::delete_list,
        crate::inbound::http::todos::create_item,
        crate::inbound::http::todos::get_item,
        crate::inbound::http::todos::update_item,
        crate::inbound::http::todos::delete_item,
    ),
    components(schemas(
        BuildInfo, Error, ErrorCode, User, NewUser, UserUpdate, LoginRequest, List, NewList,
        ListUpdate, Item, NewItem, ItemUpdate
    )),
    tags(
        (name = "users", description = "Accounts, login and sessions"),
        (name = "admin", description = "Routes guarded by the administrative API key"),
        (name = "todos", description = "Lists and their items"),
        (name = "health", description = "Liveness and readiness probes"),
        (name = "meta", description = "Build details")
    )
)]
pub struct ApiDoc;
