//! User account handlers.
//!
//! ```text
//! POST   /api/user/login {"name":"alice","apiKey":"..."}
//! GET    /api/user
//! GET    /api/user/key
//! DELETE /api/user/logout
//! GET    /api/users            (admin key)
//! POST   /api/users {"name":"alice"}
//! PATCH  /api/users/{id} {"email":"alice@example.com"}
//! DELETE /api/users/{id}       (admin key)
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::auth::{AdminAccess, RequestIdentity};
use super::error::path_id;
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::identity::{require_anonymous, require_authenticated, unauthorized};
use crate::domain::{
    ApiResult, Error, LoginCredentials, NewUser, User, UserFilter, UserId, UserUpdate,
};

/// Login request body for `POST /api/user/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name, matched without regard to case.
    #[serde(default)]
    pub name: String,
    /// The user's API key.
    #[serde(default)]
    pub api_key: String,
}

/// Authenticate by name and API key and establish a session.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    require_anonymous(identity.user())?;
    let LoginRequest { name, api_key } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&name, &api_key).map_err(|err| {
        debug!(reason = %err, "rejecting malformed login");
        Error::unauthorized("invalid credentials")
    })?;
    let user = state.users.login(&credentials).await?;
    let token = state.sessions.create(&user).await?;
    session.persist(&token)?;
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    delete,
    path = "/api/user/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[delete("/user/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    require_authenticated(identity.user())?;
    if let Some(token) = session.token() {
        state.sessions.destroy(&token).await?;
    }
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's own user record, read fresh from the store.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<User>> {
    let me = require_authenticated(identity.user())?;
    let user = state.users.find_user_by_id(me.id).await?;
    Ok(web::Json(user))
}

/// The caller's API key as a JSON string.
#[utoipa::path(
    get,
    path = "/api/user/key",
    responses(
        (status = 200, description = "API key", body = String),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUserKey"
)]
#[get("/user/key")]
pub async fn current_user_key(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<String>> {
    let me = require_authenticated(identity.user())?;
    // Session snapshots never carry the key.
    let user = state.users.find_user_by_id(me.id).await?;
    Ok(web::Json(user.api_key.expose().to_owned()))
}

/// Every user, ordered by id.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 404, description = "Missing or wrong admin key", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listUsers",
    security(("admin_key" = []))
)]
#[get("/users")]
pub async fn list_users(
    _admin: AdminAccess,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.find_users(UserFilter::default()).await?;
    Ok(web::Json(users))
}

/// Register a user together with their first list.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Name already taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<NewUser>,
) -> ApiResult<HttpResponse> {
    require_anonymous(identity.user())?;
    let user = state.users.register_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Update the caller's own profile and refresh their session.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Name already taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    session: SessionContext,
    payload: web::Json<UserUpdate>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::new(path_id(&req, "id")?);
    let me = require_authenticated(identity.user())?;
    if me.id != id {
        debug!(user_id = %me.id, target = %id, "rejecting update of another user");
        return Err(unauthorized());
    }
    let user = state.users.update_user(id, payload.into_inner()).await?;
    // Only after the update has committed.
    if let Some(previous) = session.token() {
        let token = state.sessions.renew(Some(&previous), &user).await?;
        session.persist(&token)?;
    }
    Ok(web::Json(user))
}

/// Delete any user and everything they own.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown user, or missing or wrong admin key", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteUser",
    security(("admin_key" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    _admin: AdminAccess,
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path_id(&req, "id")?);
    state.users.delete_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the user handlers on a service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(current_user_key)
        .service(current_user)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}
