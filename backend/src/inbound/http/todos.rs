//! List and item handlers.
//!
//! Every route requires an identity. Ownership is enforced by the domain
//! service; handlers only parse the request and pass the caller along.
//! Item routes are addressed by item id; the list segment is parsed for
//! validation only.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};

use super::auth::RequestIdentity;
use super::error::path_id;
use super::state::HttpState;
use crate::domain::identity::require_authenticated;
use crate::domain::{
    ApiResult, Error, Item, ItemId, ItemUpdate, List, ListFilter, ListId, ListUpdate, NewItem,
    NewList, Page,
};

fn list_id(req: &HttpRequest) -> ApiResult<ListId> {
    path_id(req, "id").map(ListId::new)
}

fn item_id(req: &HttpRequest) -> ApiResult<ItemId> {
    list_id(req)?;
    path_id(req, "itemId").map(ItemId::new)
}

/// The caller's lists, each with its items.
#[utoipa::path(
    get,
    path = "/api/todos",
    params(Page),
    responses(
        (status = 200, description = "Lists", body = [List]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["todos"],
    operation_id = "listTodos"
)]
#[get("/todos")]
pub async fn list_lists(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    page: web::Query<Page>,
) -> ApiResult<web::Json<Vec<List>>> {
    let me = require_authenticated(identity.user())?;
    let filter = ListFilter::by_owner(me.id).with_page(page.into_inner());
    let lists = state.lists.find_lists(Some(me), filter).await?;
    Ok(web::Json(lists))
}

/// Create a list owned by the caller.
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = NewList,
    responses(
        (status = 201, description = "Created", body = List),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["todos"],
    operation_id = "createTodo"
)]
#[post("/todos")]
pub async fn create_list(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<NewList>,
) -> ApiResult<HttpResponse> {
    let list = state
        .lists
        .create_list(identity.user(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(list))
}

/// One list with its items.
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "List id")),
    responses(
        (status = 200, description = "List", body = List),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["todos"],
    operation_id = "getTodo"
)]
#[get("/todos/{id}")]
pub async fn get_list(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<List>> {
    let id = list_id(&req)?;
    let list = state.lists.find_list_by_id(identity.user(), id).await?;
    Ok(web::Json(list))
}

/// Partially update a list.
#[utoipa::path(
    patch,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "List id")),
    request_body = ListUpdate,
    responses(
        (status = 200, description = "Updated", body = List),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["todos"],
    operation_id = "updateTodo"
)]
#[patch("/todos/{id}")]
pub async fn update_list(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<ListUpdate>,
) -> ApiResult<web::Json<List>> {
    let id = list_id(&req)?;
    let list = state
        .lists
        .update_list(identity.user(), id, payload.into_inner())
        .await?;
    Ok(web::Json(list))
}

/// Delete a list and its items.
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "List id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["todos"],
    operation_id = "deleteTodo"
)]
#[delete("/todos/{id}")]
pub async fn delete_list(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<HttpResponse> {
    let id = list_id(&req)?;
    state.lists.delete_list(identity.user(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add an item to a list.
#[utoipa::path(
    post,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "List id")),
    request_body = NewItem,
    responses(
        (status = 201, description = "Created", body = Item),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown list", body = Error)
    ),
    tags = ["todos"],
    operation_id = "createTodoItem"
)]
#[post("/todos/{id}")]
pub async fn create_item(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<NewItem>,
) -> ApiResult<HttpResponse> {
    let id = list_id(&req)?;
    let item = state
        .lists
        .create_item(identity.user(), id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(item))
}

/// One item.
#[utoipa::path(
    get,
    path = "/api/todos/{id}/{itemId}",
    params(
        ("id" = i64, Path, description = "List id"),
        ("itemId" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item", body = Item),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["todos"],
    operation_id = "getTodoItem"
)]
#[get("/todos/{id}/{itemId}")]
pub async fn get_item(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<Item>> {
    let id = item_id(&req)?;
    let item = state.lists.find_item_by_id(identity.user(), id).await?;
    Ok(web::Json(item))
}

/// Partially update an item.
#[utoipa::path(
    patch,
    path = "/api/todos/{id}/{itemId}",
    params(
        ("id" = i64, Path, description = "List id"),
        ("itemId" = i64, Path, description = "Item id")
    ),
    request_body = ItemUpdate,
    responses(
        (status = 200, description = "Updated", body = Item),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["todos"],
    operation_id = "updateTodoItem"
)]
#[patch("/todos/{id}/{itemId}")]
pub async fn update_item(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<ItemUpdate>,
) -> ApiResult<web::Json<Item>> {
    let id = item_id(&req)?;
    let item = state
        .lists
        .update_item(identity.user(), id, payload.into_inner())
        .await?;
    Ok(web::Json(item))
}

/// Delete an item.
#[utoipa::path(
    delete,
    path = "/api/todos/{id}/{itemId}",
    params(
        ("id" = i64, Path, description = "List id"),
        ("itemId" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["todos"],
    operation_id = "deleteTodoItem"
)]
#[delete("/todos/{id}/{itemId}")]
pub async fn delete_item(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<HttpResponse> {
    let id = item_id(&req)?;
    state.lists.delete_item(identity.user(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the list and item handlers on a service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_lists)
        .service(create_list)
        .service(get_list)
        .service(update_list)
        .service(delete_list)
        .service(create_item)
        .service(get_item)
        .service(update_item)
        .service(delete_item);
}
