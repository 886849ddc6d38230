//! Build metadata endpoint.

use actix_web::{get, web};

use crate::domain::BuildInfo;

/// Version, commit and build date of the running server.
#[utoipa::path(
    get,
    path = "/api/build",
    tags = ["meta"],
    security([]),
    responses((status = 200, description = "Build details", body = BuildInfo))
)]
#[get("/build")]
pub async fn build_info() -> web::Json<BuildInfo> {
    web::Json(BuildInfo::current())
}
