//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{Backend, build_http_state};

use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use todo_backend::ApiDoc;
use todo_backend::Trace;
use todo_backend::domain::ports::TodoMetrics;
use todo_backend::inbound::http::error::{json_config, not_found};
use todo_backend::inbound::http::health::HealthState;
use todo_backend::inbound::http::state::HttpState;
use todo_backend::inbound::http::{configure_api, session_middleware};
use todo_backend::middleware::{Cors, RequestMetrics};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    metrics: Arc<dyn TodoMetrics>,
    cors: Cors,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        metrics,
        cors,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let api = web::scope("/api")
        .wrap(session_middleware(key, cookie_secure, same_site))
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(not_found))
        .wrap(RequestMetrics::new(metrics))
        .wrap(cors)
        .wrap(Trace)
}

/// Construct an Actix HTTP server over the given state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state, marked ready once bound.
/// - `http_state`: handler dependencies shared by every worker.
/// - `metrics`: sink for per-request observations.
/// - `config`: cookie, listener, CORS and optional Prometheus settings.
///
/// # Returns
/// A running [`Server`] that must be awaited to drive the listener. OS
/// signal handling is left to the caller so shutdown can be coordinated
/// with the background tasks.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    metrics: Arc<dyn TodoMetrics>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        cors,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            metrics: metrics.clone(),
            cors: cors.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{Method, StatusCode};
    use actix_web::test;
    use mockable::DefaultClock;
    use serde_json::Value;
    use todo_backend::domain::ApiKey;
    use todo_backend::domain::ports::NoOpTodoMetrics;

    fn deps() -> AppDependencies {
        let backend = Backend::memory();
        let sessions = backend.session_service(Arc::new(DefaultClock));
        let http_state = build_http_state(
            &backend,
            sessions,
            ApiKey::generate(),
            std::time::Duration::from_secs(6),
        );
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(http_state),
            metrics: Arc::new(NoOpTodoMetrics),
            cors: Cors::new("localhost", "http://localhost:3000"),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[actix_web::test]
    async fn unknown_routes_answer_not_found_with_a_trace_id() {
        let app = test::init_service(build_app(deps())).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request())
            .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key("trace-id"));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "not found");
    }

    #[actix_web::test]
    async fn registration_is_served_under_api() {
        let app = test::init_service(build_app(deps())).await;

        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(serde_json::json!({ "name": "alice" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn preflight_requests_short_circuit() {
        let app = test::init_service(build_app(deps())).await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/todos")
            .insert_header(("Origin", "http://localhost:3000"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            res.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }
}
