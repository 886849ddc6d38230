//! Middleware reporting each handled request to a [`TodoMetrics`] sink.
//!
//! Requests are labelled with their route pattern (`/api/todos/{id}`) rather
//! than the concrete path, so label cardinality stays bounded. Requests that
//! match no route are reported under [`UNMATCHED_ROUTE`].

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::time::Instant;
use tracing::warn;

use crate::domain::ports::TodoMetrics;

/// Route label for requests no handler matched.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Request metrics middleware.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::App;
/// use todo_backend::domain::ports::NoOpTodoMetrics;
/// use todo_backend::middleware::RequestMetrics;
///
/// let app = App::new().wrap(RequestMetrics::new(Arc::new(NoOpTodoMetrics)));
/// ```
#[derive(Clone)]
pub struct RequestMetrics {
    sink: Arc<dyn TodoMetrics>,
}

impl RequestMetrics {
    /// Report requests to `sink`.
    pub fn new(sink: Arc<dyn TodoMetrics>) -> Self {
        Self { sink }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestMetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetricsMiddleware {
            service: Rc::new(service),
            sink: Arc::clone(&self.sink),
        }))
    }
}

/// Service wrapper produced by [`RequestMetrics`].
pub struct RequestMetricsMiddleware<S> {
    service: Rc<S>,
    sink: Arc<dyn TodoMetrics>,
}

impl<S, B> Service<ServiceRequest> for RequestMetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let sink = Arc::clone(&self.sink);
        let method = req.method().as_str().to_owned();
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let route = res
                .request()
                .match_pattern()
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());
            if let Err(err) = sink.record_request(&method, &route, started.elapsed()).await {
                warn!(error = %err, %route, "failed to record request metrics");
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockTodoMetrics, TodoMetricsError};
    use actix_web::{App, HttpResponse, test, web};

    async fn app_with(
        metrics: MockTodoMetrics,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = Error> {
        test::init_service(
            App::new()
                .wrap(RequestMetrics::new(Arc::new(metrics)))
                .route(
                    "/todos/{id}",
                    web::get().to(|| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await
    }

    #[actix_web::test]
    async fn records_the_route_pattern() {
        let mut metrics = MockTodoMetrics::new();
        metrics
            .expect_record_request()
            .withf(|method, route, _| method == "GET" && route == "/todos/{id}")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let app = app_with(metrics).await;

        let req = test::TestRequest::get().uri("/todos/7").to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
    }

    #[actix_web::test]
    async fn unmatched_requests_share_one_label() {
        let mut metrics = MockTodoMetrics::new();
        metrics
            .expect_record_request()
            .withf(|method, route, _| method == "POST" && route == UNMATCHED_ROUTE)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let app = app_with(metrics).await;

        let req = test::TestRequest::post().uri("/nowhere").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn sink_failures_do_not_fail_the_request() {
        let mut metrics = MockTodoMetrics::new();
        metrics
            .expect_record_request()
            .returning(|_, _, _| Err(TodoMetricsError::export("down")));
        let app = app_with(metrics).await;

        let req = test::TestRequest::get().uri("/todos/1").to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
    }
}
