//! CORS headers for local development.
//!
//! The origin, method and header policy is enforced by [`actix_cors`] and is
//! only populated when the server runs on `localhost`. This layer adds
//! `Vary: Origin` to every response and answers every `OPTIONS` request
//! with `204`, copying the `Access-Control-*` headers the policy granted.

use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::http::{Method, Uri};
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, ready};
use tracing::warn;

/// Domain on which cross-origin headers are emitted.
pub const LOCAL_DOMAIN: &str = "localhost";

const ALLOW_METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "OPTIONS", "DELETE"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Origins {
    Any,
    Listed(Vec<String>),
}

impl Origins {
    /// Parse a comma-separated origin list. `*` allows any origin; entries
    /// that are not absolute URIs are skipped.
    fn parse(raw: &str) -> Self {
        let mut listed = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            if entry == "*" {
                return Self::Any;
            }
            match entry.parse::<Uri>() {
                Ok(uri) if uri.scheme().is_some() && uri.host().is_some() => {
                    listed.push(entry.to_owned());
                }
                _ => warn!(origin = entry, "ignoring malformed CORS origin"),
            }
        }
        Self::Listed(listed)
    }
}

/// CORS middleware.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use todo_backend::middleware::Cors;
///
/// let app = App::new().wrap(Cors::new("localhost", "http://localhost:3000"));
/// ```
#[derive(Debug, Clone)]
pub struct Cors {
    origins: Option<Origins>,
}

impl Cors {
    /// Build the middleware for a server answering on `domain`, allowing the
    /// comma-separated `allowed_origins`.
    pub fn new(domain: &str, allowed_origins: &str) -> Self {
        let origins = (domain == LOCAL_DOMAIN).then(|| Origins::parse(allowed_origins));
        Self { origins }
    }

    fn policy(&self) -> actix_cors::Cors {
        let policy = actix_cors::Cors::default()
            .block_on_origin_mismatch(false)
            .disable_vary_header();
        let Some(origins) = &self.origins else {
            return policy;
        };
        let policy = policy
            .allowed_methods(ALLOW_METHODS)
            .allowed_headers([header::CONTENT_TYPE, header::ORIGIN, header::ACCEPT])
            .expose_headers([header::LINK])
            .supports_credentials();
        match origins {
            Origins::Any => policy.allow_any_origin(),
            Origins::Listed(listed) => listed
                .iter()
                .fold(policy, |policy, origin| policy.allowed_origin(origin)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<EitherBody<B>>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let pending = self.policy().new_transform(service);
        Box::pin(async move { pending.await.map(|policy| CorsMiddleware { policy }) })
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    policy: actix_cors::CorsMiddleware<S>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<EitherBody<B>>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.policy.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() != Method::OPTIONS {
            let fut = self.policy.call(req);
            return Box::pin(async move {
                let mut res = fut.await?;
                vary(res.headers_mut(), false);
                Ok(res.map_into_left_body())
            });
        }
        if !is_cors_preflight(req.headers()) {
            let mut res = req.into_response(HttpResponse::NoContent().finish());
            vary(res.headers_mut(), true);
            return Box::pin(ready(Ok(res.map_into_right_body())));
        }
        let fut = self.policy.call(req);
        Box::pin(async move {
            let (req, granted) = fut.await?.into_parts();
            let mut answer = HttpResponse::NoContent().finish();
            for (name, value) in granted.headers() {
                if name.as_str().starts_with("access-control-") {
                    answer.headers_mut().append(name.clone(), value.clone());
                }
            }
            vary(answer.headers_mut(), true);
            Ok(ServiceResponse::new(req, answer).map_into_right_body())
        })
    }
}

fn is_cors_preflight(headers: &HeaderMap) -> bool {
    headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

fn vary(headers: &mut HeaderMap, preflight: bool) {
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    if preflight {
        headers.append(
            header::VARY,
            HeaderValue::from_static("Access-Control-Request-Method"),
        );
        headers.append(
            header::VARY,
            HeaderValue::from_static("Access-Control-Request-Headers"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{self};
    use actix_web::{App, web};
    use rstest::rstest;

    const ORIGIN: &str = "http://localhost:3000";

    async fn call(cors: Cors, req: test::TestRequest) -> ServiceResponse<impl MessageBody> {
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        test::call_service(&app, req.uri("/").to_request()).await
    }

    fn header_str<B>(res: &ServiceResponse<B>, name: header::HeaderName) -> Option<&str> {
        res.headers().get(name).and_then(|value| value.to_str().ok())
    }

    fn vary_values<B>(res: &ServiceResponse<B>) -> Vec<&str> {
        res.headers()
            .get_all(header::VARY)
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    fn preflight(origin: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH"))
    }

    #[actix_web::test]
    async fn localhost_grants_the_configured_origin() {
        let res = call(
            Cors::new("localhost", ORIGIN),
            test::TestRequest::get().insert_header((header::ORIGIN, ORIGIN)),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header_str(&res, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some(ORIGIN));
        assert_eq!(
            header_str(&res, header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some("true")
        );
        assert_eq!(
            header_str(&res, header::ACCESS_CONTROL_EXPOSE_HEADERS).map(str::to_lowercase),
            Some("link".to_owned())
        );
        assert_eq!(vary_values(&res), ["Origin"]);
    }

    #[actix_web::test]
    async fn unlisted_origins_pass_through_without_grants() {
        let res = call(
            Cors::new("localhost", ORIGIN),
            test::TestRequest::get().insert_header((header::ORIGIN, "http://evil.test")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(vary_values(&res), ["Origin"]);
    }

    #[actix_web::test]
    async fn other_domains_only_vary_on_origin() {
        let res = call(
            Cors::new("todo.example.com", "*"),
            test::TestRequest::get().insert_header((header::ORIGIN, ORIGIN)),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(vary_values(&res), ["Origin"]);
    }

    #[actix_web::test]
    async fn localhost_preflight_is_granted_with_no_content() {
        let res = call(Cors::new("localhost", ORIGIN), preflight(ORIGIN)).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(header_str(&res, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some(ORIGIN));
        assert!(
            header_str(&res, header::ACCESS_CONTROL_ALLOW_METHODS)
                .is_some_and(|methods| methods.contains("PATCH"))
        );
    }

    #[rstest]
    #[case("localhost", preflight("http://evil.test"))]
    #[case("todo.example.com", preflight(ORIGIN))]
    #[case("localhost", test::TestRequest::default().method(Method::OPTIONS))]
    #[case("todo.example.com", test::TestRequest::default().method(Method::OPTIONS))]
    #[actix_web::test]
    async fn options_always_answer_no_content(
        #[case] domain: &str,
        #[case] req: test::TestRequest,
    ) {
        let res = call(Cors::new(domain, ORIGIN), req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(
            vary_values(&res),
            [
                "Origin",
                "Access-Control-Request-Method",
                "Access-Control-Request-Headers"
            ]
        );
    }

    #[rstest]
    #[case("*", Origins::Any)]
    #[case("http://a.test, *", Origins::Any)]
    #[case(
        "http://a.test, not an origin, https://b.test:8443",
        Origins::Listed(vec!["http://a.test".into(), "https://b.test:8443".into()])
    )]
    #[case("", Origins::Listed(Vec::new()))]
    fn origin_lists_are_parsed(#[case] raw: &str, #[case] expected: Origins) {
        assert_eq!(Origins::parse(raw), expected);
    }
}
