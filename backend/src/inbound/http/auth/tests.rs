//! Tests for identity resolution and the admin key guard.

use super::*;
use crate::domain::NewUser;
use crate::inbound::http::test_utils::{
    TEST_ADMIN_KEY, memory_state, session_cookie, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderValue;
use actix_web::{App, HttpResponse, test as actix_test, web};
use rstest::rstest;

async fn whoami(identity: RequestIdentity) -> HttpResponse {
    HttpResponse::Ok().body(identity.user().map(|user| user.name.clone()).unwrap_or_default())
}

async fn admin_only(_admin: AdminAccess) -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[rstest]
#[case(Some("Bearer abc"), Some("abc"))]
#[case(Some("bearer   abc  "), Some("abc"))]
#[case(Some("Basic abc"), None)]
#[case(Some("Bearer "), None)]
#[case(Some("Bearer"), None)]
#[case(None, None)]
fn bearer_token_parsing(#[case] header: Option<&'static str>, #[case] expected: Option<&str>) {
    let mut headers = HeaderMap::new();
    if let Some(value) = header {
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
    }
    assert_eq!(bearer_token(&headers).as_deref(), expected);
}

#[actix_web::test]
async fn anonymous_without_session_or_bearer() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .wrap(test_session_middleware())
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/whoami").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(actix_test::read_body(res).await, "");
}

#[actix_web::test]
async fn bearer_key_resolves_its_user() {
    let state = memory_state();
    let alice = state
        .users
        .create_user(NewUser::new("alice"))
        .await
        .expect("create alice");
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = actix_test::TestRequest::get()
        .uri("/whoami")
        .insert_header((AUTHORIZATION, format!("Bearer {}", alice.api_key.expose())))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(actix_test::read_body(res).await, "alice");
}

#[actix_web::test]
async fn unknown_bearer_key_fails_the_request() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .wrap(test_session_middleware())
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = actix_test::TestRequest::get()
        .uri("/whoami")
        .insert_header((AUTHORIZATION, "Bearer nobody-has-this"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], "unauthorized");
}

#[actix_web::test]
async fn session_takes_precedence_over_bearer() {
    let state = memory_state();
    let alice = state
        .users
        .create_user(NewUser::new("alice"))
        .await
        .expect("create alice");
    let bob = state
        .users
        .create_user(NewUser::new("bob"))
        .await
        .expect("create bob");
    let token = state.sessions.create(&alice).await.expect("session");
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .route(
                "/login",
                web::get().to(move |session: SessionContext| {
                    let token = token.clone();
                    async move {
                        session.persist(&token)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }
                }),
            )
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/login").to_request(),
    )
    .await;
    let cookie = session_cookie(&login);
    let req = actix_test::TestRequest::get()
        .uri("/whoami")
        .cookie(cookie)
        .insert_header((AUTHORIZATION, format!("Bearer {}", bob.api_key.expose())))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(actix_test::read_body(res).await, "alice");
}

#[rstest]
#[case(Some(TEST_ADMIN_KEY), StatusCode::NO_CONTENT)]
#[case(Some("adminadminadmin2"), StatusCode::NOT_FOUND)]
#[case(Some(""), StatusCode::NOT_FOUND)]
#[case(None, StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn admin_guard_hides_routes(#[case] key: Option<&str>, #[case] expected: StatusCode) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .route("/admin", web::get().to(admin_only)),
    )
    .await;

    let mut req = actix_test::TestRequest::get().uri("/admin");
    if let Some(key) = key {
        req = req.insert_header((ADMIN_KEY_HEADER, key));
    }
    let res = actix_test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), expected);
}
