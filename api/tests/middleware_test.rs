//! Integration tests for JWT authentication middleware

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use ec_api::middleware::auth::{AccessTokenVerifier, AdminContext, AuthContext, JwtAuth};
use ec_core::domain::entities::token::Claims;
use ec_core::domain::entities::user::UserRole;
use ec_core::errors::{DomainError, DomainResult, TokenError};

/// Accepts "admin" and "customer", reports "stale" as expired and the store
/// as down for "outage"
struct StubVerifier {
    user_id: Uuid,
}

#[async_trait(?Send)]
impl AccessTokenVerifier for StubVerifier {
    async fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let role = match token {
            "admin" => UserRole::Admin,
            "customer" => UserRole::Customer,
            "stale" => return Err(TokenError::Expired.into()),
            "outage" => return Err(DomainError::unavailable("revocation store down")),
            _ => return Err(TokenError::Invalid.into()),
        };
        Ok(Claims::new_access_token(
            self.user_id,
            "ann@example.com",
            role,
            Utc::now(),
            60,
            "issuer",
            "audience",
        ))
    }
}

async fn whoami(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "userId": auth.user_id,
        "email": auth.email,
        "role": auth.role,
    }))
}

async fn admin_only(_admin: AdminContext) -> HttpResponse {
    HttpResponse::Ok().finish()
}

fn jwt(user_id: Uuid) -> JwtAuth {
    JwtAuth::new(Arc::new(StubVerifier { user_id }))
}

#[actix_web::test]
async fn test_middleware_requires_auth_header() {
    let app = test::init_service(
        App::new().service(
            web::resource("/protected")
                .wrap(jwt(Uuid::new_v4()))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get().uri("/protected").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_middleware_collapses_token_failures() {
    let app = test::init_service(
        App::new().service(
            web::resource("/protected")
                .wrap(jwt(Uuid::new_v4()))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Bearer forged"))
        .to_request();
    let forged: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Bearer stale"))
        .to_request();
    let stale: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(forged["error"], "INVALID_TOKEN");
    assert_eq!(stale["error"], "TOKEN_EXPIRED");
    assert_eq!(forged["message"], stale["message"]);
}

#[actix_web::test]
async fn test_store_outage_is_not_a_401() {
    let app = test::init_service(
        App::new().service(
            web::resource("/protected")
                .wrap(jwt(Uuid::new_v4()))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Bearer outage"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_auth_context_extractor() {
    let user_id = Uuid::new_v4();
    let app = test::init_service(
        App::new().service(
            web::resource("/protected")
                .wrap(jwt(user_id))
                .route(web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Bearer customer"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["userId"], user_id.to_string());
    assert_eq!(body["role"], "customer");
}

#[actix_web::test]
async fn test_admin_context_checks_role() {
    let app = test::init_service(
        App::new().service(
            web::resource("/admin")
                .wrap(jwt(Uuid::new_v4()))
                .route(web::get().to(admin_only)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", "Bearer customer"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", "Bearer admin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_extractor_without_middleware_is_unauthorized() {
    let app = test::init_service(App::new().route("/open", web::get().to(whoami))).await;

    let req = test::TestRequest::get().uri("/open").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
