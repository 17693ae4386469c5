//! HTTP tests for the `/auth` endpoints

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test, test::TestRequest};
use chrono::Duration;
use serde_json::json;

use ec_api::create_app;
use common::{login_body, post_json, register_body, with_bearer, TestApp, EMAIL, PASSWORD};

#[actix_web::test]
async fn test_register_login_me_logout() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let (status, user) = send!(app, post_json("/auth/register", register_body(EMAIL, PASSWORD)));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], EMAIL);
    assert_eq!(user["status"], "pending_verification");
    assert!(user.get("passwordHash").is_none());

    let (status, login) = send!(app, post_json("/auth/login", login_body(EMAIL, PASSWORD)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["tokenType"], "Bearer");
    assert_eq!(login["user"]["email"], EMAIL);
    let access = login["accessToken"].as_str().unwrap().to_string();
    assert!(!access.is_empty());
    assert!(!login["refreshToken"].as_str().unwrap().is_empty());

    let (status, me) = send!(app, with_bearer(TestRequest::get().uri("/auth/me"), &access));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], EMAIL);

    let (status, body) = send!(app, with_bearer(TestRequest::post().uri("/auth/logout"), &access));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, body) = send!(app, with_bearer(TestRequest::get().uri("/auth/me"), &access));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_weak_password_creates_no_user() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let (status, body) = send!(app, post_json("/auth/register", register_body(EMAIL, "abc")));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "WEAK_PASSWORD");
    assert_eq!(f.users.len().await, 0);
}

#[actix_web::test]
async fn test_register_rejects_invalid_email_and_duplicates() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let (status, body) = send!(app, post_json("/auth/register", register_body("not-an-email", PASSWORD)));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_EMAIL");

    let (status, _) = send!(app, post_json("/auth/register", register_body(EMAIL, PASSWORD)));
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(app, post_json("/auth/register", register_body("A@X.COM", PASSWORD)));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE_EMAIL");
}

#[actix_web::test]
async fn test_register_validation_errors_name_fields() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let body = json!({ "email": EMAIL, "password": PASSWORD, "firstName": "", "lastName": "Lee" });
    let (status, body) = send!(app, post_json("/auth/register", body));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["firstName"].is_array());
}

#[actix_web::test]
async fn test_malformed_json_is_validation_error() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let req = TestRequest::post()
        .uri("/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    let (status, body) = send!(app, req);

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_login_failures_look_the_same() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    send!(app, post_json("/auth/register", register_body(EMAIL, PASSWORD)));

    let (unknown_status, unknown) =
        send!(app, post_json("/auth/login", login_body("nobody@x.com", PASSWORD)));
    let (wrong_status, wrong) = send!(app, post_json("/auth/login", login_body(EMAIL, "Wr0ng!pass")));

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["error"], "INVALID_CREDENTIALS");
    assert_eq!(unknown["error"], wrong["error"]);
    assert_eq!(unknown["message"], wrong["message"]);
}

#[actix_web::test]
async fn test_refresh_rotates_tokens() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let refresh = login["refreshToken"].as_str().unwrap().to_string();

    let (status, tokens) = send!(app, post_json("/auth/refresh", json!({ "refreshToken": refresh })));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["tokenType"], "Bearer");
    assert_ne!(tokens["refreshToken"], login["refreshToken"]);

    let access = tokens["accessToken"].as_str().unwrap();
    let (status, _) = send!(app, with_bearer(TestRequest::get().uri("/auth/me"), access));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_expired_refresh_token_issues_nothing() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let issued = f.tokens.all().await.len();

    f.clock.advance(Duration::days(31));
    let (status, body) = send!(
        app,
        post_json("/auth/refresh", json!({ "refreshToken": login["refreshToken"] }))
    );

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");
    assert_eq!(f.tokens.all().await.len(), issued);
}

#[actix_web::test]
async fn test_refresh_reuse_revokes_family() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let first = login["refreshToken"].clone();

    let (status, rotated) = send!(app, post_json("/auth/refresh", json!({ "refreshToken": first })));
    assert_eq!(status, StatusCode::OK);
    let second = rotated["refreshToken"].clone();

    let (status, body) = send!(app, post_json("/auth/refresh", json!({ "refreshToken": first })));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    let (status, _) = send!(app, post_json("/auth/refresh", json!({ "refreshToken": second })));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_revokes_refresh_token_from_body() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let access = login["accessToken"].as_str().unwrap();

    let req = with_bearer(
        post_json("/auth/logout", json!({ "refreshToken": login["refreshToken"] })),
        access,
    );
    let (status, _) = send!(app, req);
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        post_json("/auth/refresh", json!({ "refreshToken": login["refreshToken"] }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_accepts_expired_access_token() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let access = login["accessToken"].as_str().unwrap();

    f.clock.advance(Duration::hours(2));

    let (status, _) = send!(app, with_bearer(TestRequest::post().uri("/auth/logout"), access));
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(app, with_bearer(TestRequest::get().uri("/auth/me"), access));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");
}

#[actix_web::test]
async fn test_logout_rejects_forged_token() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let (status, body) = send!(app, with_bearer(TestRequest::post().uri("/auth/logout"), "not.a.jwt"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    let (status, _) = send!(app, TestRequest::post().uri("/auth/logout"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_change_password_revokes_sessions() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let access = login["accessToken"].as_str().unwrap();

    let wrong = json!({ "currentPassword": "Wr0ng!pass", "newPassword": "N3w!Secret" });
    let (status, body) = send!(app, with_bearer(post_json("/auth/change-password", wrong), access));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "WRONG_CURRENT_PASSWORD");

    let weak = json!({ "currentPassword": PASSWORD, "newPassword": "short" });
    let (status, body) = send!(app, with_bearer(post_json("/auth/change-password", weak), access));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "WEAK_PASSWORD");

    let good = json!({ "currentPassword": PASSWORD, "newPassword": "N3w!Secret" });
    let (status, _) = send!(app, with_bearer(post_json("/auth/change-password", good), access));
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        post_json("/auth/refresh", json!({ "refreshToken": login["refreshToken"] }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(app, post_json("/auth/login", login_body(EMAIL, PASSWORD)));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send!(app, post_json("/auth/login", login_body(EMAIL, "N3w!Secret")));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_change_password_requires_token() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let body = json!({ "currentPassword": PASSWORD, "newPassword": "N3w!Secret" });
    let (status, body) = send!(app, post_json("/auth/change-password", body));

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_verify_email_activates_account() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let access = login["accessToken"].as_str().unwrap();
    let code = f.email.last_code_for(EMAIL).await.expect("code emailed at registration");
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = send!(
        app,
        with_bearer(post_json("/auth/verify-email", json!({ "code": wrong })), access)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_CODE");

    let (status, body) = send!(
        app,
        with_bearer(post_json("/auth/verify-email", json!({ "code": code })), access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "active");
    assert_eq!(body["user"]["isEmailVerified"], true);

    let (status, body) = send!(
        app,
        with_bearer(TestRequest::post().uri("/auth/resend-verification"), access)
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_VERIFIED");
}

#[actix_web::test]
async fn test_resend_verification_issues_new_code() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let access = login["accessToken"].as_str().unwrap();

    let (status, body) = send!(
        app,
        with_bearer(TestRequest::post().uri("/auth/resend-verification"), access)
    );

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification code sent");
    assert!(body["expiresAt"].is_string());
}

#[actix_web::test]
async fn test_user_admin_requires_admin_role() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;
    let login = register_and_login!(app);
    let customer_access = login["accessToken"].as_str().unwrap();
    let customer_id = login["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = send!(app, with_bearer(TestRequest::get().uri("/auth/users"), customer_access));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    f.create_admin().await;
    let (_, admin) = send!(app, post_json("/auth/login", login_body(common::ADMIN_EMAIL, PASSWORD)));
    let admin_access = admin["accessToken"].as_str().unwrap();

    let (status, page) = send!(
        app,
        with_bearer(TestRequest::get().uri("/auth/users?page=1&per_page=10"), admin_access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["per_page"], 10);

    let uri = format!("/auth/users/{}", customer_id);
    let (status, _) = send!(app, with_bearer(TestRequest::delete().uri(&uri), admin_access));
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The deleted customer's access token is still signed and unexpired
    let (status, body) = send!(app, with_bearer(TestRequest::get().uri("/auth/me"), customer_access));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    let (status, body) = send!(app, with_bearer(TestRequest::delete().uri(&uri), admin_access));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = send!(
        app,
        with_bearer(TestRequest::delete().uri("/auth/users/not-a-uuid"), admin_access)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health_and_unknown_route() {
    let f = TestApp::new();
    let app = test::init_service(create_app(f.state.clone(), &f.server)).await;

    let (status, body) = send!(app, TestRequest::get().uri("/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send!(app, TestRequest::get().uri("/nowhere"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
