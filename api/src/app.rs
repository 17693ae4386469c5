//! Application factory
//!
//! Builds the Actix-web application: middleware, extractor configuration
//! and the `/auth` routes.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;
use ec_shared::config::ServerConfig;
use ec_shared::errors::{error_codes, ErrorResponse};
use ec_shared::types::HealthResponse;

use crate::handlers::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::middleware::{auth::AccessTokenVerifier, create_cors, JwtAuth};
use crate::routes::auth::{
    change_password::change_password,
    login::login,
    logout::logout,
    me::me,
    refresh::refresh,
    register::register,
    resend_verification::resend_verification,
    users::{delete_user, list_users},
    verify_email::verify_email,
    AppState,
};

pub const SERVICE_NAME: &str = "ec-auth-api";

/// Create and configure the application with all dependencies
pub fn create_app<U, T, R, V, E>(
    app_state: web::Data<AppState<U, T, R, V, E>>,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    let verifier: Arc<dyn AccessTokenVerifier> = app_state.auth_service.clone();
    let jwt = JwtAuth::new(verifier);

    App::new()
        .app_data(app_state)
        .app_data(
            web::JsonConfig::default()
                .limit(server.max_payload_size)
                .error_handler(json_error_handler),
        )
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        // Last wrap runs first: tracing sees every request, CORS included
        .wrap(create_cors(&server.cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(register::<U, T, R, V, E>))
                .route("/login", web::post().to(login::<U, T, R, V, E>))
                .route("/refresh", web::post().to(refresh::<U, T, R, V, E>))
                .route("/logout", web::post().to(logout::<U, T, R, V, E>))
                .service(
                    web::resource("/me")
                        .wrap(jwt.clone())
                        .route(web::get().to(me::<U, T, R, V, E>)),
                )
                .service(
                    web::resource("/change-password")
                        .wrap(jwt.clone())
                        .route(web::post().to(change_password::<U, T, R, V, E>)),
                )
                .service(
                    web::resource("/verify-email")
                        .wrap(jwt.clone())
                        .route(web::post().to(verify_email::<U, T, R, V, E>)),
                )
                .service(
                    web::resource("/resend-verification")
                        .wrap(jwt.clone())
                        .route(web::post().to(resend_verification::<U, T, R, V, E>)),
                )
                .service(
                    web::resource("/users")
                        .wrap(jwt.clone())
                        .route(web::get().to(list_users::<U, T, R, V, E>)),
                )
                .service(
                    web::resource("/users/{id}")
                        .wrap(jwt)
                        .route(web::delete().to(delete_user::<U, T, R, V, E>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(SERVICE_NAME, env!("CARGO_PKG_VERSION")))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
