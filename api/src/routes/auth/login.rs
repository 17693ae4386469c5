use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::handlers::error::{handle_domain_error, validation_error_response};

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/login
///
/// # Request Body
///
/// ```json
/// {
///     "email": "ann@example.com",
///     "password": "Secur3!pass"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accessToken": "eyJ...",
///     "refreshToken": "9f2c...",
///     "tokenType": "Bearer",
///     "expiresIn": 3600,
///     "refreshExpiresIn": 2592000,
///     "user": { "id": "...", "email": "ann@example.com", ... }
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: `INVALID_CREDENTIALS`, for unknown email and wrong password alike
/// - 403 Forbidden: `ACCOUNT_SUSPENDED` or `ACCOUNT_INACTIVE`
pub async fn login<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state
        .auth_service
        .login(&request.email, &request.password)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(LoginResponse::from(response)),
        Err(error) => handle_domain_error(error),
    }
}
