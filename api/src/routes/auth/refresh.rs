use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth::{RefreshTokenRequest, TokenResponse};
use crate::handlers::error::{handle_domain_error, validation_error_response};

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/refresh
///
/// Exchanges a refresh token for a new token pair. The presented refresh
/// token is consumed; presenting it again revokes every token of its family.
///
/// # Request Body
///
/// ```json
/// {
///     "refreshToken": "9f2c..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: `TOKEN_EXPIRED` or `INVALID_TOKEN`
pub async fn refresh<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    request: web::Json<RefreshTokenRequest>,
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

    match state.auth_service.refresh(&request.refresh_token).await {
        Ok(tokens) => HttpResponse::Ok().json(TokenResponse::from(tokens)),
        Err(error) => handle_domain_error(error),
    }
}
