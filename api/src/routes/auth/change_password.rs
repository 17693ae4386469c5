use actix_web::{web, HttpResponse};
use validator::Validate;

use ec_shared::types::MessageResponse;

use crate::dto::auth::ChangePasswordRequest;
use crate::handlers::error::{handle_domain_error, validation_error_response};
use crate::middleware::auth::AuthContext;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/change-password
///
/// Every refresh token of the user is revoked on success, so other sessions
/// end once their access token expires.
///
/// # Request Body
///
/// ```json
/// {
///     "currentPassword": "Secur3!pass",
///     "newPassword": "N3w!Secret"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `WRONG_CURRENT_PASSWORD`, `WEAK_PASSWORD` or `VALIDATION_ERROR`
/// - 401 Unauthorized: missing or invalid access token
pub async fn change_password<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    auth: AuthContext,
    request: web::Json<ChangePasswordRequest>,
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
        .change_password(auth.user_id, &request.current_password, &request.new_password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Password changed")),
        Err(error) => handle_domain_error(error),
    }
}
