use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth::{VerifyEmailRequest, VerifyEmailResponse};
use crate::handlers::error::{handle_domain_error, validation_error_response};
use crate::middleware::auth::AuthContext;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/verify-email
///
/// # Request Body
///
/// ```json
/// {
///     "code": "482913"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `INVALID_CODE`, `EXPIRED_CODE` or `TOO_MANY_ATTEMPTS`
/// - 409 Conflict: `ALREADY_VERIFIED`
pub async fn verify_email<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    auth: AuthContext,
    request: web::Json<VerifyEmailRequest>,
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

    match state.auth_service.verify_email(auth.user_id, &request.code).await {
        Ok(user) => HttpResponse::Ok().json(VerifyEmailResponse {
            message: "Email verified".to_string(),
            user: user.into(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
