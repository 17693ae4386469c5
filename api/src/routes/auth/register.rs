use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth::{RegisterRequest, UserResponse};
use crate::handlers::error::{handle_domain_error, validation_error_response};

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/register
///
/// Creates a customer account in `pending_verification` status and emails a
/// verification code.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "ann@example.com",
///     "password": "Secur3!pass",
///     "firstName": "Ann",
///     "lastName": "Lee"
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// The stored user, without the password hash.
///
/// ## Errors
/// - 400 Bad Request: `VALIDATION_ERROR`, `INVALID_EMAIL` or `WEAK_PASSWORD`
/// - 409 Conflict: `DUPLICATE_EMAIL`
pub async fn register<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    request: web::Json<RegisterRequest>,
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
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
        )
        .await
    {
        Ok(user) => HttpResponse::Created().json(UserResponse::from(user)),
        Err(error) => handle_domain_error(error),
    }
}
