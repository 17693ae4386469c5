use actix_web::{web, HttpResponse};

use ec_shared::types::MessageResponse;

use crate::dto::auth::LogoutRequest;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::BearerToken;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/logout
///
/// Revokes the presented access token and, when the body carries one, the
/// refresh token. Not behind the JWT middleware: an expired access token
/// that is otherwise valid still logs out.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Request Body (optional)
///
/// ```json
/// {
///     "refreshToken": "9f2c..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: missing, malformed or wrongly signed access token
pub async fn logout<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    token: BearerToken,
    body: Option<web::Json<LogoutRequest>>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    match state
        .auth_service
        .logout(&token.0, request.refresh_token.as_deref())
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")),
        Err(error) => handle_domain_error(error),
    }
}
