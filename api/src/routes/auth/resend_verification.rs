use actix_web::{web, HttpResponse};

use crate::dto::auth::ResendVerificationResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for POST /auth/resend-verification
///
/// Replaces any pending code with a new one. 409 `ALREADY_VERIFIED` once the
/// address is confirmed.
pub async fn resend_verification<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    match state.auth_service.resend_verification(auth.user_id).await {
        Ok(result) => HttpResponse::Ok().json(ResendVerificationResponse::from(result)),
        Err(error) => handle_domain_error(error),
    }
}
