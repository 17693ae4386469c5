use actix_web::{web, HttpResponse};

use crate::dto::auth::UserResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for GET /auth/me
///
/// Profile of the signed-in user. Requires the JWT middleware.
/// A token whose user has since been deleted gets 401 `INVALID_TOKEN`.
pub async fn me<U, T, R, V, E>(
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
    match state.auth_service.current_user(auth.user_id).await {
        Ok(user) => HttpResponse::Ok().json(UserResponse::from(user)),
        Err(error) => handle_domain_error(error),
    }
}
