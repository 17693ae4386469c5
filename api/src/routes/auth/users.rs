//! User administration, admin role only

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use ec_shared::types::{PaginatedResponse, Pagination};

use crate::dto::auth::UserResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AdminContext;

use ec_core::repositories::{
    RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository,
};
use ec_core::services::EmailServiceTrait;

use super::AppState;

/// Handler for GET /auth/users?page=&per_page=
///
/// Users oldest first. `per_page` is clamped to 1..=100.
pub async fn list_users<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    _admin: AdminContext,
    query: web::Query<Pagination>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    let pagination = query.into_inner().validate();

    match state.auth_service.list_users(pagination).await {
        Ok((users, total)) => HttpResponse::Ok()
            .json(PaginatedResponse::new(users, pagination, total).map(UserResponse::from)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for DELETE /auth/users/{id}
///
/// Removes the user with their sessions and pending verification.
pub async fn delete_user<U, T, R, V, E>(
    state: web::Data<AppState<U, T, R, V, E>>,
    admin: AdminContext,
    path: web::Path<Uuid>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    let user_id = path.into_inner();

    match state.auth_service.delete_user(user_id).await {
        Ok(()) => {
            tracing::info!(admin_id = %admin.0.user_id, user_id = %user_id, "User removed by admin");
            HttpResponse::NoContent().finish()
        }
        Err(error) => handle_domain_error(error),
    }
}
