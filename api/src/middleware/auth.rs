//! JWT authentication middleware for protecting API endpoints.
//!
//! The middleware takes the bearer token from the Authorization header,
//! verifies it through the authentication service (signature, expiry and the
//! shared revocation set) and injects an `AuthContext` into the request.
//! Rejected requests are answered here with the 401 body and never reach
//! the handler.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};
use uuid::Uuid;

use ec_core::{
    domain::entities::token::Claims,
    domain::entities::user::UserRole,
    errors::{AuthError, DomainError, DomainResult, TokenError},
    repositories::{RevocationStore, TokenRepository, UserRepository, VerificationCodeRepository},
    services::{AuthService, EmailServiceTrait},
};

use crate::handlers::error::{domain_error_into_actix, handle_domain_error};

/// Authenticated caller, taken from verified access-token claims
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// JWT ID, the key used when the token is revoked
    pub jti: String,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let user_id = claims.user_id().map_err(|_| TokenError::Invalid)?;
        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
            jti: claims.jti,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Verifies access tokens. Object safe so the middleware does not carry the
/// service's type parameters. Futures run on the worker's local executor.
#[async_trait(?Send)]
pub trait AccessTokenVerifier: Send + Sync {
    async fn verify_access_token(&self, token: &str) -> DomainResult<Claims>;
}

#[async_trait(?Send)]
impl<U, T, R, V, E> AccessTokenVerifier for AuthService<U, T, R, V, E>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    R: RevocationStore + 'static,
    V: VerificationCodeRepository + 'static,
    E: EmailServiceTrait + 'static,
{
    async fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        self.authenticate(token).await
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl JwtAuth {
    pub fn new(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();

        Box::pin(async move {
            let verified = match extract_bearer_token(req.request()) {
                Some(token) => verifier
                    .verify_access_token(&token)
                    .await
                    .and_then(AuthContext::from_claims),
                None => Err(TokenError::Invalid.into()),
            };

            match verified {
                Ok(context) => {
                    tracing::debug!(user_id = %context.user_id, "Access token accepted");
                    req.extensions_mut().insert(context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(error) => {
                    let response = handle_domain_error(error);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Bearer token from the Authorization header, if well formed
pub fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Extractor for routes behind `JwtAuth`
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| domain_error_into_actix(TokenError::Invalid.into()));

        ready(result)
    }
}

/// Authenticated caller holding the admin role. Anyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

impl FromRequest for AdminContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<AuthContext>() {
            Some(context) if context.is_admin() => Ok(AdminContext(context.clone())),
            Some(context) => {
                tracing::info!(user_id = %context.user_id, role = %context.role, "Admin route refused");
                Err(domain_error_into_actix(AuthError::InsufficientPermissions.into()))
            }
            None => Err(domain_error_into_actix(TokenError::Invalid.into())),
        };

        ready(result)
    }
}

/// Raw bearer token, for routes that must accept tokens `JwtAuth` would
/// refuse (logout takes expired tokens)
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            extract_bearer_token(req)
                .map(BearerToken)
                .ok_or_else(|| domain_error_into_actix(TokenError::Invalid.into())),
        )
    }
}
