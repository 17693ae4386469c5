//! Mapping of domain errors onto HTTP responses.
//!
//! Every failure leaves the API as an `ErrorResponse` body. Token failures
//! are collapsed so a caller cannot tell a revoked token from a forged one,
//! and internal details never reach the client.

use actix_web::{error::InternalError, http::StatusCode, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use ec_core::errors::{AuthError, DomainError, FieldErrors, TokenError};
use ec_shared::errors::{error_codes, ErrorResponse};

/// Message shared by every 401 caused by a bad or missing access token
pub const TOKEN_FAILURE_MESSAGE: &str = "Missing, invalid or expired token";

/// Convert a domain error to an HTTP response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let (status, body) = map_domain_error(&error);

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), "Request rejected");
    }

    HttpResponse::build(status).json(body)
}

fn map_domain_error(error: &DomainError) -> (StatusCode, ErrorResponse) {
    match error {
        DomainError::Auth(auth_error) => map_auth_error(auth_error),
        DomainError::Token(token_error) => token_error_response(*token_error),
        DomainError::InvalidInput { fields } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::with_field_errors(
                error_codes::VALIDATION_ERROR,
                "Request validation failed",
                fields,
            ),
        ),
        DomainError::NotFound { resource } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new(error_codes::NOT_FOUND, format!("{} not found", resource)),
        ),
        DomainError::Forbidden { message } => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::FORBIDDEN, message.clone()),
        ),
        DomainError::Conflict { message } => (
            StatusCode::CONFLICT,
            ErrorResponse::new(error_codes::CONFLICT, message.clone()),
        ),
        DomainError::StoreUnavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable, please retry",
            ),
        ),
        DomainError::Config { .. } | DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred"),
        ),
    }
}

fn map_auth_error(error: &AuthError) -> (StatusCode, ErrorResponse) {
    match error {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::INVALID_CREDENTIALS, "Invalid email or password"),
        ),
        AuthError::AccountSuspended => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::ACCOUNT_SUSPENDED, "Account is suspended"),
        ),
        AuthError::AccountInactive => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::ACCOUNT_INACTIVE, "Account is inactive"),
        ),
        AuthError::InsufficientPermissions => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::FORBIDDEN, "Insufficient permissions"),
        ),
        AuthError::EmailAlreadyExists => (
            StatusCode::CONFLICT,
            ErrorResponse::new(error_codes::DUPLICATE_EMAIL, "Email is already registered"),
        ),
        AuthError::EmailAlreadyVerified => (
            StatusCode::CONFLICT,
            ErrorResponse::new(error_codes::ALREADY_VERIFIED, "Email is already verified"),
        ),
        AuthError::InvalidEmail => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::INVALID_EMAIL, "Email address is not valid"),
        ),
        AuthError::WeakPassword { requirements } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::WEAK_PASSWORD, error.to_string())
                .add_detail("requirements", requirements),
        ),
        AuthError::WrongCurrentPassword => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(
                error_codes::WRONG_CURRENT_PASSWORD,
                "Current password is incorrect",
            ),
        ),
        AuthError::InvalidVerificationCode => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::INVALID_CODE, "Verification code is invalid"),
        ),
        AuthError::VerificationCodeExpired => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(
                error_codes::EXPIRED_CODE,
                "Verification code has expired, request a new one",
            ),
        ),
        AuthError::TooManyVerificationAttempts => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(
                error_codes::TOO_MANY_ATTEMPTS,
                "Too many attempts, request a new verification code",
            ),
        ),
    }
}

/// 401 for token failures. Only expiry gets its own code.
pub fn token_error_response(error: TokenError) -> (StatusCode, ErrorResponse) {
    match error {
        TokenError::GenerationFailed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred"),
        ),
        TokenError::Expired => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::TOKEN_EXPIRED, TOKEN_FAILURE_MESSAGE),
        ),
        TokenError::Invalid | TokenError::Revoked | TokenError::WrongType => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::INVALID_TOKEN, TOKEN_FAILURE_MESSAGE),
        ),
    }
}

/// Turn a domain error into an `actix_web::Error` carrying the same JSON body.
/// For extractors and middleware, which cannot return a plain response.
pub fn domain_error_into_actix(error: DomainError) -> actix_web::Error {
    let message = error.to_string();
    InternalError::from_response(message, handle_domain_error(error)).into()
}

/// 400 with one entry per rejected field, using the JSON (camelCase) names
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    handle_domain_error(DomainError::InvalidInput {
        fields: field_errors(errors),
    })
}

pub(crate) fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, problems)| {
            let messages = problems
                .iter()
                .map(|problem| match &problem.message {
                    Some(message) => message.to_string(),
                    None => format!("failed {} check", problem.code),
                })
                .collect();
            (to_camel_case(field), messages)
        })
        .collect()
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Malformed or missing JSON bodies
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        format!("Invalid request body: {}", err),
    ));
    InternalError::from_response(err, response).into()
}

/// Malformed query strings
pub fn query_error_handler(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        format!("Invalid query string: {}", err),
    ));
    InternalError::from_response(err, response).into()
}

/// Path segments that do not parse, such as a malformed user id
pub fn path_error_handler(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ));
    InternalError::from_response(err, response).into()
}
