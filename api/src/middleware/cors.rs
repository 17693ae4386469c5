//! CORS middleware configuration for cross-origin requests.
//!
//! Browser storefronts and the admin console call the API from other
//! origins. Allowed origins come from `CorsConfig`; an empty list allows any
//! origin and is refused in production by config validation.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use ec_shared::config::CorsConfig;

/// Creates a CORS middleware instance from configuration.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age);

    if config.allowed_origins.is_empty() {
        tracing::info!("CORS allows any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            tracing::info!(origin = %origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
