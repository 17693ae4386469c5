//! HTTP layer of the authentication service.
//!
//! Exposes the `/auth` endpoints over Actix-web. Library exports exist for
//! integration tests and for embedding the routes in another binary.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::auth::AppState;
