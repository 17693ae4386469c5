pub mod auth;
pub mod cors;

pub use auth::{AccessTokenVerifier, AdminContext, AuthContext, BearerToken, JwtAuth};
pub use cors::create_cors;
