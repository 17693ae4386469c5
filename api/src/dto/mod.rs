pub mod auth;

pub use ec_shared::errors::ErrorResponse;
