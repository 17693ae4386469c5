//! Email delivery adapters.

pub mod logging_email;

pub use logging_email::LoggingEmailService;
