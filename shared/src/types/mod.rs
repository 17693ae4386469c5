//! Type definitions shared by the HTTP layer
//!
//! - `pagination` - Pagination for list endpoints
//! - `response` - acknowledgement and health check bodies

pub mod pagination;
pub mod response;

pub use pagination::{PaginatedResponse, Pagination};
pub use response::{HealthResponse, MessageResponse};
