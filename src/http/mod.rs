//! HTTP protocol layer module
//!
//! Request parsing, JSON responses and CORS, decoupled from the review
//! handlers that sit on top.

pub mod cors;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use cors::{CorsPolicies, CorsPolicy};
pub use request::{BoxError, parse_query, read_json_body, RequestContext};
pub use response::{build_health_response, error_response, json_response, not_found};
