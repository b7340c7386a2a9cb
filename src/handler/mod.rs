//! Request handler module
//!
//! Entry point for every HTTP request: health probes, CORS, authentication
//! guards and dispatch to the review handlers.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
