//! Product review endpoints for a storefront and its admin.
//!
//! Reviews are created and updated by customers, listed and aggregated
//! publicly, and deleted by staff.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod models;
pub mod reviews;
pub mod routing;
pub mod server;
pub mod store;
