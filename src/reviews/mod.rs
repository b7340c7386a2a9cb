//! Product review endpoints
//!
//! Request validation, customer resolution, handlers and the route table
//! mounted by the server.

mod handlers;
mod resolver;
mod routes;
#[cfg(test)]
pub(crate) mod testing;
mod validators;

pub use handlers::{Reply, ReviewHandler, DEFAULT_RELATIONS};
pub use resolver::{validated_customer, REVIEW_REQUEST_KEY};
pub use routes::review_routes;
pub use validators::{
    validator, CreateProductReviewReq, StoreGetProductReviewStatsParams,
    StoreGetProductReviewsParams, UpdateProductReviewReq, Validate, DEFAULT_LIMIT, MAX_LIMIT,
};
