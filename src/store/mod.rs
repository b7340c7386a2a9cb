//! Data access layer
//!
//! Typed capabilities the request handlers depend on. Handlers never reach a
//! backend directly; they receive a [`Services`] bundle of trait objects at
//! construction time.

mod memory;
mod query;
pub mod seed;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Customer, Order, ProductReview, ProductReviewRequest, ProductReviewStats};

pub use memory::MemoryStore;
pub use query::{FindConfig, ReviewColumn, ReviewRelation, ReviewSelector, SortOrder, StatsScope};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields of a review about to be created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReview {
    pub product_id: String,
    pub customer_id: String,
    pub order_id: Option<String>,
    pub rating: u8,
    pub title: Option<String>,
    pub content: String,
    pub images: Vec<String>,
}

/// Partial update of a review; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub id: String,
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Replaces the whole image set when present
    pub images: Option<Vec<String>>,
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create(&self, review: NewReview) -> StoreResult<ProductReview>;

    async fn retrieve(&self, id: &str) -> StoreResult<Option<ProductReview>>;

    /// Returns `None` when the review no longer exists
    async fn update(&self, update: ReviewUpdate) -> StoreResult<Option<ProductReview>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Matching page plus the total number of matches before pagination
    async fn list_and_count(
        &self,
        selector: &ReviewSelector,
        config: &FindConfig,
    ) -> StoreResult<(Vec<ProductReview>, u64)>;

    async fn stats(&self, scope: &StatsScope) -> StoreResult<Vec<ProductReviewStats>>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn retrieve(&self, id: &str) -> StoreResult<Option<Customer>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Order with its line items and their variants
    async fn retrieve(&self, id: &str) -> StoreResult<Option<Order>>;
}

#[async_trait]
pub trait ReviewRequestStore: Send + Sync {
    /// Request with `order` and `order.customer` expanded
    async fn retrieve(&self, id: &str) -> StoreResult<Option<ProductReviewRequest>>;
}

/// Capability set handed to every request handler
#[derive(Clone)]
pub struct Services {
    pub reviews: Arc<dyn ReviewStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub orders: Arc<dyn OrderStore>,
    pub review_requests: Arc<dyn ReviewRequestStore>,
}

impl Services {
    /// All four capabilities backed by one in-memory store
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            reviews: store.clone(),
            customers: store.clone(),
            orders: store.clone(),
            review_requests: store,
        }
    }
}
