// Seed dataset loader
// Fills a MemoryStore from a TOML file so the service can run without a
// database behind it

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use super::MemoryStore;
use crate::models::{
    check_rating, Customer, Order, ProductReview, ProductReviewImage, ProductReviewRequest,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid seed file {path}: review {review}: {reason}")]
    InvalidReview {
        path: String,
        review: String,
        reason: String,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub review_requests: Vec<SeedReviewRequest>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

#[derive(Debug, Deserialize)]
pub struct SeedReviewRequest {
    pub id: String,
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedReview {
    #[serde(default)]
    pub id: Option<String>,
    pub product_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Counts of what was loaded, for the startup log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub orders: usize,
    pub review_requests: usize,
    pub reviews: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} customers, {} orders, {} review requests, {} reviews",
            self.customers, self.orders, self.review_requests, self.reviews
        )
    }
}

impl SeedData {
    /// Parse a seed file, holding reviews to the same rating rule as the API
    pub fn from_toml(path: &str, contents: &str) -> Result<Self, SeedError> {
        let data: Self = toml::from_str(contents).map_err(|source| SeedError::Parse {
            path: path.to_string(),
            source,
        })?;

        for (index, review) in data.reviews.iter().enumerate() {
            check_rating(review.rating).map_err(|reason| SeedError::InvalidReview {
                path: path.to_string(),
                review: review.id.clone().unwrap_or_else(|| format!("#{}", index + 1)),
                reason,
            })?;
        }
        Ok(data)
    }
}

/// Read a seed file and load it into the store
pub async fn load_file(store: &MemoryStore, path: &Path) -> Result<SeedSummary, SeedError> {
    let display = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: display.clone(),
            source,
        })?;
    let data = SeedData::from_toml(&display, &contents)?;
    Ok(apply(store, data).await)
}

pub async fn apply(store: &MemoryStore, data: SeedData) -> SeedSummary {
    let summary = SeedSummary {
        customers: data.customers.len(),
        orders: data.orders.len(),
        review_requests: data.review_requests.len(),
        reviews: data.reviews.len(),
    };

    for customer in data.customers {
        store.insert_customer(customer).await;
    }
    for order in data.orders {
        store.insert_order(order).await;
    }

    let now = Utc::now();
    for request in data.review_requests {
        store
            .insert_review_request(ProductReviewRequest {
                id: request.id,
                order_id: request.order_id,
                created_at: now,
                order: None,
            })
            .await;
    }

    for seed in data.reviews {
        let id = seed
            .id
            .unwrap_or_else(|| format!("prev_{}", Uuid::new_v4().simple()));
        let images = seed
            .images
            .into_iter()
            .map(|url| ProductReviewImage {
                id: format!("previmg_{}", Uuid::new_v4().simple()),
                review_id: id.clone(),
                url,
            })
            .collect();
        store
            .insert_review(ProductReview {
                id,
                product_id: seed.product_id,
                customer_id: seed.customer_id,
                order_id: seed.order_id,
                rating: seed.rating,
                title: seed.title,
                content: seed.content,
                created_at: now,
                updated_at: now,
                images: Some(images),
                customer: None,
                order: None,
            })
            .await;
    }

    summary
}
