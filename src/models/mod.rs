//! Domain records
//!
//! Entities owned by the store layer. Relations are `Option`s that are only
//! populated when a caller asks for them and are skipped on serialization
//! otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A customer's review of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: String,
    pub product_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductReviewImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// Ratings run from 1 to 5 stars
pub fn check_rating(rating: u8) -> Result<(), String> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(format!("rating must be between 1 and 5, got {rating}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReviewImage {
    pub id: String,
    pub review_id: String,
    pub url: String,
}

/// Token that lets the customer of an order review it without a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReviewRequest {
    pub id: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

impl Order {
    /// Product ids referenced by the order's line items, in item order
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.items.len());
        for id in self
            .items
            .iter()
            .filter_map(|item| item.variant.as_ref().map(|v| &v.product_id))
        {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Missing when the variant was deleted after the order was placed
    #[serde(default)]
    pub variant: Option<ProductVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
}

/// Aggregated ratings of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReviewStats {
    pub product_id: String,
    pub count: u64,
    pub average: f64,
    pub by_rating: BTreeMap<u8, u64>,
}

impl ProductReviewStats {
    pub fn empty(product_id: String) -> Self {
        Self {
            product_id,
            count: 0,
            average: 0.0,
            by_rating: (1..=5).map(|r| (r, 0)).collect(),
        }
    }

    pub fn record(&mut self, rating: u8) {
        *self.by_rating.entry(rating).or_insert(0) += 1;
        self.count += 1;
        let total: u64 = self
            .by_rating
            .iter()
            .map(|(rating, n)| u64::from(*rating) * n)
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let average = total as f64 / self.count as f64;
        self.average = average;
    }
}
