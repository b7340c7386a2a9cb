// Shared fixtures for review tests

use chrono::Utc;
use std::sync::Arc;

use crate::models::{Customer, LineItem, Order, ProductReviewRequest, ProductVariant};
use crate::store::{MemoryStore, Services};

pub const CUSTOMER_A: &str = "cus_a";
pub const CUSTOMER_B: &str = "cus_b";
pub const ORDER_B: &str = "order_b";
pub const REQUEST_B: &str = "prr_b";

fn customer(id: &str, name: &str) -> Customer {
    Customer {
        id: id.to_string(),
        email: format!("{name}@example.com"),
        first_name: Some(name.to_string()),
        last_name: None,
    }
}

fn item(id: &str, product_id: &str) -> LineItem {
    LineItem {
        id: id.to_string(),
        title: None,
        variant: Some(ProductVariant {
            id: format!("variant_{product_id}"),
            product_id: product_id.to_string(),
        }),
    }
}

/// Two customers; customer B has order `order_b` (products `prod_1`,
/// `prod_2`) and review request `prr_b`
pub async fn fixture_memory_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_customer(customer(CUSTOMER_A, "ada")).await;
    store.insert_customer(customer(CUSTOMER_B, "bob")).await;
    store
        .insert_order(Order {
            id: ORDER_B.to_string(),
            customer_id: CUSTOMER_B.to_string(),
            items: vec![item("li_1", "prod_1"), item("li_2", "prod_2")],
            customer: None,
        })
        .await;
    store
        .insert_review_request(ProductReviewRequest {
            id: REQUEST_B.to_string(),
            order_id: ORDER_B.to_string(),
            created_at: Utc::now(),
            order: None,
        })
        .await;
    store
}

pub async fn fixture_store() -> Services {
    Services::in_memory(fixture_memory_store().await)
}
