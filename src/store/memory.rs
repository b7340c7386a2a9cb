// In-memory store
// Backs every store capability with process-local tables; used by tests and
// by the demo binary (optionally seeded from a TOML dataset)

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query::{FindConfig, ReviewRelation, ReviewSelector, SortOrder, StatsScope};
use super::{
    CustomerStore, NewReview, OrderStore, ReviewRequestStore, ReviewStore, ReviewUpdate,
    StoreResult,
};
use crate::models::{
    Customer, Order, ProductReview, ProductReviewImage, ProductReviewRequest, ProductReviewStats,
};

struct StoredReview {
    review: ProductReview,
    /// Write sequence, breaks ties between equal `updated_at` values
    touched: u64,
}

#[derive(Default)]
struct Tables {
    reviews: HashMap<String, StoredReview>,
    images: HashMap<String, Vec<ProductReviewImage>>,
    customers: HashMap<String, Customer>,
    orders: HashMap<String, Order>,
    review_requests: HashMap<String, ProductReviewRequest>,
    writes: u64,
}

impl Tables {
    fn next_write(&mut self) -> u64 {
        self.writes += 1;
        self.writes
    }

    fn replace_images(&mut self, review_id: &str, urls: Vec<String>) {
        let images = urls
            .into_iter()
            .map(|url| ProductReviewImage {
                id: format!("previmg_{}", Uuid::new_v4().simple()),
                review_id: review_id.to_string(),
                url,
            })
            .collect();
        self.images.insert(review_id.to_string(), images);
    }

    fn with_relations(
        &self,
        review: &ProductReview,
        relations: &[ReviewRelation],
    ) -> ProductReview {
        let mut loaded = review.clone();
        for relation in relations {
            match relation {
                ReviewRelation::Images => {
                    loaded.images = Some(self.images.get(&review.id).cloned().unwrap_or_default());
                }
                ReviewRelation::Customer => {
                    loaded.customer = self.customers.get(&review.customer_id).cloned();
                }
                ReviewRelation::Order => {
                    loaded.order = review
                        .order_id
                        .as_ref()
                        .and_then(|id| self.orders.get(id))
                        .cloned();
                }
            }
        }
        loaded
    }
}

/// Process-local implementation of all store capabilities
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_customer(&self, customer: Customer) {
        let mut tables = self.tables.write().await;
        tables.customers.insert(customer.id.clone(), customer);
    }

    pub async fn insert_order(&self, order: Order) {
        let mut tables = self.tables.write().await;
        tables.orders.insert(order.id.clone(), order);
    }

    pub async fn insert_review_request(&self, request: ProductReviewRequest) {
        let mut tables = self.tables.write().await;
        tables.review_requests.insert(request.id.clone(), request);
    }

    /// Insert a fully formed review, keeping its id and timestamps
    pub async fn insert_review(&self, mut review: ProductReview) {
        let mut tables = self.tables.write().await;
        if let Some(images) = review.images.take() {
            tables.images.insert(review.id.clone(), images);
        }
        review.customer = None;
        review.order = None;
        let touched = tables.next_write();
        tables
            .reviews
            .insert(review.id.clone(), StoredReview { review, touched });
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create(&self, new: NewReview) -> StoreResult<ProductReview> {
        let now = Utc::now();
        let review = ProductReview {
            id: format!("prev_{}", Uuid::new_v4().simple()),
            product_id: new.product_id,
            customer_id: new.customer_id,
            order_id: new.order_id,
            rating: new.rating,
            title: new.title,
            content: new.content,
            created_at: now,
            updated_at: now,
            images: None,
            customer: None,
            order: None,
        };

        let mut tables = self.tables.write().await;
        tables.replace_images(&review.id, new.images);
        let touched = tables.next_write();
        tables.reviews.insert(
            review.id.clone(),
            StoredReview {
                review: review.clone(),
                touched,
            },
        );
        Ok(tables.with_relations(&review, &[ReviewRelation::Images]))
    }

    async fn retrieve(&self, id: &str) -> StoreResult<Option<ProductReview>> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.get(id).map(|stored| stored.review.clone()))
    }

    async fn update(&self, update: ReviewUpdate) -> StoreResult<Option<ProductReview>> {
        let mut tables = self.tables.write().await;
        let touched = tables.next_write();
        let Some(stored) = tables.reviews.get_mut(&update.id) else {
            return Ok(None);
        };

        let review = &mut stored.review;
        if let Some(rating) = update.rating {
            review.rating = rating;
        }
        if let Some(title) = update.title {
            review.title = Some(title);
        }
        if let Some(content) = update.content {
            review.content = content;
        }
        review.updated_at = Utc::now();
        stored.touched = touched;
        let review = review.clone();

        if let Some(urls) = update.images {
            tables.replace_images(&review.id, urls);
        }
        Ok(Some(tables.with_relations(&review, &[ReviewRelation::Images])))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.images.remove(id);
        Ok(tables.reviews.remove(id).is_some())
    }

    async fn list_and_count(
        &self,
        selector: &ReviewSelector,
        config: &FindConfig,
    ) -> StoreResult<(Vec<ProductReview>, u64)> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&StoredReview> = tables
            .reviews
            .values()
            .filter(|stored| selector.matches(&stored.review))
            .collect();

        let (column, direction) = config.order;
        matching.sort_by(|a, b| {
            let ordering = compare_column(&a.review, &b.review, column.as_str())
                .then(a.touched.cmp(&b.touched));
            match direction {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let count = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(config.skip)
            .take(config.take)
            .map(|stored| tables.with_relations(&stored.review, &config.relations))
            .collect();

        Ok((page, count))
    }

    async fn stats(&self, scope: &StatsScope) -> StoreResult<Vec<ProductReviewStats>> {
        let tables = self.tables.read().await;

        let mut by_product: BTreeMap<String, ProductReviewStats> = BTreeMap::new();
        if let Some(ids) = &scope.product_ids {
            for id in ids {
                by_product
                    .entry(id.clone())
                    .or_insert_with(|| ProductReviewStats::empty(id.clone()));
            }
        }

        for stored in tables.reviews.values() {
            let review = &stored.review;
            let in_scope = scope
                .product_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&review.product_id));
            if !in_scope {
                continue;
            }
            by_product
                .entry(review.product_id.clone())
                .or_insert_with(|| ProductReviewStats::empty(review.product_id.clone()))
                .record(review.rating);
        }

        Ok(by_product.into_values().collect())
    }
}

fn compare_column(a: &ProductReview, b: &ProductReview, column: &str) -> Ordering {
    match column {
        "created_at" => a.created_at.cmp(&b.created_at),
        "rating" => a.rating.cmp(&b.rating),
        "product_id" => a.product_id.cmp(&b.product_id),
        "customer_id" => a.customer_id.cmp(&b.customer_id),
        "id" => a.id.cmp(&b.id),
        _ => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn retrieve(&self, id: &str) -> StoreResult<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.get(id).cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn retrieve(&self, id: &str) -> StoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(id).cloned())
    }
}

#[async_trait]
impl ReviewRequestStore for MemoryStore {
    async fn retrieve(&self, id: &str) -> StoreResult<Option<ProductReviewRequest>> {
        let tables = self.tables.read().await;
        let Some(request) = tables.review_requests.get(id) else {
            return Ok(None);
        };

        let mut request = request.clone();
        request.order = tables.orders.get(&request.order_id).map(|order| {
            let mut order = order.clone();
            order.customer = tables.customers.get(&order.customer_id).cloned();
            order
        });
        Ok(Some(request))
    }
}
