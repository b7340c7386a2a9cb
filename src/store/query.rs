// Query shapes passed from handlers to review stores

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::models::ProductReview;

/// Persisted review columns that can be selected or sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewColumn {
    Id,
    ProductId,
    CustomerId,
    OrderId,
    Rating,
    Title,
    Content,
    CreatedAt,
    UpdatedAt,
}

impl ReviewColumn {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ProductId => "product_id",
            Self::CustomerId => "customer_id",
            Self::OrderId => "order_id",
            Self::Rating => "rating",
            Self::Title => "title",
            Self::Content => "content",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for ReviewColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "product_id" => Ok(Self::ProductId),
            "customer_id" => Ok(Self::CustomerId),
            "order_id" => Ok(Self::OrderId),
            "rating" => Ok(Self::Rating),
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(format!("unknown review field '{other}'")),
        }
    }
}

/// Relations a review can be loaded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewRelation {
    Images,
    Customer,
    Order,
}

impl ReviewRelation {
    pub const ALL: [Self; 3] = [Self::Images, Self::Customer, Self::Order];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Customer => "customer",
            Self::Order => "order",
        }
    }
}

impl FromStr for ReviewRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "images" => Ok(Self::Images),
            "customer" => Ok(Self::Customer),
            "order" => Ok(Self::Order),
            other => Err(format!("unknown review relation '{other}'")),
        }
    }
}

impl fmt::Display for ReviewRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Persistence filter for review listings
///
/// Every populated field must match. Pagination and response-shape controls
/// live in [`FindConfig`] and never appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSelector {
    pub ids: Option<Vec<String>>,
    pub product_ids: Option<Vec<String>>,
    pub customer_ids: Option<Vec<String>>,
    pub rating: Option<u8>,
}

impl ReviewSelector {
    pub fn matches(&self, review: &ProductReview) -> bool {
        fn within(set: Option<&Vec<String>>, value: &str) -> bool {
            set.map_or(true, |set| set.iter().any(|v| v == value))
        }

        within(self.ids.as_ref(), &review.id)
            && within(self.product_ids.as_ref(), &review.product_id)
            && within(self.customer_ids.as_ref(), &review.customer_id)
            && self.rating.map_or(true, |r| review.rating == r)
    }
}

/// How a listing is ordered, paged and shaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindConfig {
    pub order: (ReviewColumn, SortOrder),
    pub skip: usize,
    pub take: usize,
    /// Columns to return besides `id`; `None` returns every column
    pub select: Option<Vec<ReviewColumn>>,
    pub relations: Vec<ReviewRelation>,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            order: (ReviewColumn::UpdatedAt, SortOrder::Desc),
            skip: 0,
            take: 10,
            select: None,
            relations: Vec::new(),
        }
    }
}

impl FindConfig {
    /// Serialize a review keeping `id`, the selected columns and any loaded
    /// relations
    pub fn project(&self, review: &ProductReview) -> Value {
        let Ok(Value::Object(fields)) = serde_json::to_value(review) else {
            return Value::Null;
        };
        let Some(select) = &self.select else {
            return Value::Object(fields);
        };

        let keep = |key: &str| {
            key == ReviewColumn::Id.as_str()
                || select.iter().any(|c| c.as_str() == key)
                || ReviewRelation::ALL.iter().any(|r| r.as_str() == key)
        };
        let projected: Map<String, Value> =
            fields.into_iter().filter(|(key, _)| keep(key)).collect();
        Value::Object(projected)
    }
}

/// Products whose ratings are aggregated; `None` covers every reviewed product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsScope {
    pub product_ids: Option<Vec<String>>,
}
