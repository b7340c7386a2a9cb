// Request validators
// Shape checks come from serde (unknown fields are rejected), value checks
// from each type's `Validate` impl

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};
use crate::models::check_rating;
use crate::store::{ReviewColumn, ReviewRelation, ReviewSelector, StatsScope};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

pub trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Deserialize and check a request input
pub fn validator<T: DeserializeOwned + Validate>(input: Value) -> ApiResult<T> {
    let parsed: T = serde_json::from_value(input).map_err(|e| ApiError::Validation(e.to_string()))?;
    parsed.validate().map_err(ApiError::Validation)?;
    Ok(parsed)
}

/// A single value or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

/// Accept numbers given either as JSON numbers or as query-string text
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + TryFrom<u64>,
    <T as FromStr>::Err: Display,
    <T as TryFrom<u64>>::Error: Display,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => T::try_from(n).map(Some).map_err(de::Error::custom),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid number '{text}': {e}"))),
    }
}

fn check_not_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

fn check_images(images: &[String]) -> Result<(), String> {
    images
        .iter()
        .try_for_each(|url| check_not_blank("image url", url))
}

/// Body of `POST /store/product-reviews`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductReviewReq {
    pub product_id: String,
    pub rating: u8,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Only used to resolve the customer
    #[serde(default)]
    pub review_request_id: Option<String>,
}

impl Validate for CreateProductReviewReq {
    fn validate(&self) -> Result<(), String> {
        check_not_blank("product_id", &self.product_id)?;
        check_rating(self.rating)?;
        check_not_blank("content", &self.content)?;
        check_images(&self.images)
    }
}

/// Body of `POST /store/product-reviews/:product_review_id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductReviewReq {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Only used to resolve the customer
    #[serde(default)]
    pub review_request_id: Option<String>,
}

impl Validate for UpdateProductReviewReq {
    fn validate(&self) -> Result<(), String> {
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        if let Some(content) = &self.content {
            check_not_blank("content", content)?;
        }
        if let Some(images) = &self.images {
            check_images(images)?;
        }
        Ok(())
    }
}

impl UpdateProductReviewReq {
    /// Settle the review id between body and path
    pub fn resolve_id(&self, path_id: Option<&str>) -> ApiResult<String> {
        match (self.id.as_deref(), path_id) {
            (Some(body), Some(path)) if body != path => Err(ApiError::Validation(format!(
                "id {body} does not match the review in the path ({path})"
            ))),
            (Some(id), _) | (None, Some(id)) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(ApiError::Validation("id must not be empty".to_string())),
        }
    }
}

/// Query of the review listings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreGetProductReviewsParams {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub id: Option<OneOrMany>,
    #[serde(default)]
    pub product_id: Option<OneOrMany>,
    #[serde(default)]
    pub customer_id: Option<OneOrMany>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<u8>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub offset: Option<usize>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub limit: Option<usize>,
    /// Comma-separated columns to return
    #[serde(default)]
    pub fields: Option<String>,
    /// Comma-separated relations to load
    #[serde(default)]
    pub expand: Option<String>,
}

impl Validate for StoreGetProductReviewsParams {
    fn validate(&self) -> Result<(), String> {
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        if self.limit.is_some_and(|limit| limit > MAX_LIMIT) {
            return Err(format!("limit must not exceed {MAX_LIMIT}"));
        }
        self.select()?;
        self.relations()?;
        Ok(())
    }
}

impl StoreGetProductReviewsParams {
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// `order_id` when given and non-empty
    pub fn order_id(&self) -> Option<&str> {
        present(self.order_id.as_deref())
    }

    /// Columns named in `fields`, `None` when absent or empty
    pub fn select(&self) -> Result<Option<Vec<ReviewColumn>>, String> {
        present(self.fields.as_deref())
            .map(|fields| {
                split_list(fields)
                    .map(str::parse::<ReviewColumn>)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
    }

    /// Relations named in `expand`, deduplicated in first-seen order;
    /// `None` when absent or empty
    pub fn relations(&self) -> Result<Option<Vec<ReviewRelation>>, String> {
        let Some(expand) = present(self.expand.as_deref()) else {
            return Ok(None);
        };
        let mut relations = Vec::new();
        for name in split_list(expand) {
            let relation = name.parse::<ReviewRelation>()?;
            if !relations.contains(&relation) {
                relations.push(relation);
            }
        }
        Ok(Some(relations))
    }

    /// Persistence filter: everything except order and shape controls
    pub fn selector(&self) -> ReviewSelector {
        ReviewSelector {
            ids: self.id.clone().map(OneOrMany::into_vec),
            product_ids: self.product_id.clone().map(OneOrMany::into_vec),
            customer_ids: self.customer_id.clone().map(OneOrMany::into_vec),
            rating: self.rating,
        }
    }
}

/// Query of `GET /store/product-reviews/stats`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreGetProductReviewStatsParams {
    #[serde(default)]
    pub product_id: Option<OneOrMany>,
}

impl Validate for StoreGetProductReviewStatsParams {}

impl StoreGetProductReviewStatsParams {
    pub fn scope(self) -> StatsScope {
        StatsScope {
            product_ids: self.product_id.map(OneOrMany::into_vec),
        }
    }
}

/// Empty query values count as not given
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}
