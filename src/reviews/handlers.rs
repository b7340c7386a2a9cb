// Review route handlers
// Each handler validates its input, resolves the caller when it needs one,
// delegates to the store and shapes the JSON reply

use hyper::StatusCode;
use serde_json::{json, Value};

use super::resolver::validated_customer;
use super::validators::{
    validator, CreateProductReviewReq, StoreGetProductReviewStatsParams,
    StoreGetProductReviewsParams, UpdateProductReviewReq,
};
use crate::error::{ApiError, ApiResult};
use crate::http::RequestContext;
use crate::store::{
    FindConfig, NewReview, ReviewColumn, ReviewRelation, ReviewUpdate, Services, SortOrder,
};

/// Relations loaded when a listing does not name any
pub const DEFAULT_RELATIONS: [ReviewRelation; 2] =
    [ReviewRelation::Images, ReviewRelation::Customer];

const NOT_OWNED: &str = "Review does not exist or does not belong to customer";

/// Successful handler output
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub const fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

/// Handlers the review routes dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewHandler {
    ListReviews,
    ReviewStats,
    CreateReview,
    UpdateReview,
    DeleteReview,
}

impl ReviewHandler {
    pub async fn call(self, ctx: &RequestContext, services: &Services) -> ApiResult<Reply> {
        match self {
            Self::ListReviews => list_product_reviews(ctx, services).await,
            Self::ReviewStats => product_review_stats(ctx, services).await,
            Self::CreateReview => create_product_review(ctx, services).await,
            Self::UpdateReview => update_product_review(ctx, services).await,
            Self::DeleteReview => delete_product_review(ctx, services).await,
        }
    }
}

pub async fn create_product_review(ctx: &RequestContext, services: &Services) -> ApiResult<Reply> {
    let validated: CreateProductReviewReq = validator(ctx.body.clone())?;

    let customer = validated_customer(ctx, services)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("No customer found for request".to_string()))?;

    let review = services
        .reviews
        .create(NewReview {
            product_id: validated.product_id,
            customer_id: customer.id,
            order_id: validated.order_id,
            rating: validated.rating,
            title: validated.title,
            content: validated.content,
            images: validated.images,
        })
        .await?;

    Ok(Reply::ok(json!({ "review": review })))
}

pub async fn list_product_reviews(ctx: &RequestContext, services: &Services) -> ApiResult<Reply> {
    let validated: StoreGetProductReviewsParams = validator(Value::Object(ctx.query.clone()))?;

    let mut selector = validated.selector();
    if let Some(order_id) = validated.order_id() {
        let order = services.orders.retrieve(order_id).await?.ok_or_else(|| {
            ApiError::InvalidData("No reviews found matching order".to_string())
        })?;
        selector.product_ids = Some(order.product_ids());
    }

    let config = FindConfig {
        order: (ReviewColumn::UpdatedAt, SortOrder::Desc),
        skip: validated.offset(),
        take: validated.limit(),
        select: validated.select().map_err(ApiError::Validation)?,
        relations: validated
            .relations()
            .map_err(ApiError::Validation)?
            .unwrap_or_else(|| DEFAULT_RELATIONS.to_vec()),
    };

    let (reviews, count) = services.reviews.list_and_count(&selector, &config).await?;
    let reviews: Vec<Value> = reviews.iter().map(|review| config.project(review)).collect();

    Ok(Reply::ok(json!({ "reviews": reviews, "count": count })))
}

pub async fn product_review_stats(ctx: &RequestContext, services: &Services) -> ApiResult<Reply> {
    let validated: StoreGetProductReviewStatsParams = validator(Value::Object(ctx.query.clone()))?;

    let stats = services.reviews.stats(&validated.scope()).await?;

    Ok(Reply::ok(json!({ "stats": stats })))
}

pub async fn update_product_review(ctx: &RequestContext, services: &Services) -> ApiResult<Reply> {
    let validated: UpdateProductReviewReq = validator(ctx.body.clone())?;
    let id = validated.resolve_id(ctx.params.get("product_review_id").map(String::as_str))?;

    let customer = validated_customer(ctx, services)
        .await?
        .ok_or_else(|| ApiError::InvalidData("No customer found for request".to_string()))?;

    // Not transactional: a concurrent delete between these calls surfaces as
    // `None` from `update` below
    let current = services.reviews.retrieve(&id).await?;
    if !current.is_some_and(|review| review.customer_id == customer.id) {
        return Err(ApiError::InvalidData(NOT_OWNED.to_string()));
    }

    let review = services
        .reviews
        .update(ReviewUpdate {
            id,
            rating: validated.rating,
            title: validated.title,
            content: validated.content,
            images: validated.images,
        })
        .await?
        .ok_or_else(|| ApiError::InvalidData(NOT_OWNED.to_string()))?;

    Ok(Reply::ok(json!({ "review": review })))
}

pub async fn delete_product_review(ctx: &RequestContext, services: &Services) -> ApiResult<Reply> {
    let id = ctx
        .params
        .get("id")
        .ok_or_else(|| ApiError::Validation("id must not be empty".to_string()))?;

    if services.reviews.retrieve(id).await?.is_none() {
        return Err(ApiError::InvalidData("Could not find review".to_string()));
    }

    services.reviews.delete(id).await?;

    Ok(Reply::ok(json!({ "success": true })))
}
