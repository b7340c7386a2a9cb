// Review route table

use super::handlers::ReviewHandler;
use crate::routing::{RouteConfig, RouteMethod};

pub fn review_routes() -> Vec<RouteConfig<ReviewHandler>> {
    vec![
        RouteConfig {
            path: "/store/product-reviews",
            method: RouteMethod::Get,
            handler: ReviewHandler::ListReviews,
            required_auth: false,
        },
        RouteConfig {
            path: "/store/product-reviews/stats",
            method: RouteMethod::Get,
            handler: ReviewHandler::ReviewStats,
            required_auth: false,
        },
        RouteConfig {
            path: "/store/product-reviews",
            method: RouteMethod::Post,
            handler: ReviewHandler::CreateReview,
            required_auth: true,
        },
        RouteConfig {
            path: "/store/product-reviews/:product_review_id",
            method: RouteMethod::Post,
            handler: ReviewHandler::UpdateReview,
            required_auth: true,
        },
        RouteConfig {
            path: "/admin/product-reviews",
            method: RouteMethod::Get,
            handler: ReviewHandler::ListReviews,
            required_auth: true,
        },
        RouteConfig {
            path: "/admin/product-reviews/:id",
            method: RouteMethod::Delete,
            handler: ReviewHandler::DeleteReview,
            required_auth: true,
        },
    ]
}
