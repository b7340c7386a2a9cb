// Customer resolution
// The acting customer comes from the session, or else from the order behind
// a review request. Absence is not an error here; callers pick the failure.

use crate::error::ApiResult;
use crate::http::RequestContext;
use crate::models::Customer;
use crate::store::Services;

pub const REVIEW_REQUEST_KEY: &str = "review_request_id";

pub async fn validated_customer(
    ctx: &RequestContext,
    services: &Services,
) -> ApiResult<Option<Customer>> {
    if let Some(customer_id) = ctx.session.as_ref().and_then(|s| s.customer_id()) {
        return Ok(services.customers.retrieve(customer_id).await?);
    }

    let Some(request_id) = ctx.lookup(REVIEW_REQUEST_KEY) else {
        return Ok(None);
    };

    let request = services.review_requests.retrieve(request_id).await?;
    Ok(request
        .and_then(|request| request.order)
        .and_then(|order| order.customer))
}
