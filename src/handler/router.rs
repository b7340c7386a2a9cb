//! Request routing dispatch module
//!
//! Runs a request through access logging, health probes, CORS, the body size
//! limit, route matching and the route's authentication guard before handing
//! it to a review handler.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::Realm;
use crate::config::AppState;
use crate::error::{ApiError, ApiResult};
use crate::http::{self, BoxError, CorsPolicy, RequestContext};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{AuthGuard, RouteMatch};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, remote_addr));

    let response = route_request(req, &state).await;

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

/// Health probes, then CORS around the routed response
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();

    // Health check endpoints sit outside the base path and skip CORS
    let health = &state.config.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return http::build_health_response("ok");
    }

    let origin = header_str(&parts.headers, ORIGIN.as_str()).map(ToString::to_string);
    let cors: Option<&CorsPolicy> = state
        .router
        .relative_path(path)
        .and_then(|relative| state.cors.for_path(relative));

    if parts.method == Method::OPTIONS {
        if let Some(policy) = cors {
            let requested = header_str(&parts.headers, "access-control-request-headers");
            return policy.preflight(origin.as_deref(), requested);
        }
    }

    let mut response = match dispatch(&parts, body, state).await {
        Ok(response) => response,
        Err(err) => {
            if let ApiError::Store(ref source) = err {
                logger::log_error(&format!("{} {}: {source}", parts.method, path));
            }
            http::error_response(&err)
        }
    };

    if let Some(policy) = cors {
        policy.apply(origin.as_deref(), &mut response);
    }
    response
}

async fn dispatch<B>(parts: &Parts, body: B, state: &AppState) -> ApiResult<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let limit = state.config.http.max_body_size;
    check_body_size(&parts.headers, limit)?;

    let path = parts.uri.path();
    let Some(RouteMatch { route, params }) = state.router.find(&parts.method, path) else {
        return Ok(http::not_found(parts.method.as_str(), path));
    };

    let session = match route.guard {
        AuthGuard::None => None,
        AuthGuard::Customer => state.authenticator.authenticate(&parts.headers, Realm::Store),
        AuthGuard::Staff => Some(
            state
                .authenticator
                .authenticate(&parts.headers, Realm::Admin)
                .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?,
        ),
    };

    let body = http::read_json_body(body, is_json(&parts.headers), limit).await?;
    let ctx = RequestContext {
        params,
        query: http::parse_query(parts.uri.query()),
        body,
        session,
    };

    let reply = route.handler.call(&ctx, &state.services).await?;
    Ok(http::json_response(reply.status, &reply.body))
}

/// Reject early on a declared Content-Length above the limit
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> ApiResult<()> {
    let Some(size_str) = header_str(headers, CONTENT_LENGTH.as_str()) else {
        return Ok(());
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            Ok(())
        }
        _ => Ok(()),
    }
}

/// A body without Content-Type is parsed as JSON too
fn is_json(headers: &HeaderMap) -> bool {
    header_str(headers, CONTENT_TYPE.as_str()).map_or(true, |ct| ct.contains("json"))
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::reviews::testing::{fixture_store, CUSTOMER_A, CUSTOMER_B, REQUEST_B};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    const CUSTOMER_TOKEN: &str = "tok_customer_a";
    const ADMIN_TOKEN: &str = "tok_admin";

    async fn test_state(configure: impl FnOnce(&mut Config)) -> Arc<AppState> {
        let mut config = Config::for_tests();
        config
            .auth
            .customer_tokens
            .insert(CUSTOMER_TOKEN.to_string(), CUSTOMER_A.to_string());
        config
            .auth
            .admin_tokens
            .insert(ADMIN_TOKEN.to_string(), "usr_1".to_string());
        config.project.store_cors = "http://localhost:8000".to_string();
        config.project.admin_cors = "/^https://admin\\..+$/".to_string();
        configure(&mut config);
        Arc::new(AppState::new(config, fixture_store().await))
    }

    fn request(
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let bytes = match body {
            Some(body) => {
                builder = builder.header("Content-Type", "application/json");
                Bytes::from(body.to_string())
            }
            None => Bytes::new(),
        };
        builder.body(Full::new(bytes)).unwrap()
    }

    async fn send(
        state: &Arc<AppState>,
        req: Request<Full<Bytes>>,
    ) -> (StatusCode, HeaderMap, Value) {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let response = handle_request(req, Arc::clone(state), addr).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, headers, body)
    }

    async fn create_review(state: &Arc<AppState>, product_id: &str) -> String {
        let (status, _, body) = send(
            state,
            request(
                Method::POST,
                "/store/product-reviews",
                Some(CUSTOMER_TOKEN),
                Some(json!({ "product_id": product_id, "rating": 5, "content": "great" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["review"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_with_session() {
        let state = test_state(|_| {}).await;
        let (status, headers, body) = send(
            &state,
            request(
                Method::POST,
                "/store/product-reviews",
                Some(CUSTOMER_TOKEN),
                Some(json!({ "product_id": "p1", "rating": 5, "content": "great" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["Content-Type"], "application/json; charset=utf-8");
        let review = &body["review"];
        assert!(review["id"].is_string());
        assert_eq!(review["product_id"], "p1");
        assert_eq!(review["rating"], 5);
        assert_eq!(review["content"], "great");
        assert_eq!(review["customer_id"], CUSTOMER_A);
    }

    #[tokio::test]
    async fn test_create_without_identity() {
        let state = test_state(|_| {}).await;
        let (status, _, body) = send(
            &state,
            request(
                Method::POST,
                "/store/product-reviews",
                None,
                Some(json!({ "product_id": "p1", "rating": 5, "content": "great" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["type"], "unauthorized");

        let (_, _, body) = send(
            &state,
            request(Method::GET, "/store/product-reviews", None, None),
        )
        .await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_create_with_review_request_and_no_session() {
        let state = test_state(|_| {}).await;
        let (status, _, body) = send(
            &state,
            request(
                Method::POST,
                &format!("/store/product-reviews?review_request_id={REQUEST_B}"),
                None,
                Some(json!({ "product_id": "prod_1", "rating": 4, "content": "ok" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["review"]["customer_id"], CUSTOMER_B);
    }

    #[tokio::test]
    async fn test_invalid_body_is_rejected() {
        let state = test_state(|_| {}).await;
        for body in [
            json!({ "product_id": "p1", "rating": 0, "content": "x" }),
            json!({ "product_id": "p1", "rating": 3, "content": "x", "admin": true }),
            json!({ "rating": 3, "content": "x" }),
        ] {
            let (status, _, reply) = send(
                &state,
                request(Method::POST, "/store/product-reviews", Some(CUSTOMER_TOKEN), Some(body)),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(reply["type"], "invalid_data");
        }

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/store/product-reviews")
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from_static(b"{not json")))
            .unwrap();
        let (status, _, _) = send(&state, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_by_path_id() {
        let state = test_state(|_| {}).await;
        let id = create_review(&state, "p1").await;

        let (status, _, body) = send(
            &state,
            request(
                Method::POST,
                &format!("/store/product-reviews/{id}"),
                Some(CUSTOMER_TOKEN),
                Some(json!({ "rating": 3 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["review"]["rating"], 3);
    }

    #[tokio::test]
    async fn test_admin_requires_staff_session() {
        let state = test_state(|_| {}).await;
        let id = create_review(&state, "p1").await;
        let uri = format!("/admin/product-reviews/{id}");

        for token in [None, Some(CUSTOMER_TOKEN)] {
            let (status, _, body) = send(&state, request(Method::DELETE, &uri, token, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["type"], "unauthorized");
        }
        let (_, _, body) = send(
            &state,
            request(Method::GET, "/store/product-reviews", None, None),
        )
        .await;
        assert_eq!(body["count"], 1);

        let (status, _, body) =
            send(&state, request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (status, _, body) =
            send(&state, request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "invalid_data");
    }

    #[tokio::test]
    async fn test_admin_list() {
        let state = test_state(|_| {}).await;
        create_review(&state, "p1").await;
        create_review(&state, "p2").await;

        let (status, _, body) = send(
            &state,
            request(Method::GET, "/admin/product-reviews?product_id=p2", Some(ADMIN_TOKEN), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["reviews"][0]["product_id"], "p2");
    }

    #[tokio::test]
    async fn test_stats_route() {
        let state = test_state(|_| {}).await;
        create_review(&state, "p1").await;

        let (status, _, body) = send(
            &state,
            request(Method::GET, "/store/product-reviews/stats?product_id=p1", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"][0]["count"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = test_state(|_| {}).await;
        let (status, _, body) = send(
            &state,
            request(Method::PUT, "/store/product-reviews", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Cannot PUT /store/product-reviews");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let state = test_state(|_| {}).await;

        let allowed = Request::builder()
            .method(Method::OPTIONS)
            .uri("/store/product-reviews")
            .header("Origin", "http://localhost:8000")
            .header("Access-Control-Request-Headers", "content-type")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = send(&state, allowed).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers["Access-Control-Allow-Origin"], "http://localhost:8000");
        assert_eq!(headers["Access-Control-Allow-Credentials"], "true");

        let denied = Request::builder()
            .method(Method::OPTIONS)
            .uri("/store/product-reviews")
            .header("Origin", "http://evil.test")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = send(&state, denied).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(headers.get("Access-Control-Allow-Origin").is_none());
    }

    #[tokio::test]
    async fn test_cors_policy_by_prefix() {
        let state = test_state(|_| {}).await;

        let admin = Request::builder()
            .method(Method::GET)
            .uri("/admin/product-reviews")
            .header("Origin", "https://admin.example.com")
            .header("Authorization", format!("Bearer {ADMIN_TOKEN}"))
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (_, headers, _) = send(&state, admin).await;
        assert_eq!(headers["Access-Control-Allow-Origin"], "https://admin.example.com");

        // The store allow-list does not cover the admin origin
        let store = Request::builder()
            .method(Method::GET)
            .uri("/store/product-reviews")
            .header("Origin", "https://admin.example.com")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = send(&state, store).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.get("Access-Control-Allow-Origin").is_none());
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let state = test_state(|config| config.http.max_body_size = 16).await;
        let (status, _, body) = send(
            &state,
            request(
                Method::POST,
                "/store/product-reviews",
                Some(CUSTOMER_TOKEN),
                Some(json!({
                    "product_id": "p1",
                    "rating": 5,
                    "content": "far too long for the limit"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["type"], "payload_too_large");
    }

    #[tokio::test]
    async fn test_health_and_base_path() {
        let state = test_state(|config| config.server.base_path = "/api".to_string()).await;

        let (status, _, body) = send(&state, request(Method::GET, "/healthz", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".to_string()));

        let (status, _, _) = send(
            &state,
            request(Method::GET, "/store/product-reviews", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = send(
            &state,
            request(Method::GET, "/api/store/product-reviews", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(is_json(&headers));
        headers.insert(CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert!(is_json(&headers));
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&headers));
    }
}
