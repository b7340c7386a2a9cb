//! CORS policy module
//!
//! Origins come from comma-separated allow-lists. An entry wrapped in slashes
//! is a regular expression, `*` allows any origin, anything else must match
//! exactly. Allowed origins are reflected back with credentials enabled.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, VARY};
use hyper::{Response, StatusCode};
use regex::Regex;

use crate::config::ProjectConfig;
use crate::logger;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

#[derive(Debug, Clone)]
enum OriginMatcher {
    Any,
    Exact(String),
    Pattern(Regex),
}

impl OriginMatcher {
    fn matches(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(allowed) => allowed == origin,
            Self::Pattern(re) => re.is_match(origin),
        }
    }
}

/// Allow-list for one path prefix
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    origins: Vec<OriginMatcher>,
}

impl CorsPolicy {
    /// Parse an allow-list; invalid patterns are logged and ignored
    pub fn parse(list: &str) -> Self {
        let origins = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                if entry == "*" {
                    return Some(OriginMatcher::Any);
                }
                let pattern = entry
                    .strip_prefix('/')
                    .and_then(|rest| rest.strip_suffix('/'));
                match pattern {
                    Some(pattern) => match Regex::new(pattern) {
                        Ok(re) => Some(OriginMatcher::Pattern(re)),
                        Err(e) => {
                            logger::log_warning(&format!(
                                "Ignoring invalid CORS origin pattern '{entry}': {e}"
                            ));
                            None
                        }
                    },
                    None => Some(OriginMatcher::Exact(entry.to_string())),
                }
            })
            .collect();
        Self { origins }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.origins.iter().any(|m| m.matches(origin))
    }

    /// Add CORS headers to a response when the origin is allowed
    pub fn apply(&self, origin: Option<&str>, response: &mut Response<Full<Bytes>>) {
        let headers = response.headers_mut();
        headers.append(VARY, HeaderValue::from_static("Origin"));

        let Some(origin) = origin.filter(|o| self.allows(o)) else {
            return;
        };
        if let Ok(value) = HeaderValue::from_str(origin) {
            headers.insert("Access-Control-Allow-Origin", value);
            headers.insert(
                "Access-Control-Allow-Credentials",
                HeaderValue::from_static("true"),
            );
        }
    }

    /// Answer a preflight request
    pub fn preflight(
        &self,
        origin: Option<&str>,
        requested_headers: Option<&str>,
    ) -> Response<Full<Bytes>> {
        let mut builder = Response::builder().status(StatusCode::NO_CONTENT);
        if origin.is_some_and(|o| self.allows(o)) {
            builder = builder
                .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
                .header("Access-Control-Max-Age", "86400");
            if let Some(requested) = requested_headers {
                builder = builder
                    .header("Access-Control-Allow-Headers", requested)
                    .header(VARY, "Access-Control-Request-Headers");
            }
        }

        let mut response = builder
            .header("Content-Length", "0")
            .body(Full::new(Bytes::new()))
            .unwrap_or_else(|e| {
                logger::log_error(&format!("Failed to build preflight response: {e}"));
                Response::new(Full::new(Bytes::new()))
            });
        self.apply(origin, &mut response);
        response
    }
}

/// Policies selected by path prefix
#[derive(Debug, Clone, Default)]
pub struct CorsPolicies {
    pub admin: CorsPolicy,
    pub store: CorsPolicy,
}

impl CorsPolicies {
    pub fn from_config(project: &ProjectConfig) -> Self {
        Self {
            admin: CorsPolicy::parse(&project.admin_cors),
            store: CorsPolicy::parse(&project.store_cors),
        }
    }

    /// `path` is relative to the configured base path
    pub fn for_path(&self, path: &str) -> Option<&CorsPolicy> {
        if path.starts_with("/admin") {
            Some(&self.admin)
        } else if path.starts_with("/store") {
            Some(&self.store)
        } else {
            None
        }
    }
}
