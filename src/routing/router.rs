//! Route assembly module
//!
//! Compiles route declarations into a dispatch table. The authentication
//! guard of each route is chosen from its path prefix. A declaration that
//! fails to compile is logged and skipped; the rest of the table still loads.

use hyper::Method;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::pattern::PathPattern;
use crate::logger;

/// HTTP methods a route can be declared for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    All,
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl RouteMethod {
    /// GET routes also answer HEAD
    pub fn matches(self, method: &Method) -> bool {
        match self {
            Self::All => true,
            Self::Get => method == Method::GET || method == Method::HEAD,
            Self::Post => method == Method::POST,
            Self::Put => method == Method::PUT,
            Self::Delete => method == Method::DELETE,
            Self::Patch => method == Method::PATCH,
            Self::Options => method == Method::OPTIONS,
            Self::Head => method == Method::HEAD,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "ALL",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
        };
        f.write_str(name)
    }
}

/// One declared route
#[derive(Debug, Clone)]
pub struct RouteConfig<H> {
    pub path: &'static str,
    pub method: RouteMethod,
    pub handler: H,
    pub required_auth: bool,
}

/// Authentication step run before a route's handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGuard {
    None,
    /// Attach a customer session when one is presented; never rejects
    Customer,
    /// Reject requests without a staff session
    Staff,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid path pattern '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },
    #[error("path '{path}' is neither an /admin nor a /store route")]
    UnknownPrefix { path: String },
}

#[derive(Debug, Clone)]
pub struct CompiledRoute<H> {
    pub method: RouteMethod,
    pub pattern: PathPattern,
    pub handler: H,
    pub guard: AuthGuard,
}

/// Result of a successful lookup
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub route: &'a CompiledRoute<H>,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Router<H> {
    base_path: String,
    routes: Vec<CompiledRoute<H>>,
}

impl<H: Clone> Router<H> {
    /// Build a router mounted under `base_path`
    pub fn build(base_path: &str, routes: &[RouteConfig<H>]) -> Self {
        let base_path = base_path.trim_end_matches('/').to_string();
        let mut compiled = Vec::with_capacity(routes.len());

        for route in routes {
            match compile(route) {
                Ok(entry) => {
                    logger::log_route_registered(
                        &route.method.to_string(),
                        &format!("{base_path}{}", route.path),
                        route.required_auth,
                    );
                    compiled.push(entry);
                }
                Err(e) => logger::log_route_skipped(&route.method.to_string(), route.path, &e),
            }
        }

        Self {
            base_path,
            routes: compiled,
        }
    }
}

impl<H> Router<H> {
    /// Strip the mount point; `None` when the path is outside it
    pub fn relative_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.base_path.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some("") => Some("/"),
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    /// First route, in declaration order, matching method and path
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        let relative = self.relative_path(path)?;
        self.routes
            .iter()
            .filter(|route| route.method.matches(method))
            .find_map(|route| {
                route
                    .pattern
                    .match_path(relative)
                    .map(|params| RouteMatch { route, params })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn compile<H: Clone>(route: &RouteConfig<H>) -> Result<CompiledRoute<H>, RouteError> {
    let guard = if route.path.starts_with("/admin") {
        if route.required_auth {
            AuthGuard::Staff
        } else {
            AuthGuard::None
        }
    } else if route.path.starts_with("/store") {
        if route.required_auth {
            AuthGuard::Customer
        } else {
            AuthGuard::None
        }
    } else {
        return Err(RouteError::UnknownPrefix {
            path: route.path.to_string(),
        });
    };

    let pattern = PathPattern::parse(route.path).map_err(|reason| RouteError::InvalidPattern {
        path: route.path.to_string(),
        reason,
    })?;

    Ok(CompiledRoute {
        method: route.method,
        pattern,
        handler: route.handler.clone(),
        guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: RouteMethod, path: &'static str, handler: u8, auth: bool) -> RouteConfig<u8> {
        RouteConfig {
            path,
            method,
            handler,
            required_auth: auth,
        }
    }

    fn table() -> Vec<RouteConfig<u8>> {
        vec![
            route(RouteMethod::Get, "/store/items", 1, false),
            route(RouteMethod::Get, "/store/items/stats", 2, false),
            route(RouteMethod::Post, "/store/items", 3, true),
            route(RouteMethod::Post, "/store/items/:item_id", 4, true),
            route(RouteMethod::Get, "/admin/items", 5, true),
            route(RouteMethod::Delete, "/admin/items/:id", 6, true),
        ]
    }

    #[test]
    fn test_dispatch_by_method_and_path() {
        let router = Router::build("", &table());
        assert_eq!(router.len(), 6);

        let m = router.find(&Method::GET, "/store/items").unwrap();
        assert_eq!(m.route.handler, 1);
        assert_eq!(m.route.guard, AuthGuard::None);

        let m = router.find(&Method::GET, "/store/items/stats").unwrap();
        assert_eq!(m.route.handler, 2);

        let m = router.find(&Method::POST, "/store/items/it_1").unwrap();
        assert_eq!(m.route.handler, 4);
        assert_eq!(m.params["item_id"], "it_1");
        assert_eq!(m.route.guard, AuthGuard::Customer);

        let m = router.find(&Method::DELETE, "/admin/items/it_1").unwrap();
        assert_eq!(m.route.handler, 6);
        assert_eq!(m.route.guard, AuthGuard::Staff);

        assert!(router.find(&Method::PUT, "/store/items").is_none());
        assert!(router.find(&Method::GET, "/store/other").is_none());
    }

    #[test]
    fn test_head_served_by_get_routes() {
        let router = Router::build("", &table());
        let m = router.find(&Method::HEAD, "/admin/items").unwrap();
        assert_eq!(m.route.handler, 5);
    }

    #[test]
    fn test_broken_routes_are_skipped() {
        let mut routes = table();
        routes.push(route(RouteMethod::Get, "/store/items/:", 7, false));
        routes.push(route(RouteMethod::Get, "/internal/items", 8, false));
        routes.push(route(RouteMethod::Get, "/store/extra", 9, false));

        let router = Router::build("", &routes);
        assert_eq!(router.len(), 7);
        assert_eq!(
            router.find(&Method::GET, "/store/extra").unwrap().route.handler,
            9
        );
        assert!(router.find(&Method::GET, "/internal/items").is_none());
    }

    #[test]
    fn test_compile_errors() {
        let err = compile(&route(RouteMethod::Get, "/internal", 0, false)).unwrap_err();
        assert!(matches!(err, RouteError::UnknownPrefix { .. }));

        let err = compile(&route(RouteMethod::Get, "/store/:a/:a", 0, false)).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));

        let unguarded = compile(&route(RouteMethod::Get, "/admin/open", 0, false)).unwrap();
        assert_eq!(unguarded.guard, AuthGuard::None);
    }

    #[test]
    fn test_base_path() {
        let router = Router::build("/v1/", &table());
        assert!(router.find(&Method::GET, "/store/items").is_none());
        assert_eq!(
            router.find(&Method::GET, "/v1/store/items").unwrap().route.handler,
            1
        );
        assert_eq!(router.relative_path("/v1"), Some("/"));
        assert_eq!(router.relative_path("/v10/store"), None);
    }
}
