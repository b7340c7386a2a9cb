//! Routing module
//!
//! Provides route assembly and dispatch:
//! - Express-style path patterns with `:param` captures
//! - Route tables compiled per path prefix (`/admin`, `/store`)
//! - Per-route failure isolation at build time

mod pattern;
mod router;

pub use pattern::PathPattern;
pub use router::{
    AuthGuard, CompiledRoute, RouteConfig, RouteError, RouteMatch, RouteMethod, Router,
};
