// Application state module
// Everything a request needs, built once at startup and shared behind an Arc

use std::sync::Arc;

use super::types::Config;
use crate::auth::{Authenticator, TokenAuthenticator};
use crate::http::CorsPolicies;
use crate::reviews::{review_routes, ReviewHandler};
use crate::routing::Router;
use crate::store::Services;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router<ReviewHandler>,
    pub services: Services,
    pub authenticator: Arc<dyn Authenticator>,
    pub cors: CorsPolicies,
}

impl AppState {
    /// Build state with bearer-token sessions from `auth.*`
    pub fn new(config: Config, services: Services) -> Self {
        let authenticator = Arc::new(TokenAuthenticator::new(&config.auth));
        Self::with_authenticator(config, services, authenticator)
    }

    pub fn with_authenticator(
        config: Config,
        services: Services,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let router = Router::build(&config.server.base_path, &review_routes());
        let cors = CorsPolicies::from_config(&config.project);

        Self {
            config,
            router,
            services,
            authenticator,
            cors,
        }
    }
}
