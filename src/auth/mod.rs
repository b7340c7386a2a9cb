//! Session authentication
//!
//! Turns request headers into a [`Session`]. Identity issuing is out of scope;
//! the bundled [`TokenAuthenticator`] only maps pre-shared bearer tokens to
//! customer and staff ids.

use hyper::header::{HeaderMap, AUTHORIZATION};
use std::collections::HashMap;

use crate::config::AuthConfig;

/// Which side of the API a session is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
    Admin,
    Store,
}

/// Authenticated caller attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Customer { customer_id: String },
    User { user_id: String },
}

impl Session {
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Self::Customer { customer_id } => Some(customer_id),
            Self::User { .. } => None,
        }
    }
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap, realm: Realm) -> Option<Session>;
}

/// Static bearer tokens from the `auth` config section
#[derive(Debug, Default, Clone)]
pub struct TokenAuthenticator {
    customer_tokens: HashMap<String, String>,
    admin_tokens: HashMap<String, String>,
}

impl TokenAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            customer_tokens: config.customer_tokens.clone(),
            admin_tokens: config.admin_tokens.clone(),
        }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap, realm: Realm) -> Option<Session> {
        let token = bearer_token(headers)?;
        match realm {
            Realm::Admin => self.admin_tokens.get(token).map(|id| Session::User {
                user_id: id.clone(),
            }),
            Realm::Store => self.customer_tokens.get(token).map(|id| Session::Customer {
                customer_id: id.clone(),
            }),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
