//! # Security Module
//!
//! Request authorization for services started with `authorize = true`.
//!
//! The dispatcher consults one [`Authorizer`] per request, before any
//! route-specific response (description, no-match, wrong verb) is produced.
//! Routes bound with `allow_unauthorized()` skip the check. A rejected
//! request receives the `Missing or invalid authorization key.` envelope.
//!
//! Built-in authorizers:
//!
//! - [`DenyAll`] - the default; rejects everything
//! - [`QueryKeyAuthorizer`] - accepts a known key in a query parameter
//! - [`HeaderKeyAuthorizer`] - accepts a known key in a request header
//!
//! Any `Fn(&ServiceRequest) -> bool` closure is an authorizer too:
//!
//! ```rust
//! use jsonservice::security::Authorizer;
//! use jsonservice::server::ServiceRequest;
//!
//! let internal_only = |req: &ServiceRequest| req.header("x-internal").is_some();
//! assert!(!internal_only.authorize(&ServiceRequest::new("GET", "/")));
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::server::ServiceRequest;

/// Decides whether a request may proceed.
pub trait Authorizer: Send + Sync {
    /// Return `true` to let the request through.
    fn authorize(&self, request: &ServiceRequest) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&ServiceRequest) -> bool + Send + Sync,
{
    fn authorize(&self, request: &ServiceRequest) -> bool {
        self(request)
    }
}

/// Rejects every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn authorize(&self, _request: &ServiceRequest) -> bool {
        false
    }
}

/// Accepts requests whose query parameter `param` holds a known key.
#[derive(Clone)]
pub struct QueryKeyAuthorizer {
    param: String,
    keys: HashSet<String>,
}

impl QueryKeyAuthorizer {
    #[must_use]
    pub fn new<I, S>(param: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            param: param.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for QueryKeyAuthorizer {
    fn authorize(&self, request: &ServiceRequest) -> bool {
        request
            .query_value(&self.param)
            .is_some_and(|k| self.keys.contains(k))
    }
}

impl fmt::Debug for QueryKeyAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryKeyAuthorizer")
            .field("param", &self.param)
            .field("keys", &self.keys.len())
            .finish()
    }
}

/// Accepts requests whose header `name` holds a known key.
#[derive(Clone)]
pub struct HeaderKeyAuthorizer {
    header: String,
    keys: HashSet<String>,
}

impl HeaderKeyAuthorizer {
    #[must_use]
    pub fn new<I, S>(header: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for HeaderKeyAuthorizer {
    fn authorize(&self, request: &ServiceRequest) -> bool {
        request
            .header(&self.header)
            .is_some_and(|k| self.keys.contains(k.trim()))
    }
}

impl fmt::Debug for HeaderKeyAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderKeyAuthorizer")
            .field("header", &self.header)
            .field("keys", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_all() {
        assert!(!DenyAll.authorize(&ServiceRequest::new("GET", "/?key=anything")));
    }

    #[test]
    fn test_query_key() {
        let auth = QueryKeyAuthorizer::new("key", ["s3cret"]);
        assert!(auth.authorize(&ServiceRequest::new("GET", "/add?KEY=s3cret")));
        assert!(!auth.authorize(&ServiceRequest::new("GET", "/add?key=wrong")));
        assert!(!auth.authorize(&ServiceRequest::new("GET", "/add")));
    }

    #[test]
    fn test_header_key() {
        let auth = HeaderKeyAuthorizer::new("X-Api-Key", vec!["k1".to_string(), "k2".to_string()]);
        let req = ServiceRequest::new("GET", "/").with_header("x-api-key", " k2 ");
        assert!(auth.authorize(&req));
        assert!(!auth.authorize(&ServiceRequest::new("GET", "/")));
    }

    #[test]
    fn test_closure_authorizer() {
        let only_post = |req: &ServiceRequest| req.method == "POST";
        assert!(only_post.authorize(&ServiceRequest::new("post", "/")));
        assert!(!only_post.authorize(&ServiceRequest::new("GET", "/")));
    }
}
