use std::sync::Arc;
use tracing::{debug, info};

use crate::registry::Registry;
use crate::route::RouteDescriptor;

/// Result of route selection for one request.
#[derive(Debug, Clone, Copy)]
pub enum RouteOutcome<'r> {
    /// The most specific descriptor whose required query keys are all present
    Matched(&'r RouteDescriptor),
    /// Some route has this path, but none is bound to this verb
    WrongVerb,
    /// No route has this path, or none with this verb has its keys satisfied
    NoMatch,
}

impl<'r> RouteOutcome<'r> {
    #[must_use]
    pub fn matched(&self) -> Option<&'r RouteDescriptor> {
        match self {
            RouteOutcome::Matched(route) => Some(route),
            _ => None,
        }
    }
}

/// Selects routes from a shared, read-only [`Registry`].
///
/// Selection never takes a lock, so any number of requests can route
/// concurrently.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<Registry>,
}

impl Router {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        info!(routes_count = registry.len(), "Routing table loaded");
        registry.dump_routes();
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Pick the route for a request.
    ///
    /// A descriptor is a candidate when its path equals `path`, its verb
    /// equals `method` (both case-insensitively) and every required query key
    /// appears in `query_keys` (also case-insensitively). Among candidates the
    /// one with the most placeholders wins; ties go to registry order.
    ///
    /// # Arguments
    ///
    /// * `method` - Request verb, e.g. `GET`
    /// * `path` - Request path without the query string
    /// * `query_keys` - Keys present in the request's query string
    #[must_use]
    pub fn select<'r, K: AsRef<str>>(
        &'r self,
        method: &str,
        path: &str,
        query_keys: &[K],
    ) -> RouteOutcome<'r> {
        let mut best: Option<&'r RouteDescriptor> = None;
        let mut path_seen = false;
        let mut verb_seen = false;

        for route in self.registry.routes() {
            if !route.path().eq_ignore_ascii_case(path) {
                continue;
            }
            path_seen = true;
            if !route.method().as_str().eq_ignore_ascii_case(method) {
                continue;
            }
            verb_seen = true;
            let satisfied = route
                .required_keys()
                .all(|key| query_keys.iter().any(|k| k.as_ref().eq_ignore_ascii_case(key)));
            if !satisfied {
                continue;
            }
            // Strictly greater keeps the first of equally specific routes.
            if best.map_or(true, |b| route.placeholder_count() > b.placeholder_count()) {
                best = Some(route);
            }
        }

        match best {
            Some(route) => {
                debug!(
                    method = %method,
                    path = %path,
                    operation = %route.operation(),
                    placeholders = route.placeholder_count(),
                    "Route matched"
                );
                RouteOutcome::Matched(route)
            }
            None if path_seen && !verb_seen => {
                debug!(method = %method, path = %path, "Path matched with a different verb");
                RouteOutcome::WrongVerb
            }
            None => {
                debug!(method = %method, path = %path, "No route matched");
                RouteOutcome::NoMatch
            }
        }
    }
}
