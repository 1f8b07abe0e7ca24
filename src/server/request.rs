use may_minihttp::Request;
use smallvec::SmallVec;
use std::io::Read;
use tracing::debug;

use crate::ids::{RequestId, REQUEST_ID_HEADER};

/// Query pairs before heap allocation. Most calls bind a handful of keys.
pub const MAX_INLINE_QUERY: usize = 8;

/// Headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

pub type QueryVec = SmallVec<[(String, String); MAX_INLINE_QUERY]>;
pub type HeaderVec = SmallVec<[(String, String); MAX_INLINE_HEADERS]>;

/// Transport-independent request handed to the dispatcher.
///
/// Query keys and header names keep their original spelling; lookups are
/// case-insensitive and the last occurrence of a repeated key wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub request_id: RequestId,
    pub method: String,
    /// Path without the query string, as sent
    pub path: String,
    pub query: QueryVec,
    pub headers: HeaderVec,
    /// Raw entity body; `None` when the request carried none
    pub body: Option<Vec<u8>>,
}

impl ServiceRequest {
    /// Build a request from a verb and a target such as `/add?value1=3&value2=5`.
    #[must_use]
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, QueryVec::new()),
        };
        Self {
            request_id: RequestId::new(),
            method: method.to_ascii_uppercase(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query,
            headers: HeaderVec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Distinct query keys in first-seen order.
    #[must_use]
    pub fn query_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.query.len());
        for (k, _) in &self.query {
            if !keys.iter().any(|seen| seen.eq_ignore_ascii_case(k)) {
                keys.push(k);
            }
        }
        keys
    }

    /// Value of a query key, case-insensitively. Last occurrence wins.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Header value by name (case-insensitive per RFC 7230).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rfind(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True when a non-empty entity body is present.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// `path?query` as the client sent it, for log lines.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Decode a raw query string into ordered pairs.
#[must_use]
pub fn parse_query(query: &str) -> QueryVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Convert a `may_minihttp` request into a [`ServiceRequest`].
///
/// The request id is taken from an inbound `X-Request-Id` header when it
/// holds a valid ULID, otherwise a fresh one is generated.
pub fn from_http(req: Request) -> ServiceRequest {
    let mut request = ServiceRequest::new(req.method(), req.path());
    request.headers = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    request.request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));

    let mut body = Vec::new();
    match req.body().read_to_end(&mut body) {
        Ok(size) if size > 0 => {
            debug!(body_size_bytes = size, "Request body read");
            request.body = Some(body);
        }
        Ok(_) => {}
        Err(e) => debug!(error = %e, "Request body could not be read"),
    }

    debug!(
        method = %request.method,
        path = %request.path,
        query_count = request.query.len(),
        headers_count = request.headers.len(),
        "HTTP request parsed"
    );
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_split() {
        let r = ServiceRequest::new("get", "/add?value1=3&value2=5");
        assert_eq!(r.method, "GET");
        assert_eq!(r.path, "/add");
        assert_eq!(r.query_keys(), vec!["value1", "value2"]);
        assert_eq!(r.query_value("VALUE2"), Some("5"));
    }

    #[test]
    fn test_repeated_keys_last_wins() {
        let r = ServiceRequest::new("GET", "/t?a=1&A=2&b=3");
        assert_eq!(r.query_keys(), vec!["a", "b"]);
        assert_eq!(r.query_value("a"), Some("2"));
    }

    #[test]
    fn test_percent_decoding() {
        let r = ServiceRequest::new("GET", "/say?msg=a%20b+c&x=%7B%7D");
        assert_eq!(r.path, "/say");
        assert_eq!(r.query_value("msg"), Some("a b c"));
        assert_eq!(r.query_value("x"), Some("{}"));
    }

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(ServiceRequest::new("GET", "").path, "/");
        assert_eq!(ServiceRequest::new("GET", "?a=1").path, "/");
    }

    #[test]
    fn test_headers_and_body() {
        let r = ServiceRequest::new("POST", "/save")
            .with_header("X-Api-Key", "secret")
            .with_body("{}");
        assert_eq!(r.header("x-api-key"), Some("secret"));
        assert!(r.has_body());
        assert!(!ServiceRequest::new("POST", "/save").with_body("").has_body());
    }
}
