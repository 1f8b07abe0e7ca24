use may_minihttp::Response;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Mutex;

/// Content type of every codec-rendered body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport-independent response produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    /// Extra headers appended after `Content-Type`
    pub headers: Vec<(String, String)>,
}

impl ServiceResponse {
    /// A JSON body with the given status.
    #[must_use]
    pub fn json(status: u16, text: String) -> Self {
        Self {
            status,
            content_type: JSON_CONTENT_TYPE.to_string(),
            body: text.into_bytes(),
            headers: Vec::new(),
        }
    }

    /// Body as UTF-8 text (lossy), mostly for tests and logging.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// `may_minihttp` only accepts `'static` header lines. Lines are interned so
/// each distinct header is leaked once, not once per response.
static HEADER_LINES: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(Default::default);

fn intern_header(line: String) -> &'static str {
    let mut lines = match HEADER_LINES.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(&existing) = lines.get(line.as_str()) {
        return existing;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(leaked);
    leaked
}

/// Copy a [`ServiceResponse`] onto the wire response.
pub fn write_response(res: &mut Response, response: ServiceResponse) {
    res.status_code(usize::from(response.status), status_reason(response.status));
    if response.content_type == JSON_CONTENT_TYPE {
        res.header("Content-Type: application/json");
    } else {
        res.header(intern_header(format!("Content-Type: {}", response.content_type)));
    }
    for (name, value) in &response.headers {
        res.header(intern_header(format!("{name}: {value}")));
    }
    res.body_vec(response.body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(501), "Not Implemented");
        assert_eq!(status_reason(299), "Unknown");
    }

    #[test]
    fn test_header_lines_are_interned() {
        let a = intern_header("X-Test: 1".to_string());
        let b = intern_header("X-Test: 1".to_string());
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_json_response() {
        let r = ServiceResponse::json(200, "{}".to_string());
        assert_eq!(r.content_type, "application/json");
        assert_eq!(r.text(), "{}");
        assert_eq!(r.header("x-anything"), None);
    }
}
