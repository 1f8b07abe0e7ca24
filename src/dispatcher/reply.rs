use serde::Serialize;

use crate::json::{self, Serializer, Value};
use crate::server::{ServiceResponse, JSON_CONTENT_TYPE};

/// Payload of a [`Reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// Rendered through the service's serializer
    Json(Value),
    /// Raw bytes written as-is with their own content type
    Resource { bytes: Vec<u8>, content_type: String },
}

/// What a handler returns.
///
/// A reply is rendered with HTTP 200 unless the handler opts into an
/// explicit status with [`Reply::with_status`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: Option<u16>,
    body: ReplyBody,
}

impl Reply {
    /// Reflect any serializable value into a JSON reply.
    ///
    /// # Errors
    ///
    /// Returns an error if `value`'s `Serialize` impl fails, e.g. a map with
    /// non-string keys.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<Self> {
        Ok(Self::value(json::to_value(value)?))
    }

    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            status: None,
            body: ReplyBody::Json(value.into()),
        }
    }

    /// A non-JSON resource, e.g. an image or a text file.
    #[must_use]
    pub fn resource(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            status: None,
            body: ReplyBody::Resource {
                bytes: bytes.into(),
                content_type: content_type.into(),
            },
        }
    }

    /// Use `status` as the HTTP status code instead of 200.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    #[must_use]
    pub fn body(&self) -> &ReplyBody {
        &self.body
    }

    pub(crate) fn into_response(self, serializer: &Serializer) -> ServiceResponse {
        let status = self.status();
        match self.body {
            ReplyBody::Json(value) => ServiceResponse::json(status, serializer.to_string(&value)),
            ReplyBody::Resource {
                bytes,
                content_type,
            } => ServiceResponse {
                status,
                content_type,
                body: bytes,
                headers: Vec::new(),
            },
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::Format;

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: i32,
    }

    #[test]
    fn test_json_reply_keeps_field_order() {
        let reply = Reply::json(&Person {
            name: "Mike".into(),
            age: 40,
        })
        .unwrap();
        assert_eq!(reply.status(), 200);
        let response = reply.into_response(&Serializer::default());
        assert_eq!(response.text(), r#"{"name": "Mike","age": 40}"#);
        assert_eq!(response.content_type, JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_explicit_status() {
        let response = Reply::value("not yet")
            .with_status(501)
            .into_response(&Serializer::new(Format::Spaces, 2));
        assert_eq!(response.status, 501);
        assert_eq!(response.text(), r#""not yet""#);
    }

    #[test]
    fn test_resource_bypasses_codec() {
        let response = Reply::resource(b"a,b\n1,2\n".to_vec(), "text/csv")
            .into_response(&Serializer::default());
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/csv");
        assert_eq!(response.body, b"a,b\n1,2\n");
    }
}
