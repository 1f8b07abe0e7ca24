use serde::de::DeserializeOwned;
use std::fmt;

use crate::json::{self, Value};
use crate::route::RouteDescriptor;
use crate::server::ServiceRequest;

/// A request whose query or body cannot be bound to the operation signature.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// The entity body is not valid JSON (or not UTF-8)
    BadJsonBody(String),
    /// A required parameter has no query value
    MissingParameter { key: String, expected_type: String },
    /// A query value cannot be converted to the parameter's type
    InvalidParameter {
        parameter: String,
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::BadJsonBody(reason) => write!(f, "invalid json body: {reason}"),
            BindError::MissingParameter { key, .. } => write!(f, "{key} is required."),
            BindError::InvalidParameter {
                value,
                expected_type,
                ..
            } => write!(f, "Cannot convert value '{value}' to {expected_type}"),
        }
    }
}

impl std::error::Error for BindError {}

/// A handler asked for an argument it cannot have.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgError {
    /// No parameter of that name was bound
    Missing(String),
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The bound document does not deserialize into the requested type
    Entity { name: String, reason: String },
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgError::Missing(name) => write!(f, "argument '{name}' is not bound"),
            ArgError::WrongType {
                name,
                expected,
                found,
            } => write!(f, "argument '{name}' is {found}, expected {expected}"),
            ArgError::Entity { name, reason } => {
                write!(f, "argument '{name}' cannot be read: {reason}")
            }
        }
    }
}

impl std::error::Error for ArgError {}

/// Bound arguments of one invocation, in declared parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<(String, Value)>,
}

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument. Used by the binder and by tests that call
    /// handlers directly.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.push((name.into(), value.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    fn require(&self, name: &str) -> Result<&Value, ArgError> {
        self.get(name)
            .ok_or_else(|| ArgError::Missing(name.to_string()))
    }

    fn wrong_type(name: &str, expected: &'static str, value: &Value) -> ArgError {
        ArgError::WrongType {
            name: name.to_string(),
            expected,
            found: value.kind(),
        }
    }

    /// # Errors
    ///
    /// [`ArgError`] when the argument is unbound or not a string.
    pub fn str(&self, name: &str) -> Result<&str, ArgError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| Self::wrong_type(name, "string", value))
    }

    /// # Errors
    ///
    /// [`ArgError`] when the argument is unbound, not a number, or not an
    /// integer in `i32` range.
    pub fn i32(&self, name: &str) -> Result<i32, ArgError> {
        let n = self.i64(name)?;
        i32::try_from(n).map_err(|_| ArgError::WrongType {
            name: name.to_string(),
            expected: "int32",
            found: "int64",
        })
    }

    /// # Errors
    ///
    /// [`ArgError`] when the argument is unbound or not an integral number.
    pub fn i64(&self, name: &str) -> Result<i64, ArgError> {
        let value = self.require(name)?;
        value
            .view()
            .as_i64()
            .map_err(|_| Self::wrong_type(name, "int64", value))
    }

    /// # Errors
    ///
    /// [`ArgError`] when the argument is unbound or not a number.
    pub fn f64(&self, name: &str) -> Result<f64, ArgError> {
        let value = self.require(name)?;
        value
            .as_f64()
            .ok_or_else(|| Self::wrong_type(name, "double", value))
    }

    /// # Errors
    ///
    /// [`ArgError`] when the argument is unbound or not a boolean.
    pub fn bool(&self, name: &str) -> Result<bool, ArgError> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| Self::wrong_type(name, "boolean", value))
    }

    /// Any bound value, including `null` for an absent entity body.
    ///
    /// # Errors
    ///
    /// [`ArgError::Missing`] when the argument is unbound.
    pub fn document(&self, name: &str) -> Result<&Value, ArgError> {
        self.require(name)
    }

    /// Deserialize a bound document into a host type.
    ///
    /// # Errors
    ///
    /// [`ArgError::Entity`] when the document does not fit `T`.
    pub fn entity_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgError> {
        let value = self.require(name)?;
        serde_json::from_value(serde_json::Value::from(value.clone())).map_err(|e| {
            ArgError::Entity {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// `k=v` pairs for the invocation log line.
impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Value::String(s) => write!(f, "{name}={s}")?,
                other => write!(f, "{name}={other}")?,
            }
        }
        Ok(())
    }
}

/// Bind a request to the parameters of `route`, in declared order.
///
/// The entity parameter takes the parsed body (`null` when there is none).
/// Every other parameter takes the value of its query key. An absent key
/// falls back to the parameter default, and fails with
/// [`BindError::MissingParameter`] when there is none. A key present with an
/// empty value is converted like any other raw value.
///
/// # Errors
///
/// The first [`BindError`] encountered.
pub fn bind(route: &RouteDescriptor, request: &ServiceRequest) -> Result<Args, BindError> {
    let mut args = Args::new();
    for param in route.params() {
        if route.is_entity(param) {
            let value = if request.has_body() {
                let bytes = request.body.as_deref().unwrap_or_default();
                let text =
                    std::str::from_utf8(bytes).map_err(|e| BindError::BadJsonBody(e.to_string()))?;
                json::parse(text).map_err(|e| BindError::BadJsonBody(e.to_string()))?
            } else {
                Value::Null
            };
            args.push(param.name(), value);
            continue;
        }

        let key = route.key_for(param);
        let raw = key.and_then(|k| request.query_value(k));
        let value = match (raw, param.default_value()) {
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(BindError::MissingParameter {
                    key: key.unwrap_or(param.name()).to_string(),
                    expected_type: param.ty().name().to_string(),
                })
            }
            (Some(raw), _) => {
                param
                    .ty()
                    .convert(raw)
                    .ok_or_else(|| BindError::InvalidParameter {
                        parameter: key.unwrap_or(param.name()).to_string(),
                        value: raw.to_string(),
                        expected_type: param.ty().name().to_string(),
                    })?
            }
        };
        args.push(param.name(), value);
    }
    Ok(args)
}
