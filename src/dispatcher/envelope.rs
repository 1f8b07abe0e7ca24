//! Failure envelopes and the service description document.

use url::Url;

use super::binding::BindError;
use crate::json::{Map, Value};
use crate::route::RouteDescriptor;

pub const NO_EXPOSED_OPERATIONS: &str = "This service is not exposing any operations!";
pub const NO_MATCHING_OPERATION: &str =
    "Invalid method call. Are you missing required parameters?";
pub const WRONG_VERB: &str = "http verb specified is not allowed for this method.";
pub const UNAUTHORIZED: &str = "Missing or invalid authorization key.";
pub const INVALID_JSON_POSTED: &str = "json posted to the server was invalid.";
pub const GENERIC_UNSUPPORTED: &str = "Methods with generic parameters are not supported.";

/// `{"status":"failed","message":..}`
#[must_use]
pub fn failure(message: impl Into<String>) -> Map {
    let mut envelope = Map::with_capacity(2);
    envelope.insert("status", Value::from("failed"));
    envelope.insert("message", Value::String(message.into()));
    envelope
}

/// Parameter failures name the query key, the raw value (null when missing)
/// and the expected type.
#[must_use]
pub fn bind_failure(error: &BindError) -> Map {
    match error {
        BindError::BadJsonBody(_) => failure(INVALID_JSON_POSTED),
        BindError::MissingParameter { key, expected_type } => {
            let mut envelope = failure(error.to_string());
            envelope.insert("parameter", Value::from(key.as_str()));
            envelope.insert("value", Value::Null);
            envelope.insert("expected_type", Value::from(expected_type.as_str()));
            envelope
        }
        BindError::InvalidParameter {
            parameter,
            value,
            expected_type,
        } => {
            let mut envelope = failure(error.to_string());
            envelope.insert("parameter", Value::from(parameter.as_str()));
            envelope.insert("value", Value::from(value.as_str()));
            envelope.insert("expected_type", Value::from(expected_type.as_str()));
            envelope
        }
    }
}

/// One entry per describable route, in registry order.
///
/// Each entry carries `path`, `desc`, `parameters`, `verb` and `example`.
/// The example is resolved against `base_uri`; an empty or unresolvable
/// example is rendered as `""`.
#[must_use]
pub fn describe<'r>(routes: impl IntoIterator<Item = &'r RouteDescriptor>, base_uri: &Url) -> Value {
    let entries = routes
        .into_iter()
        .filter(|route| route.describe())
        .map(|route| Value::Object(describe_route(route, base_uri)))
        .collect();
    Value::Array(entries)
}

fn describe_route(route: &RouteDescriptor, base_uri: &Url) -> Map {
    let parameters = route
        .params()
        .iter()
        .map(|param| {
            let name = if route.is_entity(param) {
                param.name()
            } else {
                route.key_for(param).unwrap_or(param.name())
            };
            let mut entry = Map::with_capacity(4);
            entry.insert("name", Value::from(name));
            entry.insert("type", Value::from(param.ty().name()));
            entry.insert("required", Value::Bool(param.is_required()));
            entry.insert("default", param.default_value().cloned().unwrap_or(Value::Null));
            Value::Object(entry)
        })
        .collect();

    let example = Some(route.example().trim())
        .filter(|e| !e.is_empty())
        .and_then(|e| base_uri.join(e).ok())
        .map(String::from)
        .unwrap_or_default();

    let mut entry = Map::with_capacity(5);
    entry.insert("path", Value::from(route.path()));
    entry.insert("desc", Value::from(route.description()));
    entry.insert("parameters", Value::Array(parameters));
    entry.insert("verb", Value::from(route.method().as_str()));
    entry.insert("example", Value::String(example));
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Reply;
    use crate::json::to_string;
    use crate::route::{Operation, ParamType, Parameter, RouteBinding};

    fn descriptor(op: &Operation) -> RouteDescriptor {
        RouteDescriptor::compile(op, &op.bindings()[0]).unwrap()
    }

    #[test]
    fn test_failure_shape() {
        assert_eq!(
            to_string(&Value::Object(failure(UNAUTHORIZED))),
            r#"{"status": "failed","message": "Missing or invalid authorization key."}"#
        );
    }

    #[test]
    fn test_invalid_parameter_envelope() {
        let err = BindError::InvalidParameter {
            parameter: "value1".into(),
            value: "abc".into(),
            expected_type: "int32".into(),
        };
        let envelope = Value::Object(bind_failure(&err));
        assert_eq!(envelope.get("message"), Some(&Value::from("Cannot convert value 'abc' to int32")));
        assert_eq!(envelope.get("parameter"), Some(&Value::from("value1")));
        assert_eq!(envelope.get("value"), Some(&Value::from("abc")));
        assert_eq!(envelope.get("expected_type"), Some(&Value::from("int32")));
    }

    #[test]
    fn test_bad_json_envelope_hides_parser_detail() {
        let envelope = Value::Object(bind_failure(&BindError::BadJsonBody("expected ':'".into())));
        assert_eq!(envelope.get("message"), Some(&Value::from(INVALID_JSON_POSTED)));
        assert_eq!(envelope.get("parameter"), None);
    }

    #[test]
    fn test_describe_entries() {
        let add = Operation::new("Add", |_| Ok(Reply::value(Value::Null)))
            .param(Parameter::required("a", ParamType::Int32))
            .param(Parameter::optional("b", ParamType::Int32, 7))
            .bind(
                RouteBinding::get("add?value1={a}&value2={b}")
                    .description("Adds two numbers")
                    .example("add?value1=3&value2=5"),
            );
        let save = Operation::new("Save", |_| Ok(Reply::value(Value::Null)))
            .param(Parameter::required("document", ParamType::Document))
            .bind(RouteBinding::post("save").entity("document"));
        let hidden = Operation::new("Hidden", |_| Ok(Reply::value(Value::Null)))
            .bind(RouteBinding::get("hidden").describe(false));

        let routes = [descriptor(&add), descriptor(&save), descriptor(&hidden)];
        let base = Url::parse("http://localhost:5678/").unwrap();
        let doc = describe(&routes, &base);
        let entries = doc.as_array().unwrap();
        assert_eq!(entries.len(), 2);

        let add = entries[0].view();
        assert_eq!(add.at("path").unwrap().as_str().unwrap(), "/add");
        assert_eq!(add.at("desc").unwrap().as_str().unwrap(), "Adds two numbers");
        assert_eq!(add.at("verb").unwrap().as_str().unwrap(), "GET");
        assert_eq!(
            add.at("example").unwrap().as_str().unwrap(),
            "http://localhost:5678/add?value1=3&value2=5"
        );
        assert_eq!(add.at("parameters[0].name").unwrap().as_str().unwrap(), "value1");
        assert_eq!(add.at("parameters[0].type").unwrap().as_str().unwrap(), "int32");
        assert!(add.at("parameters[0].required").unwrap().as_bool().unwrap());
        assert!(add.at("parameters[0].default").unwrap().is_null());
        assert!(!add.at("parameters[1].required").unwrap().as_bool().unwrap());
        assert_eq!(add.at("parameters[1].default").unwrap().as_i64().unwrap(), 7);

        let save = entries[1].view();
        assert_eq!(save.at("example").unwrap().as_str().unwrap(), "");
        assert_eq!(save.at("parameters[0].name").unwrap().as_str().unwrap(), "document");
        assert_eq!(save.at("parameters[0].type").unwrap().as_str().unwrap(), "document");
    }
}
