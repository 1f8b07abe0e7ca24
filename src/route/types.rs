use http::Method;
use std::fmt;
use std::sync::Arc;

use crate::dispatcher::{Invocation, Reply};
use crate::json::{self, Value};

/// Static type of an operation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Int32,
    Int64,
    Double,
    Boolean,
    /// A JSON document, either a posted entity or a query value parsed with the codec
    Document,
    /// An unbound type parameter; operations carrying one cannot be dispatched
    Generic(String),
}

impl ParamType {
    /// Lower-case type name shown to clients.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Int32 => "int32",
            ParamType::Int64 => "int64",
            ParamType::Double => "double",
            ParamType::Boolean => "boolean",
            ParamType::Document => "document",
            ParamType::Generic(name) => name,
        }
    }

    #[must_use]
    pub fn is_generic(&self) -> bool {
        matches!(self, ParamType::Generic(_))
    }

    /// Convert a raw query-string value. `None` means the text is not a valid
    /// instance of this type.
    #[must_use]
    pub fn convert(&self, raw: &str) -> Option<Value> {
        match self {
            ParamType::String => Some(Value::from(raw)),
            ParamType::Int32 => raw.trim().parse::<i32>().ok().map(Value::from),
            ParamType::Int64 => raw.trim().parse::<i64>().ok().map(Value::from),
            ParamType::Double => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::from),
            ParamType::Boolean => {
                let raw = raw.trim();
                if raw.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            ParamType::Document => json::parse(raw).ok(),
            ParamType::Generic(_) => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of an operation signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    ty: ParamType,
    default: Option<Value>,
}

impl Parameter {
    #[must_use]
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A parameter that falls back to `default` when its query key is absent.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: ParamType, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default.into()),
        }
    }

    /// A parameter whose type is an unbound generic, e.g. `T`.
    #[must_use]
    pub fn generic(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::required(name, ParamType::Generic(type_name.into()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Verb + template binding of an operation, with its describe metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteBinding {
    pub(crate) method: Method,
    pub(crate) template: String,
    pub(crate) description: String,
    pub(crate) example: String,
    pub(crate) entity: Option<String>,
    pub(crate) describe: bool,
    pub(crate) allow_unauthorized: bool,
}

impl RouteBinding {
    #[must_use]
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
            description: String::new(),
            example: String::new(),
            entity: None,
            describe: true,
            allow_unauthorized: false,
        }
    }

    #[must_use]
    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    #[must_use]
    pub fn post(template: impl Into<String>) -> Self {
        Self::new(Method::POST, template)
    }

    #[must_use]
    pub fn put(template: impl Into<String>) -> Self {
        Self::new(Method::PUT, template)
    }

    #[must_use]
    pub fn delete(template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, template)
    }

    #[must_use]
    pub fn patch(template: impl Into<String>) -> Self {
        Self::new(Method::PATCH, template)
    }

    /// Text shown for this route in the service description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Example request URI, relative to the service base URI.
    #[must_use]
    pub fn example(mut self, uri: impl Into<String>) -> Self {
        self.example = uri.into();
        self
    }

    /// Name of the parameter that receives the parsed request body.
    /// Only honoured for POST, PUT and PATCH.
    #[must_use]
    pub fn entity(mut self, parameter: impl Into<String>) -> Self {
        self.entity = Some(parameter.into());
        self
    }

    /// Include or hide this route in the service description (default: shown).
    #[must_use]
    pub fn describe(mut self, describe: bool) -> Self {
        self.describe = describe;
        self
    }

    /// Skip authorization for this route even when the service requires it.
    #[must_use]
    pub fn allow_unauthorized(mut self) -> Self {
        self.allow_unauthorized = true;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Verbs whose requests carry an entity body.
#[must_use]
pub fn carries_entity(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Callable behind an operation.
pub type Handler = Arc<dyn Fn(&Invocation<'_>) -> anyhow::Result<Reply> + Send + Sync>;

/// A host-declared operation: a name, its signature, its route binding(s)
/// and the handler that implements it.
///
/// ```rust
/// use jsonservice::dispatcher::Reply;
/// use jsonservice::route::{Operation, ParamType, Parameter, RouteBinding};
///
/// let add = Operation::new("Calculator.Add", |call| {
///     Reply::json(&(call.args().i32("a")? + call.args().i32("b")?))
/// })
/// .param(Parameter::required("a", ParamType::Int32))
/// .param(Parameter::required("b", ParamType::Int32))
/// .bind(RouteBinding::get("add?value1={a}&value2={b}").example("add?value1=3&value2=5"));
/// assert_eq!(add.name(), "Calculator.Add");
/// ```
#[derive(Clone)]
pub struct Operation {
    name: String,
    params: Vec<Parameter>,
    bindings: Vec<RouteBinding>,
    handler: Handler,
}

impl Operation {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            bindings: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Append a parameter to the signature. Order is significant.
    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    /// Attach a route binding. Only the first binding is used.
    #[must_use]
    pub fn bind(mut self, binding: RouteBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    #[must_use]
    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
