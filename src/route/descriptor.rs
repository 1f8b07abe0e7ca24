use http::Method;
use std::fmt;

use super::template::{QueryBinding, UriTemplate};
use super::types::{carries_entity, Handler, Operation, Parameter, RouteBinding};

/// Compiled, immutable form of one operation's route.
///
/// Holds its own copy of the operation signature so the registry never has
/// to reach back into host state at request time.
#[derive(Clone)]
pub struct RouteDescriptor {
    operation: String,
    method: Method,
    template: UriTemplate,
    params: Vec<Parameter>,
    entity: Option<String>,
    description: String,
    example: String,
    describe: bool,
    allow_unauthorized: bool,
    handler: Handler,
}

impl RouteDescriptor {
    /// Compile `binding` for `operation`.
    ///
    /// An entity name on a verb that carries no body is dropped; the caller
    /// is expected to have logged it.
    ///
    /// # Errors
    ///
    /// Returns the template error when the template cannot be decomposed.
    pub fn compile(
        operation: &Operation,
        binding: &RouteBinding,
    ) -> Result<Self, super::TemplateError> {
        let template = UriTemplate::parse(&binding.template)?;
        let entity = if carries_entity(&binding.method) {
            binding.entity.clone()
        } else {
            None
        };
        Ok(Self {
            operation: operation.name().to_string(),
            method: binding.method.clone(),
            template,
            params: operation.params().to_vec(),
            entity,
            description: binding.description.clone(),
            example: binding.example.clone(),
            describe: binding.describe,
            allow_unauthorized: binding.allow_unauthorized,
            handler: std::sync::Arc::clone(operation.handler()),
        })
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.template.path()
    }

    #[must_use]
    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    #[must_use]
    pub fn bindings(&self) -> &[QueryBinding] {
        self.template.bindings()
    }

    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// True when `param` is the designated body-receiving parameter.
    #[must_use]
    pub fn is_entity(&self, param: &Parameter) -> bool {
        self.entity.as_deref() == Some(param.name())
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn example(&self) -> &str {
        &self.example
    }

    #[must_use]
    pub fn describe(&self) -> bool {
        self.describe
    }

    #[must_use]
    pub fn allow_unauthorized(&self) -> bool {
        self.allow_unauthorized
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Number of `key={placeholder}` bindings; the specificity of the route.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.template.bindings().len()
    }

    /// True when some parameter has an unbound generic type.
    #[must_use]
    pub fn has_generic_params(&self) -> bool {
        self.params.iter().any(|p| p.ty().is_generic())
    }

    /// Parameter a placeholder refers to, case-insensitively.
    #[must_use]
    pub fn param_for(&self, placeholder: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(placeholder))
    }

    /// Placeholders that name no parameter of the signature.
    #[must_use]
    pub fn invalid_placeholders(&self) -> Vec<&str> {
        self.template
            .bindings()
            .iter()
            .filter(|b| self.param_for(&b.placeholder).is_none())
            .map(|b| b.placeholder.as_str())
            .collect()
    }

    /// Query keys that must be present for this route to match: those bound
    /// to a parameter with no default.
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.template
            .bindings()
            .iter()
            .filter(|b| self.param_for(&b.placeholder).is_some_and(Parameter::is_required))
            .map(|b| b.key.as_str())
    }

    /// Query key a parameter is read from, if the template binds it.
    #[must_use]
    pub fn key_for(&self, param: &Parameter) -> Option<&str> {
        self.template.key_for(param.name())
    }

    /// Identity used for collision detection: lower-cased path, upper-cased
    /// verb and the sorted, lower-cased set of query keys.
    #[must_use]
    pub fn collision_key(&self) -> (String, String, Vec<String>) {
        let mut keys: Vec<String> = self
            .template
            .bindings()
            .iter()
            .map(|b| b.key.to_lowercase())
            .collect();
        keys.sort();
        (
            self.path().to_lowercase(),
            self.method.as_str().to_uppercase(),
            keys,
        )
    }
}

/// `GET /add?value1={a}&value2={b} -> Calculator.Add`
impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())?;
        for (i, b) in self.template.bindings().iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={{{}}}", b.key, b.placeholder)?;
        }
        write!(f, " -> {}", self.operation)
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("operation", &self.operation)
            .field("method", &self.method)
            .field("template", &self.template)
            .field("entity", &self.entity)
            .field("describe", &self.describe)
            .field("allow_unauthorized", &self.allow_unauthorized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Reply;
    use crate::json::Value;
    use crate::route::ParamType;

    fn op(binding: RouteBinding) -> Operation {
        Operation::new("Svc.Op", |_| Ok(Reply::value(Value::Null)))
            .param(Parameter::required("a", ParamType::Int32))
            .param(Parameter::optional("b", ParamType::Int32, 7))
            .param(Parameter::required("doc", ParamType::Document))
            .bind(binding)
    }

    #[test]
    fn test_required_keys_skip_defaulted_params() {
        let o = op(RouteBinding::get("op?x={A}&y={b}"));
        let d = RouteDescriptor::compile(&o, &o.bindings()[0]).unwrap();
        assert_eq!(d.required_keys().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(d.placeholder_count(), 2);
        assert!(d.invalid_placeholders().is_empty());
    }

    #[test]
    fn test_invalid_placeholders() {
        let o = op(RouteBinding::get("op?x={a}&y={zzz}"));
        let d = RouteDescriptor::compile(&o, &o.bindings()[0]).unwrap();
        assert_eq!(d.invalid_placeholders(), vec!["zzz"]);
    }

    #[test]
    fn test_entity_only_on_entity_verbs() {
        let o = op(RouteBinding::delete("op?x={a}").entity("doc"));
        let d = RouteDescriptor::compile(&o, &o.bindings()[0]).unwrap();
        assert_eq!(d.entity(), None);

        let o = op(RouteBinding::put("op?x={a}").entity("doc"));
        let d = RouteDescriptor::compile(&o, &o.bindings()[0]).unwrap();
        assert_eq!(d.entity(), Some("doc"));
        assert!(d.is_entity(&o.params()[2]));
    }

    #[test]
    fn test_collision_key_normalizes() {
        let a = op(RouteBinding::get("/OP?Y={b}&x={a}"));
        let b = op(RouteBinding::new(http::Method::GET, "op?x={A}&y={B}"));
        let da = RouteDescriptor::compile(&a, &a.bindings()[0]).unwrap();
        let db = RouteDescriptor::compile(&b, &b.bindings()[0]).unwrap();
        assert_eq!(da.collision_key(), db.collision_key());
    }

    #[test]
    fn test_display_route_line() {
        let o = op(RouteBinding::get("op?x={a}&y={b}"));
        let d = RouteDescriptor::compile(&o, &o.bindings()[0]).unwrap();
        assert_eq!(d.to_string(), "GET /op?x={a}&y={b} -> Svc.Op");
    }
}
