use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// One `key={placeholder}` occurrence in a URI template.
static BINDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?<key>[^?&=]+)=\{(?<placeholder>[^&]*)\}")
        .expect("binding regex should be valid")
});

/// A placeholder and the query-string key it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    pub placeholder: String,
    pub key: String,
}

/// Why a template could not be decomposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The same `{placeholder}` is bound to two query keys
    DuplicatePlaceholder(String),
    /// The same query key appears twice
    DuplicateKey(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::DuplicatePlaceholder(p) => {
                write!(f, "placeholder '{{{p}}}' is bound more than once")
            }
            TemplateError::DuplicateKey(k) => write!(f, "query key '{k}' appears more than once"),
        }
    }
}

impl std::error::Error for TemplateError {}

/// A URI template split into its literal path and ordered query bindings.
///
/// `add?value1={a}&value2={b}` becomes path `/add` with bindings
/// `a <- value1`, `b <- value2`. A leading slash is optional in the template
/// and always present in [`path`](Self::path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    path: String,
    bindings: Vec<QueryBinding>,
}

impl UriTemplate {
    /// Decompose a raw template.
    ///
    /// # Errors
    ///
    /// Placeholders and query keys must each be unique (case-insensitively).
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let head = BINDING_RE.split(raw).next().unwrap_or_default();
        let head = head.trim_end_matches('?');
        let path = if head.starts_with('/') {
            head.to_string()
        } else {
            format!("/{head}")
        };

        let mut bindings: Vec<QueryBinding> = Vec::new();
        for caps in BINDING_RE.captures_iter(raw) {
            let key = caps.name("key").map_or("", |m| m.as_str()).to_string();
            let placeholder = caps
                .name("placeholder")
                .map_or("", |m| m.as_str())
                .to_string();
            if bindings
                .iter()
                .any(|b| b.placeholder.eq_ignore_ascii_case(&placeholder))
            {
                return Err(TemplateError::DuplicatePlaceholder(placeholder));
            }
            if bindings.iter().any(|b| b.key.eq_ignore_ascii_case(&key)) {
                return Err(TemplateError::DuplicateKey(key));
            }
            bindings.push(QueryBinding { placeholder, key });
        }

        Ok(Self {
            raw: raw.to_string(),
            path,
            bindings,
        })
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn bindings(&self) -> &[QueryBinding] {
        &self.bindings
    }

    /// Query key bound to a placeholder (parameter) name, case-insensitively.
    #[must_use]
    pub fn key_for(&self, placeholder: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.placeholder.eq_ignore_ascii_case(placeholder))
            .map(|b| b.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_bindings() {
        let t = UriTemplate::parse("add?value1={a}&value2={b}").unwrap();
        assert_eq!(t.path(), "/add");
        assert_eq!(
            t.bindings(),
            &[
                QueryBinding {
                    placeholder: "a".into(),
                    key: "value1".into()
                },
                QueryBinding {
                    placeholder: "b".into(),
                    key: "value2".into()
                },
            ]
        );
        assert_eq!(t.key_for("B"), Some("value2"));
        assert_eq!(t.key_for("c"), None);
    }

    #[test]
    fn test_leading_slash_is_insignificant() {
        let a = UriTemplate::parse("/test?value={x}").unwrap();
        let b = UriTemplate::parse("test?value={x}").unwrap();
        assert_eq!(a.path(), b.path());
    }

    #[test]
    fn test_plain_paths() {
        assert_eq!(UriTemplate::parse("").unwrap().path(), "/");
        assert_eq!(UriTemplate::parse("/").unwrap().path(), "/");
        let t = UriTemplate::parse("save").unwrap();
        assert_eq!(t.path(), "/save");
        assert!(t.bindings().is_empty());
        assert_eq!(UriTemplate::parse("/nested/path?").unwrap().path(), "/nested/path");
    }

    #[test]
    fn test_duplicates_rejected() {
        assert_eq!(
            UriTemplate::parse("op?a={x}&b={X}"),
            Err(TemplateError::DuplicatePlaceholder("X".into()))
        );
        assert_eq!(
            UriTemplate::parse("op?a={x}&A={y}"),
            Err(TemplateError::DuplicateKey("A".into()))
        );
    }
}
