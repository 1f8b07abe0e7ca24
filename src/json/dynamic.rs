//! Typed, read-only navigation over a parsed document.
//!
//! Every accessor fails explicitly on a shape mismatch instead of quietly
//! yielding `null`:
//!
//! ```rust
//! use jsonservice::json;
//!
//! let doc = json::parse(r#"{"name":"Mike","kids":["Ann","Bo"]}"#).unwrap();
//! let view = doc.view();
//! assert_eq!(view.get("name").unwrap().as_str().unwrap(), "Mike");
//! assert_eq!(view.at("kids[1]").unwrap().as_str().unwrap(), "Bo");
//! assert!(view.get("kids").unwrap().as_str().is_err());
//! ```

use std::fmt;

use super::value::{Map, Value};

/// Failure to navigate or extract from a [`DynamicView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Member access on something that is not an object
    NotAnObject { found: &'static str },
    /// Indexing or enumeration on something that is not an array
    NotAnArray { found: &'static str },
    /// The object has no member with this name
    MissingMember { name: String },
    IndexOutOfBounds { index: usize, len: usize },
    /// Typed extraction found a different variant
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A path expression passed to [`DynamicView::at`] is malformed
    InvalidPath { path: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::NotAnObject { found } => {
                write!(f, "member access requires an object, found {found}")
            }
            AccessError::NotAnArray { found } => {
                write!(f, "indexing requires an array, found {found}")
            }
            AccessError::MissingMember { name } => write!(f, "no member named '{name}'"),
            AccessError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for array of length {len}")
            }
            AccessError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            AccessError::InvalidPath { path } => write!(f, "invalid path expression '{path}'"),
        }
    }
}

impl std::error::Error for AccessError {}

/// Borrowed view over a [`Value`] tree. Never mutates the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicView<'a> {
    value: &'a Value,
}

impl<'a> DynamicView<'a> {
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The underlying value.
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn object(&self) -> Result<&'a Map, AccessError> {
        self.value.as_object().ok_or(AccessError::NotAnObject {
            found: self.value.kind(),
        })
    }

    fn array(&self) -> Result<&'a [Value], AccessError> {
        self.value.as_array().ok_or(AccessError::NotAnArray {
            found: self.value.kind(),
        })
    }

    /// Member access by name. Valid only on objects.
    ///
    /// # Errors
    ///
    /// `NotAnObject` or `MissingMember`.
    pub fn get(&self, name: &str) -> Result<DynamicView<'a>, AccessError> {
        self.object()?
            .get(name)
            .map(DynamicView::new)
            .ok_or_else(|| AccessError::MissingMember {
                name: name.to_string(),
            })
    }

    /// Member access that treats an absent member as `None`.
    ///
    /// # Errors
    ///
    /// `NotAnObject` when this view is not an object.
    pub fn try_get(&self, name: &str) -> Result<Option<DynamicView<'a>>, AccessError> {
        Ok(self.object()?.get(name).map(DynamicView::new))
    }

    /// Integer indexing. Valid only on arrays.
    ///
    /// # Errors
    ///
    /// `NotAnArray` or `IndexOutOfBounds`.
    pub fn index(&self, index: usize) -> Result<DynamicView<'a>, AccessError> {
        let items = self.array()?;
        items
            .get(index)
            .map(DynamicView::new)
            .ok_or(AccessError::IndexOutOfBounds {
                index,
                len: items.len(),
            })
    }

    /// Enumerate array elements. Valid only on arrays.
    ///
    /// # Errors
    ///
    /// `NotAnArray`.
    pub fn iter(&self) -> Result<impl Iterator<Item = DynamicView<'a>>, AccessError> {
        Ok(self.array()?.iter().map(DynamicView::new))
    }

    /// Number of elements (arrays) or members (objects).
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for scalars.
    pub fn len(&self) -> Result<usize, AccessError> {
        match self.value {
            Value::Array(items) => Ok(items.len()),
            Value::Object(map) => Ok(map.len()),
            other => Err(AccessError::TypeMismatch {
                expected: "array or object",
                found: other.kind(),
            }),
        }
    }

    /// Navigate a dotted path with optional indices, e.g. `wife.name` or `D[2]`.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for malformed expressions, otherwise whatever the
    /// individual `get`/`index` step reports.
    pub fn at(&self, path: &str) -> Result<DynamicView<'a>, AccessError> {
        let invalid = || AccessError::InvalidPath {
            path: path.to_string(),
        };
        let mut current = *self;
        for segment in path.split('.') {
            let (name, mut rest) = match segment.find('[') {
                Some(pos) => (&segment[..pos], &segment[pos..]),
                None => (segment, ""),
            };
            if name.is_empty() && rest.is_empty() {
                return Err(invalid());
            }
            if !name.is_empty() {
                current = current.get(name)?;
            }
            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(invalid)?;
                if !rest.starts_with('[') {
                    return Err(invalid());
                }
                let index: usize = rest[1..close].trim().parse().map_err(|_| invalid())?;
                current = current.index(index)?;
                rest = &rest[close + 1..];
            }
        }
        Ok(current)
    }

    /// # Errors
    ///
    /// `TypeMismatch` unless the value is a string.
    pub fn as_str(&self) -> Result<&'a str, AccessError> {
        self.value.as_str().ok_or(self.mismatch("string"))
    }

    /// # Errors
    ///
    /// `TypeMismatch` unless the value is a number.
    pub fn as_f64(&self) -> Result<f64, AccessError> {
        self.value.as_f64().ok_or(self.mismatch("number"))
    }

    /// Numbers with no fractional part that fit in `i64`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` unless the value is an integral number.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_i64(&self) -> Result<i64, AccessError> {
        let n = self.as_f64()?;
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            Ok(n as i64)
        } else {
            Err(AccessError::TypeMismatch {
                expected: "integer",
                found: "number",
            })
        }
    }

    /// # Errors
    ///
    /// `TypeMismatch` unless the value is a boolean.
    pub fn as_bool(&self) -> Result<bool, AccessError> {
        self.value.as_bool().ok_or(self.mismatch("boolean"))
    }

    /// # Errors
    ///
    /// `TypeMismatch` unless the value is an array.
    pub fn as_array(&self) -> Result<&'a [Value], AccessError> {
        self.value.as_array().ok_or(self.mismatch("array"))
    }

    fn mismatch(&self, expected: &'static str) -> AccessError {
        AccessError::TypeMismatch {
            expected,
            found: self.value.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    fn doc() -> Value {
        parse(r#"{"A":"Testing","C":1980,"D":["I","II","III"],"E":{"B":null,"F":true}}"#).unwrap()
    }

    #[test]
    fn test_member_and_index_access() {
        let doc = doc();
        let view = doc.view();
        assert_eq!(view.get("A").unwrap().as_str().unwrap(), "Testing");
        assert_eq!(view.get("C").unwrap().as_i64().unwrap(), 1980);
        assert_eq!(view.get("D").unwrap().index(2).unwrap().as_str().unwrap(), "III");
        assert!(view.get("E").unwrap().get("B").unwrap().is_null());
        assert!(view.at("E.F").unwrap().as_bool().unwrap());
    }

    #[test]
    fn test_try_get_treats_absent_as_none() {
        let doc = doc();
        let view = doc.view();
        assert!(view.try_get("missing").unwrap().is_none());
        assert_eq!(view.try_get("C").unwrap().unwrap().as_i64().unwrap(), 1980);
        assert!(view.get("D").unwrap().try_get("x").is_err());
    }

    #[test]
    fn test_mismatches_are_explicit() {
        let doc = doc();
        let view = doc.view();
        assert_eq!(
            view.get("A").unwrap().as_f64(),
            Err(AccessError::TypeMismatch {
                expected: "number",
                found: "string"
            })
        );
        assert_eq!(
            view.get("missing"),
            Err(AccessError::MissingMember {
                name: "missing".into()
            })
        );
        assert_eq!(
            view.get("D").unwrap().get("x"),
            Err(AccessError::NotAnObject { found: "array" })
        );
        assert_eq!(
            view.get("A").unwrap().index(0),
            Err(AccessError::NotAnArray { found: "string" })
        );
        assert_eq!(
            view.at("D[9]"),
            Err(AccessError::IndexOutOfBounds { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_enumeration() {
        let doc = doc();
        let items: Vec<&str> = doc
            .view()
            .get("D")
            .unwrap()
            .iter()
            .unwrap()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(items, vec!["I", "II", "III"]);
        assert!(doc.view().iter().is_err());
    }

    #[test]
    fn test_invalid_paths() {
        let doc = doc();
        assert!(matches!(doc.view().at("D[x]"), Err(AccessError::InvalidPath { .. })));
        assert!(matches!(doc.view().at("E..F"), Err(AccessError::InvalidPath { .. })));
        assert!(matches!(doc.view().at("D[1"), Err(AccessError::InvalidPath { .. })));
    }

    #[test]
    fn test_as_i64_rejects_fractions() {
        let v = Value::Number(2.5);
        assert!(v.view().as_i64().is_err());
        assert_eq!(Value::Number(-3.0).view().as_i64().unwrap(), -3);
    }
}
