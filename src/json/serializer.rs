use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::value::{to_value, SerializeError, Value};

/// Whitespace layout used when writing JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// No whitespace between tokens other than the space after each `:`
    #[default]
    None,
    /// Newline plus one tab per nesting level
    Tabs,
    /// Newline plus `indent_size` spaces per nesting level
    Spaces,
}

impl Format {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::None => "none",
            Format::Tabs => "tabs",
            Format::Spaces => "spaces",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "compact" => Ok(Format::None),
            "tabs" | "tab" => Ok(Format::Tabs),
            "spaces" | "space" => Ok(Format::Spaces),
            other => Err(format!("unknown json format '{other}'")),
        }
    }
}

/// Writes [`Value`] trees as text in a fixed [`Format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    format: Format,
    indent_size: usize,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(Format::None, 4)
    }
}

impl Serializer {
    /// `indent_size` only matters for [`Format::Spaces`].
    #[must_use]
    pub fn new(format: Format, indent_size: usize) -> Self {
        Self {
            format,
            indent_size,
        }
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    #[must_use]
    pub fn indent_size(&self) -> usize {
        self.indent_size
    }

    #[must_use]
    pub fn to_string(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        out
    }

    /// Reflect a host value into a [`Value`] and write it.
    ///
    /// # Errors
    ///
    /// See [`to_value`].
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, SerializeError> {
        Ok(self.to_string(&to_value(value)?))
    }

    fn newline(&self, out: &mut String, level: usize) {
        match self.format {
            Format::None => {}
            Format::Tabs => {
                out.push('\n');
                out.extend(std::iter::repeat('\t').take(level));
            }
            Format::Spaces => {
                out.push('\n');
                out.extend(std::iter::repeat(' ').take(level * self.indent_size));
            }
        }
    }

    fn write_value(&self, out: &mut String, value: &Value, level: usize) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Number(n) => write_number(out, *n),
            Value::String(s) => write_string(out, s),
            Value::Array(items) => {
                out.push('[');
                if !items.is_empty() {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.newline(out, level + 1);
                        self.write_value(out, item, level + 1);
                    }
                    self.newline(out, level);
                }
                out.push(']');
            }
            Value::Object(map) => {
                out.push('{');
                if !map.is_empty() {
                    for (i, (key, member)) in map.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.newline(out, level + 1);
                        write_string(out, key);
                        out.push_str(": ");
                        self.write_value(out, member, level + 1);
                    }
                    self.newline(out, level);
                }
                out.push('}');
            }
        }
    }
}

// Shortest text that parses back to the same f64. Non-finite values have no
// JSON form and are written as null.
fn write_number(out: &mut String, n: f64) {
    if n.is_finite() {
        out.push_str(&n.to_string());
    } else {
        out.push_str("null");
    }
}

fn write_string(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Compact text (`Format::None`).
#[must_use]
pub fn to_string(value: &Value) -> String {
    Serializer::default().to_string(value)
}

#[must_use]
pub fn to_string_pretty(value: &Value, format: Format, indent_size: usize) -> String {
    Serializer::new(format, indent_size).to_string(value)
}

/// Serialize any host value in the given layout.
///
/// # Errors
///
/// See [`to_value`].
pub fn serialize<T: Serialize + ?Sized>(
    value: &T,
    format: Format,
    indent_size: usize,
) -> Result<String, SerializeError> {
    Serializer::new(format, indent_size).serialize(value)
}
