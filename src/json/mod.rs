//! # JSON codec
//!
//! A small self-contained codec used for every request body and response the
//! service handles.
//!
//! - [`token`] splits text into [`Token`]s, with a peek that never advances
//! - [`parser`] builds a [`Value`] tree by recursive descent
//! - [`serializer`] writes a tree (or any `serde::Serialize` host value) back
//!   out in one of three [`Format`]s
//! - [`dynamic`] offers typed navigation over a parsed tree via [`DynamicView`]
//!
//! ```rust
//! use jsonservice::json::{self, Format};
//!
//! let doc = json::parse(r#"{"name":"Mike","wife":{"name":"Cheryl"}}"#).unwrap();
//! assert_eq!(doc.view().at("wife.name").unwrap().as_str().unwrap(), "Cheryl");
//! assert_eq!(
//!     json::to_string(&doc),
//!     r#"{"name": "Mike","wife": {"name": "Cheryl"}}"#
//! );
//! assert!(json::to_string_pretty(&doc, Format::Tabs, 4).contains("\n\t\"name\""));
//! ```

pub mod dynamic;
mod error;
pub mod parser;
pub mod serializer;
pub mod token;
mod value;

pub use dynamic::{AccessError, DynamicView};
pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
pub use serializer::{serialize, to_string, to_string_pretty, Format, Serializer};
pub use token::{Token, Tokenizer};
pub use value::{to_value, Map, SerializeError, Value};

/// Deepest array/object nesting the parser accepts.
pub const MAX_DEPTH: usize = 128;
