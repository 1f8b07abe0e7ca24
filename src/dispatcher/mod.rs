//! # Dispatcher Module
//!
//! Runs each request through the service lifecycle: route selection,
//! authorization, self-description, parameter binding and invocation.
//!
//! Handlers receive an [`Invocation`] and return `anyhow::Result<Reply>`:
//!
//! ```rust
//! use jsonservice::dispatcher::Reply;
//! use jsonservice::route::{Operation, ParamType, Parameter, RouteBinding};
//!
//! let multiply = Operation::new("Calculator.Multiply", |call| {
//!     let product = call.args().f64("a")? * call.args().f64("b")?;
//!     Reply::json(&product)
//! })
//! .param(Parameter::required("a", ParamType::Double))
//! .param(Parameter::required("b", ParamType::Double))
//! .bind(RouteBinding::get("multiply?a={a}&b={b}"));
//! # let _ = multiply;
//! ```
//!
//! An error returned by a handler is reported to the client by its root
//! cause only, so `.context(..)` layers stay in the logs. A panicking handler
//! fails its own request and nothing else.

mod binding;
mod core;
pub mod envelope;
mod reply;

pub use binding::{bind, ArgError, Args, BindError};
pub use core::{Dispatcher, Invocation, DEFAULT_DESCRIBE_PATH};
pub use reply::{Reply, ReplyBody};
