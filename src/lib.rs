//! # jsonservice
//!
//! A minimal self-hosted JSON RPC dispatcher. A process declares a set of
//! operations (HTTP verb + URI template + handler), binds them to an
//! embedded HTTP listener, and the dispatcher routes each request to the
//! best-matching operation, coerces query-string and body data into typed
//! arguments, invokes the handler and renders the result as JSON.
//!
//! ## Architecture
//!
//! - **[`json`]** - self-contained codec: tokenizer, parser, serializer and
//!   the [`json::Value`] tree with [`json::DynamicView`] navigation
//! - **[`route`]** - operation declarations and compiled route descriptors
//! - **[`registry`]** - startup validation (placeholders, template collisions)
//! - **[`router`]** - per-request route selection by specificity
//! - **[`dispatcher`]** - request lifecycle, parameter binding, envelopes and
//!   the service description
//! - **[`security`]** - request authorization
//! - **[`server`]** - `may_minihttp` transport and the [`server::JsonService`]
//!   lifecycle
//! - **[`logging`]** - the service log (timestamped lines to an optional sink)
//! - **[`telemetry`]** - `tracing` subscriber setup
//! - **[`runtime_config`]** - settings with `JSONSVC_*` environment overrides
//! - **[`cli`]** - the `jsonservice` binary and its sample service
//!
//! ## Request Flow
//!
//! ```text
//! GET /add?value1=3&value2=5
//!   -> Router::select         GET /add?value1={a}&value2={b} -> Calculator.Add
//!   -> Authorizer             (only when authorization is required)
//!   -> bind                   a = 3, b = 5
//!   -> handler                Reply::json(&8)
//!   -> Serializer             8
//! ```
//!
//! Every failure along the way becomes a `{"status": "failed","message": ..}`
//! envelope for that one request.
//!
//! ## Templates
//!
//! A template is a path plus optional `key={placeholder}` query bindings:
//!
//! ```text
//! add?value1={a}&value2={b}
//! ```
//!
//! Each placeholder names a parameter of the operation. Several operations
//! may share a path and verb; the one binding the most keys that are all
//! present in the request wins.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jsonservice::dispatcher::Reply;
//! use jsonservice::route::{Operation, ParamType, Parameter, RouteBinding};
//! use jsonservice::runtime_config::ServiceConfig;
//! use jsonservice::server::JsonService;
//!
//! fn main() -> anyhow::Result<()> {
//!     let add = Operation::new("Calculator.Add", |call| {
//!         Reply::json(&(call.args().i32("a")? + call.args().i32("b")?))
//!     })
//!     .param(Parameter::required("a", ParamType::Int32))
//!     .param(Parameter::optional("b", ParamType::Int32, 1))
//!     .bind(RouteBinding::get("add?value1={a}&value2={b}").example("add?value1=3&value2=5"));
//!
//!     let mut service = JsonService::new(ServiceConfig::from_env()).operation(add);
//!     service.start()?;
//!     service.join().map_err(|_| anyhow::anyhow!("server stopped unexpectedly"))
//! }
//! ```

pub mod cli;
pub mod dispatcher;
pub mod ids;
pub mod json;
pub mod logging;
pub mod registry;
pub mod route;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod server;
pub mod telemetry;

pub use dispatcher::{Dispatcher, Invocation, Reply};
pub use json::{parse, Format, Value};
pub use registry::{Registry, RegistryError};
pub use route::{Operation, ParamType, Parameter, RouteBinding};
pub use server::{JsonService, StartupError};
