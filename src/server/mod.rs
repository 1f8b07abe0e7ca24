//! # Server Module
//!
//! The transport side of the service.
//!
//! - [`ServiceRequest`] / [`ServiceResponse`] are the transport-independent
//!   shapes the dispatcher consumes and produces
//! - [`DispatchService`] adapts them to `may_minihttp`, one coroutine per
//!   connection
//! - [`JsonService`] owns the lifecycle: registry build, listener start and
//!   stop, service URIs and custom response headers

mod core;
pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use core::{base_uri, JsonService, StartupError};
pub use http_server::ServerHandle;
pub use request::{from_http, parse_query, ServiceRequest};
pub use response::{write_response, ServiceResponse, JSON_CONTENT_TYPE};
pub use service::DispatchService;
