//! # Route Module
//!
//! Host-declared operations and their compiled route descriptors.
//!
//! A service is a list of [`Operation`]s. Each carries an ordered parameter
//! signature and a [`RouteBinding`]: an HTTP verb plus a URI template such as
//! `add?value1={a}&value2={b}`. At startup the registry compiles every binding
//! into a [`RouteDescriptor`], splitting the template into a literal path
//! (`/add`) and an ordered placeholder to query-key map (`a <- value1`,
//! `b <- value2`).

mod descriptor;
mod template;
mod types;

pub use descriptor::RouteDescriptor;
pub use template::{QueryBinding, TemplateError, UriTemplate};
pub use types::{carries_entity, Handler, Operation, ParamType, Parameter, RouteBinding};
