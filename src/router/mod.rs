//! # Router Module
//!
//! Per-request route selection over the validated [`Registry`](crate::registry::Registry).
//!
//! Several operations may share a path and verb and differ only in which
//! query keys they bind. For a request the router keeps the routes whose
//! required keys are all present and picks the most specific one:
//!
//! | Template | `/op?a=5` | `/op?a=5&b=10` | `/op?a=5&b=7&c=3` |
//! |---|---|---|---|
//! | `op?a={x}` | **selected** | | |
//! | `op?a={x}&b={y}` | | **selected** | |
//! | `op?a={x}&b={y}&c={z}` | | | **selected** |
//!
//! When the path exists but only under other verbs the outcome is
//! [`RouteOutcome::WrongVerb`] rather than [`RouteOutcome::NoMatch`].

mod core;
#[cfg(test)]
mod tests;

pub use core::{RouteOutcome, Router};
