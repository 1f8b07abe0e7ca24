//! # CLI Module
//!
//! Command-line entry points for the `jsonservice` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the sample calculator service:
//!
//! ```bash
//! jsonservice serve --port 5678 --format spaces --indent 2
//! curl 'http://localhost:5678/add?value1=3&value2=5'
//! curl 'http://localhost:5678/help'
//! ```
//!
//! Settings start from the `JSONSVC_*` environment (see
//! [`runtime_config`](crate::runtime_config)); flags override them.
//! With `--authorize`, every route except `/` needs `?key=<api key>`, keys
//! coming from `--api-key` or `JSONSVC_API_KEYS`.
//!
//! ### `routes`
//!
//! Print the routing table, one `VERB /path?key={placeholder} -> operation`
//! line per route.

mod commands;
pub mod demo;


pub use commands::{run, run_cli, Cli, Commands, ServeArgs};
