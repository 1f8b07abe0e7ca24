//! # Runtime Configuration Module
//!
//! Service settings with defaults, overridable from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `JSONSVC_HOST` | `0.0.0.0` |
//! | `JSONSVC_PORT` | `5678` |
//! | `JSONSVC_AUTHORIZE` | `false` |
//! | `JSONSVC_ALLOW_DESCRIBE` | `true` |
//! | `JSONSVC_DESCRIBE_PATH` | `/help` |
//! | `JSONSVC_FORMAT` | `none` (`tabs`, `spaces`) |
//! | `JSONSVC_INDENT` | `4` |
//! | `JSONSVC_STACK_SIZE` | `0x10000` |
//!
//! `JSONSVC_STACK_SIZE` accepts decimal (`65536`) or hexadecimal (`0x10000`).
//! Unparseable values fall back to the default.
//!
//! ```rust
//! use jsonservice::runtime_config::ServiceConfig;
//!
//! let config = ServiceConfig::from_lookup(|key| match key {
//!     "JSONSVC_PORT" => Some("8080".to_string()),
//!     _ => None,
//! });
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.describe_path, "/help");
//! ```

use std::env;
use tracing::warn;

use crate::json::Format;

pub const DEFAULT_PORT: u16 = 5678;
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Listen host. `+`, `*`, `0.0.0.0` and empty listen on all interfaces.
    pub host: String,
    pub port: u16,
    /// Run the authorizer for routes that do not allow anonymous access
    pub authorize: bool,
    pub allow_describe: bool,
    pub describe_path: String,
    pub format: Format,
    pub indent_size: usize,
    /// Coroutine stack size in bytes
    pub stack_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            authorize: false,
            allow_describe: true,
            describe_path: "/help".to_string(),
            format: Format::None,
            indent_size: 4,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source, starting from the defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("JSONSVC_HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("JSONSVC_PORT") {
            config.port = parse_or("JSONSVC_PORT", &port, config.port, |v| v.parse().ok());
        }
        if let Some(v) = lookup("JSONSVC_AUTHORIZE") {
            config.authorize = parse_or("JSONSVC_AUTHORIZE", &v, config.authorize, parse_bool);
        }
        if let Some(v) = lookup("JSONSVC_ALLOW_DESCRIBE") {
            config.allow_describe =
                parse_or("JSONSVC_ALLOW_DESCRIBE", &v, config.allow_describe, parse_bool);
        }
        if let Some(path) = lookup("JSONSVC_DESCRIBE_PATH") {
            config.describe_path = path.trim().to_string();
        }
        if let Some(v) = lookup("JSONSVC_FORMAT") {
            config.format = parse_or("JSONSVC_FORMAT", &v, config.format, |v| v.parse().ok());
        }
        if let Some(v) = lookup("JSONSVC_INDENT") {
            config.indent_size = parse_or("JSONSVC_INDENT", &v, config.indent_size, |v| v.parse().ok());
        }
        if let Some(v) = lookup("JSONSVC_STACK_SIZE") {
            config.stack_size = parse_or("JSONSVC_STACK_SIZE", &v, config.stack_size, parse_size);
        }
        config
    }
}

fn parse_or<T, F>(key: &str, raw: &str, default: T, parse: F) -> T
where
    F: Fn(&str) -> Option<T>,
{
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            warn!(variable = key, value = raw, "Ignoring invalid configuration value");
            default
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Decimal or `0x`-prefixed hexadecimal byte count.
#[must_use]
pub fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}
