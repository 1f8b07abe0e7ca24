//! Process-wide `tracing` subscriber setup.
//!
//! The service logs through `tracing` everywhere; this module installs the
//! subscriber that renders those events. Configuration comes from the
//! environment:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `JSONSVC_LOG_LEVEL` | `info` | `trace`, `debug`, `info`, `warn` or `error` |
//! | `JSONSVC_LOG_FORMAT` | `pretty` | `json` or `pretty` |
//! | `JSONSVC_LOG_ASYNC` | `false` | write through a non-blocking buffered writer |
//! | `JSONSVC_LOG_TARGET_FILTER` | none | extra comma-separated filter directives |
//! | `JSONSVC_LOG_INCLUDE_LOCATION` | `false` | add file and line to each event |
//!
//! `RUST_LOG`, when set, takes precedence over `JSONSVC_LOG_LEVEL`.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything other than `json` selects the pretty format.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub async_logging: bool,
    pub target_filter: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("JSONSVC_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("JSONSVC_LOG_FORMAT").map_or(defaults.format, |v| LogFormat::parse(&v)),
            async_logging: lookup("JSONSVC_LOG_ASYNC").is_some_and(|v| parse_flag(&v)),
            target_filter: lookup("JSONSVC_LOG_TARGET_FILTER").filter(|v| !v.trim().is_empty()),
            include_location: lookup("JSONSVC_LOG_INCLUDE_LOCATION").is_some_and(|v| parse_flag(&v)),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        // Client disconnects are reported by the HTTP server at info level.
        if let Ok(directive) = "may_minihttp=warn".parse() {
            filter = filter.add_directive(directive);
        }
        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(d) => filter = filter.add_directive(d),
                    Err(e) => eprintln!("Warning: invalid log filter directive '{directive}': {e}"),
                }
            }
        }
        filter
    }
}

/// Install the global subscriber.
///
/// With `async_logging` the returned guard owns the background writer;
/// keep it alive until the process exits or buffered events are lost.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer),
            Some(guard),
        )
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_from_lookup() {
        let config = LogConfig::from_lookup(lookup(&[
            ("JSONSVC_LOG_LEVEL", "Debug"),
            ("JSONSVC_LOG_FORMAT", "JSON"),
            ("JSONSVC_LOG_ASYNC", "yes"),
            ("JSONSVC_LOG_TARGET_FILTER", "  "),
            ("JSONSVC_LOG_INCLUDE_LOCATION", "0"),
        ]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.async_logging);
        assert_eq!(config.target_filter, None);
        assert!(!config.include_location);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Pretty);
    }
}
