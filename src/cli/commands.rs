use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;

use super::demo;
use crate::json::Format;
use crate::logging::Logger;
use crate::registry::Registry;
use crate::runtime_config::ServiceConfig;
use crate::security::QueryKeyAuthorizer;
use crate::server::JsonService;
use crate::telemetry::{init_logging, LogConfig};

/// Command-line interface for the sample JSON service.
#[derive(Parser, Debug)]
#[command(name = "jsonservice", version)]
#[command(about = "Self-hosted JSON RPC service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the calculator service until the process is stopped
    Serve(ServeArgs),
    /// Print the routing table of the calculator service
    Routes,
}

/// Overrides applied on top of the `JSONSVC_*` environment.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Listen host; `+`, `*` and `0.0.0.0` listen on every interface
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Require `?key=<api key>` on routes that do not allow anonymous access
    #[arg(long, default_value_t = false)]
    pub authorize: bool,

    /// Accepted API keys
    #[arg(long = "api-key", env = "JSONSVC_API_KEYS", value_delimiter = ',')]
    pub api_keys: Vec<String>,

    /// Disable the service description
    #[arg(long, default_value_t = false)]
    pub no_describe: bool,

    #[arg(long)]
    pub describe_path: Option<String>,

    /// JSON layout: none, tabs or spaces
    #[arg(long)]
    pub format: Option<Format>,

    /// Spaces per level with `--format spaces`
    #[arg(long)]
    pub indent: Option<usize>,

    /// Extra response header, `Name: value` (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Also append service log lines to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ServeArgs {
    #[must_use]
    pub fn apply(&self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.authorize {
            config.authorize = true;
        }
        if self.no_describe {
            config.allow_describe = false;
        }
        if let Some(path) = &self.describe_path {
            config.describe_path.clone_from(path);
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(indent) = self.indent {
            config.indent_size = indent;
        }
        config
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name missing in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// Logging setup, registry validation or listener startup failures.
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Run an already parsed command line.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Routes => {
            let registry = Registry::build(&demo::calculator(), &Logger::new())?;
            for route in registry.routes() {
                println!("{route}");
            }
            Ok(())
        }
        Commands::Serve(args) => serve(&args),
    }
}

fn serve(args: &ServeArgs) -> anyhow::Result<()> {
    let _guard = init_logging(&LogConfig::from_env())?;
    let config = args.apply(ServiceConfig::from_env());

    let logger = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Logger::with_writer(file)
        }
        None => Logger::new(),
    };

    let mut service = JsonService::new(config)
        .operations(demo::calculator())
        .with_logger(logger)
        .with_authorizer(QueryKeyAuthorizer::new("key", args.api_keys.iter().cloned()));
    for (name, value) in &args.headers {
        service.add_response_header(name.as_str(), value.as_str());
    }

    service.start().context("Failed to start service")?;
    service
        .join()
        .map_err(|_| anyhow!("accept loop terminated abnormally"))
}
