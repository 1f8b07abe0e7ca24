use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::http_server::{self, ServerHandle};
use super::service::DispatchService;
use crate::dispatcher::Dispatcher;
use crate::json::Serializer;
use crate::logging::Logger;
use crate::registry::{Registry, RegistryError};
use crate::route::Operation;
use crate::runtime_config::ServiceConfig;
use crate::security::{Authorizer, DenyAll};

const RUN_WHILE_POLL: Duration = Duration::from_millis(10);

/// Reasons [`JsonService::start`] can fail. Nothing is left listening when
/// any of these is returned.
#[derive(Debug)]
pub enum StartupError {
    InvalidPort(u16),
    InvalidBaseUri { uri: String, reason: String },
    Registry(RegistryError),
    Bind { addr: String, source: io::Error },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::InvalidPort(port) => write!(
                f,
                "Port must be greater than 0 and less than 65535 (got {port})"
            ),
            StartupError::InvalidBaseUri { uri, reason } => {
                write!(f, "invalid service uri '{uri}': {reason}")
            }
            StartupError::Registry(e) => write!(f, "{e}"),
            StartupError::Bind { addr, source } => write!(f, "cannot listen on {addr}: {source}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Registry(e) => Some(e),
            StartupError::Bind { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RegistryError> for StartupError {
    fn from(e: RegistryError) -> Self {
        StartupError::Registry(e)
    }
}

/// Hosts listening on every interface. URIs show them as `localhost`.
fn is_wildcard_host(host: &str) -> bool {
    matches!(host.trim(), "" | "+" | "*" | "0.0.0.0")
}

/// `http://<host>:<port>/` as clients should address the service.
///
/// # Errors
///
/// [`StartupError::InvalidBaseUri`] when the host is not a valid URI host.
pub fn base_uri(host: &str, port: u16) -> Result<Url, StartupError> {
    let host = if is_wildcard_host(host) { "localhost" } else { host.trim() };
    let uri = format!("http://{host}:{port}/");
    Url::parse(&uri).map_err(|e| StartupError::InvalidBaseUri {
        uri,
        reason: e.to_string(),
    })
}

struct Running {
    handle: ServerHandle,
    uri: Url,
    description_uri: Option<Url>,
}

/// A self-hosted JSON service: operations, configuration and the listener
/// that serves them.
///
/// ```rust,no_run
/// use jsonservice::dispatcher::Reply;
/// use jsonservice::route::{Operation, RouteBinding};
/// use jsonservice::runtime_config::ServiceConfig;
/// use jsonservice::server::JsonService;
///
/// let mut service = JsonService::new(ServiceConfig::default())
///     .operation(Operation::new("Status", |_| Reply::json("OK")).bind(RouteBinding::get("/")));
/// service.start()?;
/// println!("listening on {}", service.uri().unwrap());
/// service.stop();
/// # Ok::<(), jsonservice::server::StartupError>(())
/// ```
pub struct JsonService {
    config: ServiceConfig,
    operations: Vec<Operation>,
    authorizer: Arc<dyn Authorizer>,
    logger: Logger,
    headers: Vec<(String, String)>,
    running: Option<Running>,
}

impl JsonService {
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            operations: Vec::new(),
            authorizer: Arc::new(DenyAll),
            logger: Logger::new(),
            headers: Vec::new(),
            running: None,
        }
    }

    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    #[must_use]
    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    /// Replace the default deny-all authorizer.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Append a header to every response. Ignored while the service runs.
    pub fn add_response_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.is_running() {
            self.logger.warn(format_args!(
                "Cannot add header '{name}' while the service is running"
            ));
            return;
        }
        self.headers.push((name, value.into()));
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Base URI while running.
    #[must_use]
    pub fn uri(&self) -> Option<&Url> {
        self.running.as_ref().map(|r| &r.uri)
    }

    /// Description URI while running with self-description enabled.
    #[must_use]
    pub fn description_uri(&self) -> Option<&Url> {
        self.running.as_ref().and_then(|r| r.description_uri.as_ref())
    }

    /// Bound socket address while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.handle.addr())
    }

    /// Build the registry and start listening. A no-op when already running.
    ///
    /// # Errors
    ///
    /// Any [`StartupError`]; the failure is also written to the service log.
    pub fn start(&mut self) -> Result<(), StartupError> {
        if self.running.is_some() {
            return Ok(());
        }
        self.logger.info("Initializing server");
        match self.launch() {
            Ok(running) => {
                self.logger
                    .info(format_args!("Server started @ {}", running.uri));
                match &running.description_uri {
                    Some(uri) => self
                        .logger
                        .info(format_args!("Service description @ {uri}")),
                    None => self.logger.warn("Service description is not available."),
                }
                self.running = Some(running);
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error(format_args!("Failed to start service: {e}"));
                Err(e)
            }
        }
    }

    fn launch(&self) -> Result<Running, StartupError> {
        let config = &self.config;
        if config.port == 0 {
            return Err(StartupError::InvalidPort(config.port));
        }
        let uri = base_uri(&config.host, config.port)?;
        let registry = Registry::build(&self.operations, &self.logger)?;

        let describe_path = config
            .allow_describe
            .then_some(config.describe_path.as_str());
        let dispatcher = Dispatcher::new(Arc::new(registry), uri.clone(), self.logger.clone())
            .require_authorization(config.authorize)
            .with_authorizer(Arc::clone(&self.authorizer))
            .with_serializer(Serializer::new(config.format, config.indent_size))
            .with_describe_path(describe_path)
            .with_response_headers(self.headers.clone());
        let description_uri = dispatcher.description_uri().cloned();

        may::config().set_stack_size(config.stack_size);
        let bind_host = if is_wildcard_host(&config.host) {
            "0.0.0.0"
        } else {
            config.host.trim()
        };
        let addr = format!("{bind_host}:{}", config.port);
        let handle = http_server::start(DispatchService::new(Arc::new(dispatcher)), addr.as_str())
            .map_err(|source| StartupError::Bind { addr, source })?;

        Ok(Running {
            handle,
            uri,
            description_uri,
        })
    }

    /// Block until the listener is accepting connections.
    ///
    /// # Errors
    ///
    /// `NotConnected` when the service is not running, otherwise see
    /// [`ServerHandle::wait_ready`].
    pub fn wait_ready(&self) -> io::Result<()> {
        match &self.running {
            Some(running) => running.handle.wait_ready(),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "service is not running",
            )),
        }
    }

    /// Stop accepting connections. A no-op when not running.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.stop();
            self.logger.info("Server stopped");
        }
    }

    /// Start, serve until `condition` returns false, then stop.
    ///
    /// # Errors
    ///
    /// Any [`StartupError`] from [`JsonService::start`].
    pub fn run_while<F>(&mut self, mut condition: F) -> Result<(), StartupError>
    where
        F: FnMut() -> bool,
    {
        self.start()?;
        while self.is_running() && condition() {
            std::thread::sleep(RUN_WHILE_POLL);
        }
        self.stop();
        Ok(())
    }

    /// Block until the accept loop ends.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the accept loop panicked.
    pub fn join(mut self) -> std::thread::Result<()> {
        match self.running.take() {
            Some(running) => running.handle.join(),
            None => Ok(()),
        }
    }
}

impl Drop for JsonService {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for JsonService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonService")
            .field("config", &self.config)
            .field("operations", &self.operations.len())
            .field("uri", &self.uri().map(Url::as_str))
            .finish_non_exhaustive()
    }
}
