use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info_span};
use url::Url;

use super::binding::{bind, Args, BindError};
use super::envelope;
use super::reply::Reply;
use crate::ids::RequestId;
use crate::json::{Map, Serializer, Value};
use crate::logging::{LogLevel, LogSource, Logger};
use crate::registry::Registry;
use crate::route::RouteDescriptor;
use crate::router::{RouteOutcome, Router};
use crate::security::{Authorizer, DenyAll};
use crate::server::{ServiceRequest, ServiceResponse};

/// Default path of the service description.
pub const DEFAULT_DESCRIBE_PATH: &str = "/help";

/// What a handler sees of the request it is serving.
pub struct Invocation<'a> {
    args: Args,
    request: &'a ServiceRequest,
    route: &'a RouteDescriptor,
    dispatcher: &'a Dispatcher,
}

impl<'a> Invocation<'a> {
    /// Arguments bound from the query string and body.
    #[must_use]
    pub fn args(&self) -> &Args {
        &self.args
    }

    #[must_use]
    pub fn request(&self) -> &'a ServiceRequest {
        self.request
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request.request_id
    }

    /// Name of the operation being invoked.
    #[must_use]
    pub fn operation(&self) -> &'a str {
        self.route.operation()
    }

    #[must_use]
    pub fn base_uri(&self) -> &'a Url {
        &self.dispatcher.base_uri
    }

    /// `None` when self-description is disabled.
    #[must_use]
    pub fn description_uri(&self) -> Option<&'a Url> {
        self.dispatcher.description_uri.as_ref()
    }

    /// Write to the service log with the `User` source.
    pub fn log(&self, level: LogLevel, message: impl std::fmt::Display) {
        self.dispatcher.logger.log_as(LogSource::User, level, message);
    }
}

/// Runs one request through the lifecycle and always produces a response.
///
/// The order of checks is fixed:
///
/// 1. an empty registry answers every request with a failure
/// 2. the route is selected
/// 3. authorization, unless the selected route allows anonymous access
/// 4. the description path
/// 5. no match or wrong verb
/// 6. operations with generic parameters
/// 7. binding, then invocation
///
/// Every failure is reported as a `{"status":"failed",..}` envelope with
/// HTTP 200. Only a handler's [`Reply::with_status`] changes the status code.
pub struct Dispatcher {
    router: Router,
    authorizer: Arc<dyn Authorizer>,
    authorize: bool,
    serializer: Serializer,
    logger: Logger,
    base_uri: Url,
    description_uri: Option<Url>,
    headers: Vec<(String, String)>,
}

impl Dispatcher {
    /// Dispatcher with authorization off and the description at `/help`.
    #[must_use]
    pub fn new(registry: Arc<Registry>, base_uri: Url, logger: Logger) -> Self {
        let description_uri = base_uri.join(DEFAULT_DESCRIBE_PATH).ok();
        Self {
            router: Router::new(registry),
            authorizer: Arc::new(DenyAll),
            authorize: false,
            serializer: Serializer::default(),
            logger,
            base_uri,
            description_uri,
            headers: Vec::new(),
        }
    }

    /// Require authorization for every route not marked `allow_unauthorized`.
    #[must_use]
    pub fn require_authorization(mut self, authorize: bool) -> Self {
        self.authorize = authorize;
        self
    }

    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    #[must_use]
    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Serve the description at `path`, or disable it with `None`.
    ///
    /// A path that does not resolve against the base URI disables the
    /// description too.
    #[must_use]
    pub fn with_describe_path(mut self, path: Option<&str>) -> Self {
        self.description_uri = path.and_then(|p| self.base_uri.join(p).ok());
        self
    }

    /// Headers appended to every response.
    #[must_use]
    pub fn with_response_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    #[must_use]
    pub fn description_uri(&self) -> Option<&Url> {
        self.description_uri.as_ref()
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Handle one request.
    #[must_use]
    pub fn dispatch(&self, request: &ServiceRequest) -> ServiceResponse {
        let span = info_span!(
            "request",
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path
        );
        let mut response = span.in_scope(|| self.process(request, Instant::now()));
        response.headers.extend(self.headers.iter().cloned());
        response
    }

    fn process(&self, request: &ServiceRequest, started: Instant) -> ServiceResponse {
        let registry = self.router.registry();
        if registry.is_empty() {
            self.log_done(
                LogLevel::Error,
                started,
                "There are no operations exposed by this service!",
            );
            return self.failure(envelope::failure(envelope::NO_EXPOSED_OPERATIONS));
        }

        let query_keys = request.query_keys();
        let outcome = self
            .router
            .select(&request.method, &request.path, &query_keys);

        let needs_auth = self.authorize
            && outcome
                .matched()
                .map_or(true, |route| !route.allow_unauthorized());
        if needs_auth && !self.authorizer.authorize(request) {
            self.log_done(LogLevel::Warning, started, "Unauthorized request");
            return self.failure(envelope::failure(envelope::UNAUTHORIZED));
        }

        if self.is_describe_request(request) {
            let body = envelope::describe(registry.routes(), &self.base_uri);
            self.log_done(LogLevel::Info, started, "Describing service");
            return ServiceResponse::json(200, self.serializer.to_string(&body));
        }

        let route = match outcome {
            RouteOutcome::Matched(route) => route,
            RouteOutcome::WrongVerb => {
                self.log_done(LogLevel::Warning, started, "Invalid HTTP verb");
                return self.failure(envelope::failure(envelope::WRONG_VERB));
            }
            RouteOutcome::NoMatch => {
                self.log_done(
                    LogLevel::Warning,
                    started,
                    format_args!("No suitable method found for {}", request.path_and_query()),
                );
                return self.failure(envelope::failure(envelope::NO_MATCHING_OPERATION));
            }
        };

        if route.has_generic_params() {
            self.log_done(LogLevel::Warning, started, envelope::GENERIC_UNSUPPORTED);
            return self.failure(envelope::failure(envelope::GENERIC_UNSUPPORTED));
        }

        let args = match bind(route, request) {
            Ok(args) => args,
            Err(BindError::BadJsonBody(reason)) => {
                debug!(operation = %route.operation(), reason = %reason, "Entity body rejected");
                self.log_done(
                    LogLevel::Warning,
                    started,
                    "Unable to parse the posted json document.",
                );
                return self.failure(envelope::failure(envelope::INVALID_JSON_POSTED));
            }
            Err(e) => {
                debug!(operation = %route.operation(), error = %e, "Binding failed");
                self.log_done(LogLevel::Warning, started, "Parameter value missing or invalid");
                return self.failure(envelope::bind_failure(&e));
            }
        };

        self.invoke(route, request, args, started)
    }

    fn invoke(
        &self,
        route: &RouteDescriptor,
        request: &ServiceRequest,
        args: Args,
        started: Instant,
    ) -> ServiceResponse {
        let call = Invocation {
            args,
            request,
            route,
            dispatcher: self,
        };
        let handler = route.handler();
        match catch_unwind(AssertUnwindSafe(|| (**handler)(&call))) {
            Ok(Ok(reply)) => {
                self.log_done(
                    LogLevel::Info,
                    started,
                    format_args!("Invoked {}({})", route.operation(), call.args),
                );
                self.render(reply)
            }
            Ok(Err(e)) => {
                debug!(operation = %route.operation(), error = ?e, "Operation returned an error");
                self.log_done(LogLevel::Warning, started, "Failure to execute operation");
                self.failure(envelope::failure(e.root_cause().to_string()))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    operation = %route.operation(),
                    panic_message = %message,
                    "Operation panicked"
                );
                self.log_done(LogLevel::Warning, started, "Failure to execute operation");
                self.failure(envelope::failure(message))
            }
        }
    }

    fn is_describe_request(&self, request: &ServiceRequest) -> bool {
        self.description_uri
            .as_ref()
            .is_some_and(|uri| uri.path().eq_ignore_ascii_case(&request.path))
    }

    /// Log a terminal state with the time spent on the request so far.
    fn log_done(&self, level: LogLevel, started: Instant, message: impl std::fmt::Display) {
        self.logger
            .log(level, format_args!("{message}, {}ms", elapsed_ms(started)));
    }

    fn render(&self, reply: Reply) -> ServiceResponse {
        reply.into_response(&self.serializer)
    }

    fn failure(&self, envelope: Map) -> ServiceResponse {
        ServiceResponse::json(200, self.serializer.to_string(&Value::Object(envelope)))
    }
}

fn elapsed_ms(started: Instant) -> u128 {
    started.elapsed().as_millis()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation panicked".to_string()
    }
}
