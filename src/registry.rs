//! # Route Registry
//!
//! The immutable set of [`RouteDescriptor`]s a running service dispatches
//! against. It is built once per start from the host's operations and
//! validated before any traffic is accepted:
//!
//! - every placeholder must name a parameter of its operation
//! - no two routes may share path, verb and query-key set
//!
//! Both checks log every violation and then fail with the first one.

use std::fmt;

use crate::logging::Logger;
use crate::route::{carries_entity, Operation, RouteDescriptor, TemplateError};

/// Fatal problems found while building the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A template placeholder names no parameter of its operation
    InvalidPlaceholder {
        operation: String,
        placeholders: Vec<String>,
    },
    /// Two or more operations share path, verb and query-key set
    TemplateCollision {
        path: String,
        verb: String,
        keys: Vec<String>,
        operations: Vec<String>,
    },
    /// A template could not be decomposed
    InvalidTemplate {
        operation: String,
        template: String,
        reason: TemplateError,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidPlaceholder {
                operation,
                placeholders,
            } => write!(
                f,
                "the route template of {operation} specifies placeholder(s) that are not defined: {}",
                placeholders.join(",")
            ),
            RegistryError::TemplateCollision {
                path,
                verb,
                keys,
                operations,
            } => write!(
                f,
                "two or more operations share an identical route: Path={path}; Parameters={}; Verb={verb}; Operations={}",
                keys.join(","),
                operations.join(",")
            ),
            RegistryError::InvalidTemplate {
                operation,
                template,
                reason,
            } => write!(f, "invalid route template '{template}' on {operation}: {reason}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::InvalidTemplate { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Validated, read-only route table in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    routes: Vec<RouteDescriptor>,
}

impl Registry {
    /// Compile and validate the host's operations.
    ///
    /// Operations without a binding are skipped. With several bindings only
    /// the first is used. Generic parameters are accepted here and rejected
    /// per request.
    ///
    /// # Errors
    ///
    /// [`RegistryError`] for the first bad template, invalid placeholder or
    /// collision; every offender is logged first.
    pub fn build(operations: &[Operation], logger: &Logger) -> Result<Self, RegistryError> {
        logger.info("Obtaining service operation information");

        let mut routes = Vec::with_capacity(operations.len());
        for op in operations {
            let Some(binding) = op.bindings().first() else {
                tracing::debug!(operation = %op.name(), "operation has no route binding, skipping");
                continue;
            };
            if op.bindings().len() > 1 {
                logger.warn(format_args!(
                    "{} has multiple route bindings, defaulting to '{}' method.",
                    op.name(),
                    binding.method()
                ));
            }
            if binding.entity.is_some() && !carries_entity(binding.method()) {
                logger.warn(format_args!(
                    "{} names an entity parameter but {} requests carry no body; ignoring it.",
                    op.name(),
                    binding.method()
                ));
            }
            if op.params().iter().any(|p| p.ty().is_generic()) {
                logger.warn(format_args!(
                    "{} contains generic parameters which are not currently supported.",
                    op.name()
                ));
            }
            let route = RouteDescriptor::compile(op, binding).map_err(|reason| {
                let err = RegistryError::InvalidTemplate {
                    operation: op.name().to_string(),
                    template: binding.template().to_string(),
                    reason,
                };
                logger.error(&err);
                err
            })?;
            routes.push(route);
        }

        logger.info("Validating placeholder variables");
        Self::validate_placeholders(&routes, logger)?;
        Self::detect_collisions(&routes, logger)?;

        Ok(Self { routes })
    }

    fn validate_placeholders(
        routes: &[RouteDescriptor],
        logger: &Logger,
    ) -> Result<(), RegistryError> {
        let mut first = None;
        for route in routes {
            let bad = route.invalid_placeholders();
            if bad.is_empty() {
                continue;
            }
            logger.error(format_args!(
                "Invalid placeholder(s) on the {} operation: {}",
                route.operation(),
                bad.join(",")
            ));
            first.get_or_insert_with(|| RegistryError::InvalidPlaceholder {
                operation: route.operation().to_string(),
                placeholders: bad.iter().map(ToString::to_string).collect(),
            });
        }
        first.map_or(Ok(()), Err)
    }

    fn detect_collisions(routes: &[RouteDescriptor], logger: &Logger) -> Result<(), RegistryError> {
        // Groups in order of first appearance.
        let mut groups: Vec<((String, String, Vec<String>), Vec<&RouteDescriptor>)> = Vec::new();
        for route in routes {
            let key = route.collision_key();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(route),
                None => groups.push((key, vec![route])),
            }
        }

        let mut first = None;
        for (_, members) in groups.iter().filter(|(_, m)| m.len() > 1) {
            let head = members[0];
            let keys: Vec<String> = head.bindings().iter().map(|b| b.key.clone()).collect();
            let operations: Vec<String> =
                members.iter().map(|r| r.operation().to_string()).collect();
            logger.error(format_args!(
                "Template collision detected: Path={}; Parameters={}; Verb={}; Operations={}",
                head.path(),
                keys.join(","),
                head.method(),
                operations.join(",")
            ));
            first.get_or_insert_with(|| RegistryError::TemplateCollision {
                path: head.path().to_string(),
                verb: head.method().to_string(),
                keys,
                operations,
            });
        }

        match first {
            Some(err) => Err(err),
            None => {
                logger.info("No template collisions detected.");
                Ok(())
            }
        }
    }

    /// Descriptors in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Log the route table at debug level.
    pub fn dump_routes(&self) {
        for route in &self.routes {
            tracing::debug!(route = %route, "registered route");
        }
    }
}
