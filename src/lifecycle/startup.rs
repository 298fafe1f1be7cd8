//! Startup orchestration.
//!
//! # Responsibilities
//! - Scan the configured namespace
//! - Register one instance per controller type
//! - Build and freeze the route table behind a dispatcher
//!
//! # Design Decisions
//! - Fail fast: discovery and route-build errors are fatal
//! - Component faults are logged and survived
//! - Runs on one thread and finishes before any request is served

use std::sync::Arc;

use crate::config::FrameworkConfig;
use crate::container::{scan, Catalog, ComponentRegistry, DiscoveryError};
use crate::dispatch::{Dispatcher, FaultReporter, LogReporter};
use crate::observability::metrics;
use crate::routing::{RouteBuildError, RouteTable};

/// Fatal startup failure.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("component discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("route table build failed: {0}")]
    Routes(#[from] RouteBuildError),
}

/// The frozen result of startup.
#[derive(Debug)]
pub struct Application {
    registry: ComponentRegistry,
    dispatcher: Arc<Dispatcher>,
}

impl Application {
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Shared handle for the transport.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}

/// Scan → register → build, logging faults to `tracing`.
pub fn bootstrap(config: &FrameworkConfig, catalog: &Catalog) -> Result<Application, StartupError> {
    bootstrap_with_reporter(config, catalog, Arc::new(LogReporter))
}

/// [`bootstrap`] with a custom sink for dispatch faults.
pub fn bootstrap_with_reporter(
    config: &FrameworkConfig,
    catalog: &Catalog,
    reporter: Arc<dyn FaultReporter>,
) -> Result<Application, StartupError> {
    tracing::info!(scan_package = %config.scan_package, "Scanning for components");
    let names = scan(catalog, &config.scan_package)?;

    let registry = ComponentRegistry::register_all(catalog, &names);
    let table = RouteTable::build(&registry)?;

    if table.is_empty() {
        tracing::warn!(scan_package = %config.scan_package, "No routes registered, every request will 404");
    }
    metrics::record_route_count(table.len());

    Ok(Application {
        registry,
        dispatcher: Arc::new(Dispatcher::with_reporter(table, reporter)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ComponentType, ParamDecl};

    #[derive(Default)]
    struct Ping;

    fn config(scan_package: &str) -> FrameworkConfig {
        FrameworkConfig {
            scan_package: scan_package.into(),
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with(
                ComponentType::builder::<Ping>("app.controller.Ping")
                    .controller("/ping")
                    .default_constructor()
                    .route("pong", "/pong", [ParamDecl::response()], |_, args| {
                        args.response(0)?.write("pong");
                        Ok(())
                    })
                    .build(),
            )
            .with(
                ComponentType::builder::<Ping>("other.Ping2")
                    .controller("/other")
                    .default_constructor()
                    .route("x", "/x", [], |_, _| Ok(()))
                    .build(),
            )
    }

    #[test]
    fn test_bootstrap_only_sees_scanned_namespace() {
        let app = bootstrap(&config("app.controller"), &catalog()).unwrap();
        assert_eq!(app.registry().len(), 1);

        let dispatcher = app.dispatcher();
        assert!(dispatcher.table().get("/ping/pong").is_some());
        assert!(dispatcher.table().get("/other/x").is_none());
    }

    #[test]
    fn test_unknown_namespace_is_fatal() {
        let err = bootstrap(&config("app.missing"), &catalog()).unwrap_err();
        assert!(matches!(err, StartupError::Discovery(_)));
    }

    #[test]
    fn test_unbound_parameter_is_fatal() {
        let catalog = Catalog::new().with(
            ComponentType::builder::<Ping>("app.Bad")
                .controller("/bad")
                .default_constructor()
                .route("x", "/x", [ParamDecl::text()], |_, _| Ok(()))
                .build(),
        );
        let err = bootstrap(&config("app"), &catalog).unwrap_err();
        assert!(matches!(err, StartupError::Routes(_)));
    }
}
