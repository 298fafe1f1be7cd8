//! Controller discovery and request dispatch.
//!
//! At startup the configured namespace is scanned in a [`Catalog`], one
//! instance of every controller type is registered, and a frozen
//! [`RouteTable`] maps `base path + method path` to handlers. Each request is
//! then resolved by the [`Dispatcher`], which binds request parameters to
//! handler arguments and invokes the handler.

pub mod config;
pub mod container;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::FrameworkConfig;
pub use container::{Catalog, ComponentType, ParamDecl};
pub use dispatch::{Arguments, DispatchOutcome, Dispatcher, HandlerError};
pub use http::{HttpRequest, HttpResponse, HttpServer};
pub use lifecycle::{bootstrap, Application, Shutdown};
pub use routing::RouteTable;
