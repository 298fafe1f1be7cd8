//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     ComponentRegistry
//!     → controller base path + method route path = route key
//!     → classify parameters (request, response, named value)
//!     → Freeze as immutable RouteTable
//!
//! Per request:
//!     route key → RouteTable::get → RouteEntry or miss
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact string match only
//! - Unbound parameters are a startup error, never a runtime surprise

pub mod table;

pub use table::{ParameterSpec, RouteBuildError, RouteEntry, RouteTable};
