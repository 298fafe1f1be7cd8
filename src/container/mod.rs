//! Component container subsystem.
//!
//! # Data Flow
//! ```text
//! Catalog (component types, registered at startup)
//!     → scanner.rs (walk namespace, collect type names)
//!     → registry.rs (resolve, skip non-controllers, instantiate once)
//!     → ComponentRegistry (simple name → instance, frozen)
//! ```
//!
//! # Design Decisions
//! - Explicit catalog of constructors instead of runtime type lookup
//! - Unresolvable namespace is fatal; a bad component is not
//! - One instance per controller type for the life of the process

pub mod catalog;
pub mod registry;
pub mod scanner;

pub use catalog::{Catalog, ComponentBuilder, ComponentType, ConstructError, ParamDecl, ParamType};
pub use registry::{ComponentInstance, ComponentRegistry, RegistrationFault};
pub use scanner::{scan, DiscoveryError, NamespaceEntry, NamespaceSource};
