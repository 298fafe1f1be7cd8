//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (.properties / TOML)
//!     → loader.rs (read, pick format by extension)
//!     → properties.rs | toml (parse & map onto the schema)
//!     → validation.rs (semantic checks)
//!     → FrameworkConfig (validated, immutable)
//!     → handed to bootstrap and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields but `scan_package` have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod properties;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::FrameworkConfig;
pub use schema::{LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig};
pub use validation::ValidationError;
