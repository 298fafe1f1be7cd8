//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! HttpRequest (path, context path, parameters)
//!     → dispatcher.rs (route key, table lookup)
//!     → miss: 404 body, done
//!     → hit: arguments.rs (bind ParameterSpecs to slots)
//!     → handler(instance, arguments)
//!     → fault: FaultReporter, response left as-is
//! ```

pub mod arguments;
pub mod dispatcher;

pub use arguments::{Argument, Arguments, HandlerError};
pub use dispatcher::{
    DispatchFault, DispatchOutcome, Dispatcher, FaultReporter, LogReporter, NOT_FOUND_BODY,
};
