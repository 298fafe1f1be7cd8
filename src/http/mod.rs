//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → request.rs (HttpRequest: path, context path, parameter multi-map)
//!     → dispatcher (route lookup, handler call)
//!     → response.rs (HttpResponse written by the handler → axum Response)
//!     → Send to client
//! ```

pub mod request;
pub mod request_id;
pub mod response;
pub mod server;

pub use request::{HttpRequest, ParamMap};
pub use request_id::X_REQUEST_ID;
pub use response::HttpResponse;
pub use server::HttpServer;
