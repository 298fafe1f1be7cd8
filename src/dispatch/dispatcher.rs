//! Per-request dispatch.
//!
//! # Responsibilities
//! - Derive the route key by removing the context path from the request path
//! - Look up the route; answer misses with the not-found body
//! - Bind parameters and invoke the handler on its component instance
//! - Contain every handler fault (error or panic) inside the call
//!
//! # Design Decisions
//! - Read-only against the route table; safe to call from many threads
//! - GET and POST are not distinguished
//! - Faults go to an injected [`FaultReporter`]; the response is left as the
//!   handler left it

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;

use crate::container::registry::panic_message;
use crate::dispatch::arguments::{Argument, Arguments, HandlerError};
use crate::http::request::ParamMap;
use crate::http::response::UTF_8;
use crate::http::{HttpRequest, HttpResponse};
use crate::observability::metrics;
use crate::routing::{ParameterSpec, RouteEntry, RouteTable};

/// Body written when no route matches.
pub const NOT_FOUND_BODY: &str = "404 请求URL不存在！";

/// What happened to a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion.
    Handled,
    /// No route matched; the not-found body was written.
    NotFound,
    /// A handler failed or panicked; the fault was reported and swallowed.
    Faulted,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Handled => "handled",
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::Faulted => "faulted",
        }
    }
}

/// A handler invocation that did not complete normally.
#[derive(Debug, thiserror::Error)]
pub enum DispatchFault {
    #[error("handler `{component}::{method}` for `{route}` failed: {source}")]
    Handler {
        route: String,
        component: String,
        method: String,
        #[source]
        source: HandlerError,
    },
    #[error("handler `{component}::{method}` for `{route}` panicked: {message}")]
    Panicked {
        route: String,
        component: String,
        method: String,
        message: String,
    },
}

/// Sink for dispatch faults.
pub trait FaultReporter: Send + Sync {
    fn report(&self, fault: &DispatchFault);
}

/// Reports faults as `error` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl FaultReporter for LogReporter {
    fn report(&self, fault: &DispatchFault) {
        tracing::error!(error = %fault, "Handler invocation failed");
    }
}

/// Resolves requests against a frozen route table.
pub struct Dispatcher {
    table: RouteTable,
    reporter: Arc<dyn FaultReporter>,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self::with_reporter(table, Arc::new(LogReporter))
    }

    pub fn with_reporter(table: RouteTable, reporter: Arc<dyn FaultReporter>) -> Self {
        Self { table, reporter }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Handle one request. Never fails; see [`DispatchOutcome`].
    pub fn dispatch(&self, request: &HttpRequest, response: &mut HttpResponse) -> DispatchOutcome {
        let start = Instant::now();
        let key = route_key(request.path(), request.context_path());

        let outcome = match key.and_then(|key| self.table.get(key)) {
            Some(entry) => {
                tracing::debug!(route = %entry.key(), method = %request.method(), "Dispatching request");
                self.invoke(entry, request, response)
            }
            None => {
                tracing::debug!(
                    path = %request.path(),
                    context_path = %request.context_path(),
                    "No route matched"
                );
                write_not_found(response);
                DispatchOutcome::NotFound
            }
        };

        metrics::record_dispatch(outcome.as_str(), start);
        outcome
    }

    fn invoke(&self, entry: &RouteEntry, request: &HttpRequest, response: &mut HttpResponse) -> DispatchOutcome {
        let slots = bind(entry.params(), request.params());
        let handler = entry.handler();
        let receiver = &**entry.instance();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut args = Arguments::new(request, response, slots);
            handler(receiver, &mut args)
        }));

        let fault = match result {
            Ok(Ok(())) => return DispatchOutcome::Handled,
            Ok(Err(source)) => DispatchFault::Handler {
                route: entry.key().to_string(),
                component: entry.component().to_string(),
                method: entry.method().to_string(),
                source,
            },
            Err(payload) => DispatchFault::Panicked {
                route: entry.key().to_string(),
                component: entry.component().to_string(),
                method: entry.method().to_string(),
                message: panic_message(&*payload),
            },
        };
        self.reporter.report(&fault);
        DispatchOutcome::Faulted
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .finish_non_exhaustive()
    }
}

/// Request path with the context path removed, or `None` when the path lies
/// outside the context. The prefix only matches on a segment boundary.
pub fn route_key<'a>(path: &'a str, context_path: &str) -> Option<&'a str> {
    let context_path = context_path.trim_end_matches('/');
    if context_path.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(context_path)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Produce argument slots for `specs` from the request parameters.
pub fn bind(specs: &[ParameterSpec], params: &ParamMap) -> Vec<Argument> {
    specs
        .iter()
        .map(|spec| match spec {
            ParameterSpec::InjectedRequest => Argument::Request,
            ParameterSpec::InjectedResponse => Argument::Response,
            ParameterSpec::NamedValue(key) => {
                Argument::Value(params.get_all(key).map(|values| values.join(", ")))
            }
        })
        .collect()
}

fn write_not_found(response: &mut HttpResponse) {
    response.set_status(StatusCode::NOT_FOUND);
    response.set_character_encoding(UTF_8);
    response.write(NOT_FOUND_BODY);
}
