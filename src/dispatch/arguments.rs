//! Handler arguments.
//!
//! A handler receives one [`Arguments`] per call: a positional view over the
//! live request, the live response and the bound parameter strings. Accessing
//! a slot as the wrong kind is a [`HandlerError::ArgumentMismatch`].

use std::fmt;

use crate::http::{HttpRequest, HttpResponse};

/// Error returned by a handler; logged and swallowed by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("argument {index} is {found}, not {expected}")]
    ArgumentMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("handler has no argument {index} (got {len})")]
    MissingArgument { index: usize, len: usize },
    #[error("receiver is not a `{expected}`")]
    Receiver { expected: &'static str },
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(reason: impl fmt::Display) -> Self {
        HandlerError::Failed(reason.to_string())
    }
}

/// One bound argument slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Request,
    Response,
    /// Joined parameter values, or `None` when the request lacked the key.
    Value(Option<String>),
}

impl Argument {
    fn kind(&self) -> &'static str {
        match self {
            Argument::Request => "request",
            Argument::Response => "response",
            Argument::Value(_) => "value",
        }
    }
}

/// Positional arguments for one handler call.
pub struct Arguments<'a> {
    request: &'a HttpRequest,
    response: &'a mut HttpResponse,
    slots: Vec<Argument>,
}

impl<'a> Arguments<'a> {
    pub fn new(request: &'a HttpRequest, response: &'a mut HttpResponse, slots: Vec<Argument>) -> Self {
        Self {
            request,
            response,
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Argument] {
        &self.slots
    }

    /// The live request bound at `index`.
    pub fn request(&self, index: usize) -> Result<&HttpRequest, HandlerError> {
        match self.slot(index)? {
            Argument::Request => Ok(self.request),
            other => Err(mismatch(index, "request", other)),
        }
    }

    /// The live response bound at `index`.
    pub fn response(&mut self, index: usize) -> Result<&mut HttpResponse, HandlerError> {
        match self.slot(index)? {
            Argument::Response => {}
            other => return Err(mismatch(index, "response", other)),
        }
        Ok(&mut *self.response)
    }

    /// The parameter string bound at `index`; empty when the key was absent.
    pub fn value(&self, index: usize) -> Result<&str, HandlerError> {
        self.optional_value(index).map(Option::unwrap_or_default)
    }

    /// The parameter string bound at `index`, keeping absence distinct.
    pub fn optional_value(&self, index: usize) -> Result<Option<&str>, HandlerError> {
        match self.slot(index)? {
            Argument::Value(value) => Ok(value.as_deref()),
            other => Err(mismatch(index, "value", other)),
        }
    }

    fn slot(&self, index: usize) -> Result<&Argument, HandlerError> {
        self.slots.get(index).ok_or(HandlerError::MissingArgument {
            index,
            len: self.slots.len(),
        })
    }
}

impl fmt::Debug for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("path", &self.request.path())
            .field("slots", &self.slots)
            .finish()
    }
}

fn mismatch(index: usize, expected: &'static str, found: &Argument) -> HandlerError {
    HandlerError::ArgumentMismatch {
        index,
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_accessors_follow_slot_kinds() {
        let req = HttpRequest::new(Method::GET, "/a");
        let mut resp = HttpResponse::new();
        let mut args = Arguments::new(
            &req,
            &mut resp,
            vec![
                Argument::Request,
                Argument::Response,
                Argument::Value(Some("ty".into())),
                Argument::Value(None),
            ],
        );

        assert_eq!(args.request(0).unwrap().path(), "/a");
        args.response(1).unwrap().write("ok");
        assert_eq!(args.value(2).unwrap(), "ty");
        assert_eq!(args.value(3).unwrap(), "");
        assert_eq!(args.optional_value(3).unwrap(), None);
        drop(args);
        assert_eq!(resp.body_text(), "ok");
    }

    #[test]
    fn test_wrong_kind_is_mismatch() {
        let req = HttpRequest::new(Method::GET, "/a");
        let mut resp = HttpResponse::new();
        let mut args = Arguments::new(&req, &mut resp, vec![Argument::Value(None)]);

        assert!(matches!(
            args.request(0),
            Err(HandlerError::ArgumentMismatch { index: 0, expected: "request", found: "value" })
        ));
        assert!(matches!(args.response(0), Err(HandlerError::ArgumentMismatch { .. })));
        assert!(matches!(
            args.value(4),
            Err(HandlerError::MissingArgument { index: 4, len: 1 })
        ));
    }
}
