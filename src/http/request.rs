//! Request abstraction handed to the dispatcher.
//!
//! # Responsibilities
//! - Carry the raw request path and the deployment context path
//! - Expose query and form parameters as an ordered multi-map
//! - Keep headers and body available to handlers that ask for the request
//!
//! # Design Decisions
//! - Built once by the transport, never mutated by the dispatcher
//! - Parameters from the query string come first, form body values are appended
//! - Percent-decoding follows `application/x-www-form-urlencoded` rules

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};

/// Ordered multi-map of request parameters (key → every value seen, in order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ParamMap {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string or urlencoded form body.
    pub fn parse(input: &[u8]) -> Self {
        let mut map = Self::new();
        map.extend_from_urlencoded(input);
        map
    }

    /// Append every pair of a urlencoded payload.
    pub fn extend_from_urlencoded(&mut self, input: &[u8]) {
        for (key, value) in url::form_urlencoded::parse(input) {
            self.append(key.into_owned(), value.into_owned());
        }
    }

    /// Append a single value under `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// All values for `key`, or `None` if the key never appeared.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Iterate keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An inbound HTTP request as seen by controllers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    context_path: String,
    params: ParamMap,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpRequest {
    /// Create a request for `path` with no context path, parameters or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            context_path: String::new(),
            params: ParamMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build a request from transport parts.
    ///
    /// The query string is always parsed; the body contributes parameters only
    /// for urlencoded POST requests.
    pub fn from_parts(
        parts: &axum::http::request::Parts,
        body: Bytes,
        context_path: impl Into<String>,
    ) -> Self {
        let mut params = ParamMap::new();
        if let Some(query) = parts.uri.query() {
            params.extend_from_urlencoded(query.as_bytes());
        }
        if parts.method == Method::POST && is_form_encoded(&parts.headers) {
            params.extend_from_urlencoded(&body);
        }

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            context_path: context_path.into(),
            params,
            headers: parts.headers.clone(),
            body,
        }
    }

    /// Set the deployment context path (e.g. `/app`).
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Append the pairs of a query string (without the leading `?`).
    pub fn with_query(mut self, query: &str) -> Self {
        self.params.extend_from_urlencoded(query.as_bytes());
        self
    }

    /// Attach a urlencoded form body; its pairs join the parameter map.
    pub fn with_form_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.params.extend_from_urlencoded(&body);
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw request path including the context path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// First value of a request parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}
