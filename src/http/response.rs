//! Response abstraction written by handlers.
//!
//! # Responsibilities
//! - Buffer the body written by a handler
//! - Track status, headers and the declared character encoding
//! - Convert into an axum response once the handler returns
//!
//! # Design Decisions
//! - Bodies are buffered; nothing reaches the socket while the handler runs
//! - An untouched response is a 200 with an empty body
//! - `content-type: text/plain;charset=<enc>` is added only when an encoding
//!   was declared and no content type was set explicitly

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const UTF_8: &str = "UTF-8";

/// An outbound HTTP response owned by a single dispatch.
#[derive(Debug, Default)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    character_encoding: Option<String>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Declare the character encoding of textual output.
    pub fn set_character_encoding(&mut self, encoding: impl Into<String>) {
        self.character_encoding = Some(encoding.into());
    }

    pub fn character_encoding(&self) -> Option<&str> {
        self.character_encoding.as_deref()
    }

    pub fn set_content_type(&mut self, value: HeaderValue) {
        self.headers.insert(header::CONTENT_TYPE, value);
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append text to the body.
    pub fn write(&mut self, text: &str) {
        self.body.extend_from_slice(text.as_bytes());
    }

    /// Append raw bytes to the body.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True once anything has been written to the body.
    pub fn is_written(&self) -> bool {
        !self.body.is_empty()
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        if !headers.contains_key(header::CONTENT_TYPE) {
            if let Some(encoding) = &self.character_encoding {
                let value = format!("text/plain;charset={}", encoding);
                if let Ok(value) = HeaderValue::from_str(&value) {
                    headers.insert(header::CONTENT_TYPE, value);
                }
            }
        }

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}
