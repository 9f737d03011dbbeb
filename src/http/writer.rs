//! Transport-level response sink.
//!
//! # Responsibilities
//! - Hold pending headers until the status line is written
//! - Commit the status line exactly once
//! - Accumulate the body
//! - Convert into an axum `Response` once the handler has finished
//!
//! # Design Decisions
//! - Header writes after the status line are ignored (logged), like a wire writer
//! - Writing the body first implicitly commits 200
//! - The raw status is kept even if HTTP cannot carry it; conversion substitutes 500

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Buffered response sink handed to the dispatcher for each request.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    headers: Vec<(String, String)>,
    status: Option<u16>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any previous value stored under the exact same key.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.status.is_some() {
            tracing::warn!(header = %name, "Header written after status line, ignoring");
            return;
        }
        upsert_header(&mut self.headers, name, value.into());
    }

    /// Look up a pending or committed header by exact key.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// All headers in the order they were first set.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Commit the status line. Only the first call has any effect.
    pub fn write_header(&mut self, code: u16) {
        if let Some(existing) = self.status {
            tracing::warn!(existing, attempted = code, "Superfluous status write, ignoring");
            return;
        }
        self.status = Some(code);
    }

    /// Append to the body, committing 200 if no status was written yet.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        if self.status.is_none() {
            self.write_header(200);
        }
        self.body.extend_from_slice(bytes);
        bytes.len()
    }

    /// The committed status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }
}

/// Replace the value stored under `name`, or append a new entry.
pub(crate) fn upsert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(k, _)| *k == name) {
        Some(entry) => entry.1 = value,
        None => headers.push((name, value)),
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let code = self.status.unwrap_or(200);
        let status = StatusCode::from_u16(code).unwrap_or_else(|_| {
            tracing::error!(status = code, "Status code cannot be sent over HTTP, answering 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        // Names differing only in case collapse to one header; the later entry wins.
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }

        response
    }
}
