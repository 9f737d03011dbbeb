//! Response wrapper handed to route handlers.
//!
//! # Responsibilities
//! - Buffer headers and a deferred status code set by the handler
//! - Own the transport sink the action result writes into
//! - Keep the reported status in line with what reached the sink
//!
//! # Design Decisions
//! - Buffered state is never flushed implicitly; a result that serves it
//!   (`BufferedResult`) must be returned for it to reach the wire
//! - Status 0 means "not set yet"

use crate::http::status::HttpStatus;
use crate::http::writer::{find_header, upsert_header, ResponseWriter};

/// Per-request response envelope.
#[derive(Debug, Default)]
pub struct HttpResponse {
    writer: ResponseWriter,
    headers: Vec<(String, String)>,
    status_code: u16,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a redirect: status 302 plus a `location` header.
    pub fn redirect_to(&mut self, location: impl Into<String>) {
        self.status_code = 302;
        upsert_header(&mut self.headers, "location".to_string(), location.into());
    }

    /// Buffer a status code.
    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = status_code;
    }

    /// The buffered status, or the committed one once a result has served.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Buffer a header. Keys are case-sensitive as given.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        upsert_header(&mut self.headers, name.into(), value.into());
    }

    /// A buffered header by exact key.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Buffered headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Write a header straight to the sink.
    pub fn write_sink_header(&mut self, name: &str, value: &str) {
        self.writer.set_header(name, value);
    }

    /// Commit the status line to the sink.
    pub fn write_header(&mut self, status: HttpStatus) {
        self.writer.write_header(status.code());
        if let Some(committed) = self.writer.status() {
            self.status_code = committed;
        }
    }

    /// Append to the body on the sink.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let written = self.writer.write(bytes);
        if let Some(committed) = self.writer.status() {
            self.status_code = committed;
        }
        written
    }

    /// Flush buffered headers and status to the sink. An unset status commits 200.
    pub fn commit_buffered(&mut self) {
        for (name, value) in &self.headers {
            self.writer.set_header(name.as_str(), value.as_str());
        }
        let status = match self.status_code {
            0 => HttpStatus::OK,
            code => HttpStatus::new(code),
        };
        self.write_header(status);
    }

    /// The transport sink.
    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    pub fn into_writer(self) -> ResponseWriter {
        self.writer
    }
}
