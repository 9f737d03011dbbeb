//! Action results: values that know how to write themselves to the wire.
//!
//! Every result writes in the same order: headers, then the status line,
//! then the body. The dispatcher serves a result exactly once.

use serde::Serialize;

use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;
use crate::http::writer::{find_header, upsert_header};

/// Content type set by [`json_result`].
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

const PLAIN_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// A value that can serve itself onto a response.
pub trait ActionResult: Send {
    /// Write headers, status and body to the response sink.
    fn serve(&self, request: &HttpRequest, response: &mut HttpResponse);
}

impl<T: ActionResult + ?Sized> ActionResult for Box<T> {
    fn serve(&self, request: &HttpRequest, response: &mut HttpResponse) {
        (**self).serve(request, response)
    }
}

/// A status, a string body and a set of headers.
///
/// Headers are served in insertion order. Setting an existing key again
/// replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub status: HttpStatus,
    pub content: String,
    pub headers: Vec<(String, String)>,
}

impl RawResult {
    /// A result with no headers.
    pub fn new(content: impl Into<String>, status: HttpStatus) -> Self {
        Self {
            status,
            content: content.into(),
            headers: Vec::new(),
        }
    }

    /// Serialize `payload` as JSON.
    ///
    /// If serialization fails the result is a 500 with a plain-text
    /// diagnostic rather than an empty body under the requested status.
    pub fn json<T: Serialize + ?Sized>(payload: &T, status: HttpStatus) -> Self {
        match serde_json::to_string(payload) {
            Ok(content) => Self::new(content, status).with_header("Content-Type", JSON_CONTENT_TYPE),
            Err(e) => {
                tracing::error!(error = %e, requested_status = %status, "JSON serialization failed");
                Self::new(
                    format!("500 Internal Server Error: {e}"),
                    HttpStatus::INTERNAL_SERVER_ERROR,
                )
                .with_header("Content-Type", PLAIN_CONTENT_TYPE)
            }
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Look up a header by exact key.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn boxed(self) -> Box<dyn ActionResult> {
        Box::new(self)
    }
}

impl ActionResult for RawResult {
    fn serve(&self, _request: &HttpRequest, response: &mut HttpResponse) {
        for (name, value) in &self.headers {
            response.write_sink_header(name, value);
        }
        response.write_header(self.status);
        response.write(self.content.as_bytes());
    }
}

/// Shorthand for [`RawResult::new`].
pub fn raw_result(content: impl Into<String>, status: HttpStatus) -> RawResult {
    RawResult::new(content, status)
}

/// Shorthand for [`RawResult::json`].
pub fn json_result<T: Serialize + ?Sized>(payload: &T, status: HttpStatus) -> RawResult {
    RawResult::json(payload, status)
}

/// Redirect to another location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResult {
    pub location: String,
    pub status: HttpStatus,
}

impl RedirectResult {
    /// A 302 redirect.
    pub fn new(location: impl Into<String>) -> Self {
        Self::with_status(location, HttpStatus::FOUND)
    }

    /// A redirect with an explicit status (301, 303, 307, 308...).
    pub fn with_status(location: impl Into<String>, status: HttpStatus) -> Self {
        Self {
            location: location.into(),
            status,
        }
    }

    pub fn boxed(self) -> Box<dyn ActionResult> {
        Box::new(self)
    }
}

impl ActionResult for RedirectResult {
    fn serve(&self, _request: &HttpRequest, response: &mut HttpResponse) {
        response.write_sink_header("location", &self.location);
        response.write_header(self.status);
    }
}

/// A bare status with an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResult {
    pub status: HttpStatus,
}

impl StatusResult {
    pub fn new(status: HttpStatus) -> Self {
        Self { status }
    }

    pub fn boxed(self) -> Box<dyn ActionResult> {
        Box::new(self)
    }
}

impl ActionResult for StatusResult {
    fn serve(&self, _request: &HttpRequest, response: &mut HttpResponse) {
        response.write_header(self.status);
    }
}

/// Serves whatever the handler buffered on the response wrapper
/// (`redirect_to`, `set_status_code`, `set_header`), followed by `content`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedResult {
    pub content: String,
}

impl BufferedResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn boxed(self) -> Box<dyn ActionResult> {
        Box::new(self)
    }
}

impl ActionResult for BufferedResult {
    fn serve(&self, _request: &HttpRequest, response: &mut HttpResponse) {
        response.commit_buffered();
        response.write(self.content.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::body::Bytes;
    use axum::http::Request;

    use super::*;
    use crate::http::status::http_status;
    use crate::routing::Route;

    fn request() -> HttpRequest {
        let route = Route::get("/", "root", |_, _| StatusResult::new(HttpStatus::OK));
        HttpRequest::new(Request::new(Bytes::new()), route)
    }

    fn serve(result: &dyn ActionResult) -> HttpResponse {
        let mut response = HttpResponse::new();
        result.serve(&request(), &mut response);
        response
    }

    #[test]
    fn raw_result_writes_status_headers_body() {
        let result = raw_result("pong", http_status(200)).with_header("X-Kind", "raw");
        let response = serve(&result);

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.writer().status(), Some(200));
        assert_eq!(response.writer().headers(), &[("X-Kind".to_string(), "raw".to_string())]);
        assert_eq!(response.writer().body(), b"pong");
    }

    #[test]
    fn status_is_not_clamped() {
        let response = serve(&raw_result("", http_status(999)));
        assert_eq!(response.status_code(), 999);
    }

    #[test]
    fn json_result_serializes_payload() {
        let mut payload = BTreeMap::new();
        payload.insert("a", 1);
        let result = json_result(&payload, http_status(200));

        assert_eq!(result.content, r#"{"a":1}"#);
        assert_eq!(
            result.header("Content-Type"),
            Some(JSON_CONTENT_TYPE)
        );

        let response = serve(&result);
        assert_eq!(response.writer().header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(response.writer().body(), br#"{"a":1}"#);
    }

    #[test]
    fn json_content_type_can_be_overridden_after_construction() {
        let result = json_result(&[1, 2], http_status(200))
            .with_header("Content-Type", "application/vnd.custom+json");
        let response = serve(&result);
        assert_eq!(
            response.writer().header("Content-Type"),
            Some("application/vnd.custom+json")
        );
    }

    #[test]
    fn json_serialization_failure_is_a_500() {
        let mut payload = BTreeMap::new();
        payload.insert(vec![1u8], 1);
        let result = json_result(&payload, http_status(200));

        assert_eq!(result.status, HttpStatus::INTERNAL_SERVER_ERROR);
        assert!(result.content.starts_with("500 Internal Server Error:"));
        assert_eq!(
            result.header("Content-Type"),
            Some("text/plain;charset=utf-8")
        );
    }

    #[test]
    fn headers_keep_insertion_order() {
        let result = raw_result("", http_status(200))
            .with_header("X-A", "upper")
            .with_header("x-a", "lower")
            .with_header("X-B", "b")
            .with_header("X-A", "again");

        let names: Vec<_> = result.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["X-A", "x-a", "X-B"]);
        assert_eq!(result.header("X-A"), Some("again"));

        let response = serve(&result);
        assert_eq!(response.writer().headers(), result.headers.as_slice());
    }

    #[test]
    fn redirect_result_sets_location() {
        let response = serve(&RedirectResult::new("/next"));
        assert_eq!(response.status_code(), 302);
        assert_eq!(response.writer().header("location"), Some("/next"));
        assert!(response.writer().body().is_empty());

        let response = serve(&RedirectResult::with_status("/moved", http_status(301)));
        assert_eq!(response.status_code(), 301);
    }

    #[test]
    fn status_result_has_empty_body() {
        let response = serve(&StatusResult::new(http_status(204)));
        assert_eq!(response.writer().status(), Some(204));
        assert!(response.writer().body().is_empty());
    }

    #[test]
    fn buffered_result_serves_redirect_to() {
        let mut response = HttpResponse::new();
        response.redirect_to("/login");
        response.set_header("X-Reason", "auth");
        BufferedResult::default().serve(&request(), &mut response);

        assert_eq!(response.writer().status(), Some(302));
        assert_eq!(response.writer().header("location"), Some("/login"));
        assert_eq!(response.writer().header("X-Reason"), Some("auth"));
    }

    #[test]
    fn boxed_results_serve_through_the_box() {
        let result: Box<dyn ActionResult> = raw_result("boxed", http_status(202)).boxed();
        let response = serve(&result);
        assert_eq!(response.status_code(), 202);
        assert_eq!(response.writer().body(), b"boxed");
    }
}
