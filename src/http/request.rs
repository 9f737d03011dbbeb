//! Request wrapper handed to route handlers.
//!
//! # Responsibilities
//! - Carry the transport-level request (head and buffered body) by value
//! - Expose the route that matched, for logging and introspection
//! - Expose path captures and the request ID assigned by the middleware
//!
//! # Design Decisions
//! - Read-only from the handler's point of view
//! - The body is passed through untouched; no parsing happens here

use axum::body::Bytes;
use axum::http::{request::Parts, HeaderMap, Method, Request, Uri};

use crate::routing::Route;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A matched incoming request.
#[derive(Debug)]
pub struct HttpRequest {
    parts: Parts,
    body: Bytes,
    route: Route,
    params: Vec<(String, String)>,
}

impl HttpRequest {
    /// Wrap a transport request that matched `route`.
    pub fn new(request: Request<Bytes>, route: Route) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body,
            route,
            params: Vec::new(),
        }
    }

    /// Attach the path captures extracted by the router.
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// The route that matched this request.
    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The correlation ID set by the request-id middleware.
    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// Path captures in pattern order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// A single path capture by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
