//! Route definitions.
//!
//! # Responsibilities
//! - Describe one dispatchable endpoint: method, path pattern, name, handler
//! - Validate the definition before it enters a route table
//!
//! # Design Decisions
//! - Methods are normalized to upper case (`get` and `GET` are the same route)
//! - Path patterns use the router's capture syntax: `/users/{id}`, `/files/{*rest}`
//! - A handler is always present; the type system rules out a missing one

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::MethodFilter;

use crate::http::{ActionResult, HttpRequest, HttpResponse};

/// Handler bound to a route.
pub type RouteHandler =
    Arc<dyn Fn(&HttpRequest, &mut HttpResponse) -> Box<dyn ActionResult> + Send + Sync>;

/// Error type for route validation and registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route {name:?} has an empty method")]
    EmptyMethod { name: String },

    #[error("route {name:?} has an empty path")]
    EmptyPath { name: String },

    #[error("route {name:?} uses unsupported method {method:?}")]
    UnsupportedMethod { name: String, method: String },

    #[error("route {name:?} path {path:?} must start with '/'")]
    RelativePath { name: String, path: String },

    #[error("route {name:?} path segment {segment:?} uses legacy capture syntax, use {{name}} instead")]
    LegacyCapture { name: String, segment: String },

    #[error("route {name:?} registered after the listener started")]
    ListenerStarted { name: String },
}

/// A named (method, path) pair bound to a handler.
#[derive(Clone)]
pub struct Route {
    method: String,
    path: String,
    name: String,
    handler: RouteHandler,
}

impl Route {
    /// Create a new route. The method is normalized to upper case.
    pub fn new<F, R>(
        method: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> R + Send + Sync + 'static,
        R: ActionResult + 'static,
    {
        let handler: RouteHandler = Arc::new(move |req: &HttpRequest, res: &mut HttpResponse| {
            Box::new(handler(req, res)) as Box<dyn ActionResult>
        });
        Self::from_handler(method, path, name, handler)
    }

    /// Create a route from an already type-erased handler.
    pub fn from_handler(
        method: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
        handler: RouteHandler,
    ) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            name: name.into(),
            handler,
        }
    }

    pub fn get<F, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> R + Send + Sync + 'static,
        R: ActionResult + 'static,
    {
        Self::new("GET", path, name, handler)
    }

    pub fn post<F, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> R + Send + Sync + 'static,
        R: ActionResult + 'static,
    {
        Self::new("POST", path, name, handler)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the bound handler.
    pub fn call(&self, request: &HttpRequest, response: &mut HttpResponse) -> Box<dyn ActionResult> {
        (self.handler)(request, response)
    }

    /// Check that the route can be installed in a router.
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.method.is_empty() {
            return Err(RouteError::EmptyMethod { name: self.name.clone() });
        }
        if self.path.is_empty() {
            return Err(RouteError::EmptyPath { name: self.name.clone() });
        }
        self.method_filter()?;
        if !self.path.starts_with('/') {
            return Err(RouteError::RelativePath {
                name: self.name.clone(),
                path: self.path.clone(),
            });
        }
        if let Some(segment) = self
            .path
            .split('/')
            .find(|s| s.starts_with(':') || s.starts_with('*'))
        {
            return Err(RouteError::LegacyCapture {
                name: self.name.clone(),
                segment: segment.to_string(),
            });
        }
        Ok(())
    }

    /// The router method filter for this route's verb.
    pub fn method_filter(&self) -> Result<MethodFilter, RouteError> {
        let unsupported = || RouteError::UnsupportedMethod {
            name: self.name.clone(),
            method: self.method.clone(),
        };
        let method = Method::from_bytes(self.method.as_bytes()).map_err(|_| unsupported())?;
        MethodFilter::try_from(method).map_err(|_| unsupported())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Route {
    /// Routes are equal when they describe the same endpoint with the same handler.
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.path == other.path
            && self.name == other.name
            && Arc::ptr_eq(&self.handler, &other.handler)
    }
}
