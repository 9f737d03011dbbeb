//! Dispatcher adapter between axum and route handlers.
//!
//! # Responsibilities
//! - Turn one axum invocation into `HttpRequest` / `HttpResponse` wrappers
//! - Call the matched handler exactly once
//! - Serve the returned action result exactly once
//! - Hand the filled sink back to axum as a `Response`
//!
//! # Design Decisions
//! - Handlers cannot fail; failures are results with an error status
//! - Request bodies are buffered up to the configured limit; larger ones get 413
//! - Buffered response state the result did not commit is logged, not flushed

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::RawPathParamsRejection, FromRequestParts, RawPathParams},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;

use crate::http::{HttpRequest, HttpResponse, ResponseWriter};
use crate::routing::Route;

/// Run `route`'s handler against a buffered request and serve its result.
pub fn dispatch(
    route: &Route,
    request: Request<Bytes>,
    params: Vec<(String, String)>,
) -> ResponseWriter {
    let request = HttpRequest::new(request, route.clone()).with_params(params);
    let mut response = HttpResponse::new();

    let result = route.call(&request, &mut response);

    let buffered = response.status_code();
    result.serve(&request, &mut response);

    if buffered != 0 && response.writer().status() != Some(buffered) {
        tracing::warn!(
            route = %route.name(),
            buffered,
            served = ?response.writer().status(),
            "Buffered status was not served by the handler's result"
        );
    }

    tracing::debug!(
        route = %route.name(),
        method = %request.method(),
        path = %request.path(),
        request_id = request.request_id().unwrap_or("unknown"),
        status = response.status_code(),
        "Request dispatched"
    );

    response.into_writer()
}

/// axum entry point for a matched route.
pub async fn handle(route: Arc<Route>, max_body_size: usize, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        Err(RawPathParamsRejection::MissingPathParams(_)) => Vec::new(),
        Err(e) => {
            tracing::debug!(route = %route.name(), error = %e, "Rejected path parameters");
            return (StatusCode::BAD_REQUEST, "400 Bad Request").into_response();
        }
    };

    let body = match axum::body::to_bytes(body, max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(route = %route.name(), limit = max_body_size, "Request body too large");
            return (StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large").into_response();
        }
        Err(e) => {
            tracing::warn!(route = %route.name(), error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "400 Bad Request").into_response();
        }
    };

    dispatch(&route, Request::from_parts(parts, body), params).into_response()
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Default responder for requests no route matched.
pub async fn not_found() -> Response {
    let mut response = Response::new(Body::from("404 Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
