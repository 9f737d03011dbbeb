//! Shared utilities for integration testing.

use axum::body::Body;
use axum::http::{Request, Response};
use forest::{AppContext, ForestConfig, Route, ServerHandle, Shutdown};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A context with `routes` registered.
pub fn context_with(routes: Vec<Route>) -> AppContext {
    let ctx = AppContext::new();
    ctx.register_all(routes).unwrap();
    ctx
}

/// A context initialised with `config`, with `routes` registered.
#[allow(dead_code)]
pub fn context_with_config(config: ForestConfig, routes: Vec<Route>) -> AppContext {
    let ctx = AppContext::new();
    ctx.initialise_with(config);
    ctx.register_all(routes).unwrap();
    ctx
}

/// Start `ctx` on an ephemeral port. Returns the handle, its shutdown and base URL.
#[allow(dead_code)]
pub async fn start(ctx: &AppContext) -> (ServerHandle, Shutdown, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    let handle = ctx.spawn(listener, &shutdown).unwrap();
    let base = format!("http://{}", handle.local_addr());
    (handle, shutdown, base)
}

/// Send one request through the context's router without a socket.
#[allow(dead_code)]
pub async fn send(ctx: &AppContext, method: &str, uri: &str, body: &str) -> (Response<Body>, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = ctx.router().unwrap().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (
        Response::from_parts(parts, Body::empty()),
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}
