//! HTTP listener setup.
//!
//! # Responsibilities
//! - Build the axum Router from a route snapshot
//! - Install the not-found responder (unknown path or unregistered method)
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run the accept loop until the shutdown future resolves
//!
//! # Design Decisions
//! - Routes sharing a path are merged into one method router
//! - Pattern conflicts are detected up front instead of panicking inside axum
//! - The router is built once; later registrations never reach it

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Request, routing::MethodRouter, Router};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::dispatch;
use crate::config::ForestConfig;
use crate::routing::{Route, RouteError, Routes};

/// Error type for building and running the listener.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("route pattern {path:?} conflicts with an earlier route: {reason}")]
    RouteConflict { path: String, reason: String },

    #[error(transparent)]
    InvalidRoute(#[from] RouteError),

    #[error("the listener has already been started")]
    AlreadyServing,

    #[error("listener task failed: {0}")]
    Task(String),
}

/// Build the axum router for a route snapshot.
#[allow(deprecated)]
pub fn build_router(routes: &Routes, config: &ForestConfig) -> Result<Router, ServeError> {
    let mut paths: Vec<(&str, Vec<&Route>)> = Vec::new();
    for route in routes.effective() {
        match paths.iter_mut().find(|(path, _)| *path == route.path()) {
            Some((_, grouped)) => grouped.push(route),
            None => paths.push((route.path(), vec![route])),
        }
    }

    let max_body_size = config.limits.max_body_size;
    let mut matcher = matchit::Router::new();
    let mut method_routers = Vec::with_capacity(paths.len());
    for (path, grouped) in paths {
        matcher
            .insert(path, ())
            .map_err(|e| ServeError::RouteConflict {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let mut method_router = MethodRouter::new().fallback(dispatch::not_found);
        for route in grouped {
            let filter = route.method_filter()?;
            let shared = Arc::new(route.clone());
            method_router = method_router.on(filter, move |request: Request| {
                dispatch::handle(shared.clone(), max_body_size, request)
            });
            log_route(route);
        }
        method_routers.push((path, method_router));
    }

    let router = method_routers
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(path, method_router)
        })
        .fallback(dispatch::not_found)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    Ok(router)
}

fn log_route(route: &Route) {
    tracing::info!(
        method = %route.method(),
        path = %route.path(),
        name = %route.name(),
        "Route installed"
    );
}

/// Bind a TCP listener, mapping failures to [`ServeError::Bind`].
pub async fn bind(address: &str) -> Result<TcpListener, ServeError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServeError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Run the server, accepting connections until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
