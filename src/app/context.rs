//! Application context: route table plus listener lifecycle.
//!
//! # Lifecycle
//! ```text
//! Uninitialised ──initialise()──▶ Initialised ──serve()/spawn()──▶ Serving
//!                                   ▲      │
//!                                   └──────┘ initialise() resets the table
//! ```
//!
//! # Design Decisions
//! - Registration appends through an arc-swap RCU, so concurrent registrations
//!   never lose updates
//! - Starting the listener takes the state lock exclusively: a registration
//!   either lands in the snapshot or is rejected, never silently dropped
//! - No transition out of Serving

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use arc_swap::ArcSwap;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::app::server::{self, ServeError};
use crate::config::ForestConfig;
use crate::lifecycle::Shutdown;
use crate::observability::logging;
use crate::routing::{Route, RouteError, Routes};

/// Where a context is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialised,
    Initialised,
    Serving,
}

/// Holds the route table and starts the listener.
pub struct AppContext {
    state: RwLock<LifecycleState>,
    routes: ArcSwap<Routes>,
    config: ArcSwap<ForestConfig>,
}

static CONTEXT: OnceLock<AppContext> = OnceLock::new();

/// The process-wide context, created on first access.
pub fn context() -> &'static AppContext {
    CONTEXT.get_or_init(AppContext::new)
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LifecycleState::Uninitialised),
            routes: ArcSwap::from_pointee(Routes::new()),
            config: ArcSwap::from_pointee(ForestConfig::default()),
        }
    }

    /// Reset the route table and install baseline logging with default settings.
    pub fn initialise(&self) {
        self.initialise_with(ForestConfig::default());
    }

    /// Reset the route table, adopt `config` and install logging from it.
    ///
    /// Has no effect once the listener is running.
    pub fn initialise_with(&self, config: ForestConfig) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state == LifecycleState::Serving {
            tracing::warn!("initialise called while serving, ignoring");
            return;
        }

        logging::init_logging(&config.observability);
        self.routes.store(Arc::new(Routes::new()));
        self.config.store(Arc::new(config));
        *state = LifecycleState::Initialised;
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active configuration.
    pub fn config(&self) -> Arc<ForestConfig> {
        self.config.load_full()
    }

    /// Snapshot of the registered routes.
    pub fn routes(&self) -> Arc<Routes> {
        self.routes.load_full()
    }

    /// Validate and append a route.
    pub fn register(&self, route: Route) -> Result<(), RouteError> {
        route.validate()?;

        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if *state == LifecycleState::Serving {
            return Err(RouteError::ListenerStarted {
                name: route.name().to_string(),
            });
        }

        tracing::debug!(
            method = %route.method(),
            path = %route.path(),
            name = %route.name(),
            "Route registered"
        );
        self.routes.rcu(|routes| {
            let mut next = Routes::clone(routes);
            next.push(route.clone());
            next
        });
        Ok(())
    }

    /// Register several routes, stopping at the first invalid one.
    pub fn register_all<I>(&self, routes: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = Route>,
    {
        routes.into_iter().try_for_each(|route| self.register(route))
    }

    /// Build a router from the current table without starting a listener.
    pub fn router(&self) -> Result<Router, ServeError> {
        server::build_router(&self.routes(), &self.config())
    }

    /// Freeze the table and build the router the listener will serve.
    fn start(&self) -> Result<Router, ServeError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state == LifecycleState::Serving {
            return Err(ServeError::AlreadyServing);
        }

        let routes = self.routes();
        let router = server::build_router(&routes, &self.config())?;
        *state = LifecycleState::Serving;

        tracing::info!(routes = routes.len(), "Route table frozen");
        Ok(router)
    }

    /// Bind `address` and serve until Ctrl+C.
    pub async fn listen_and_serve(&self, address: &str) -> Result<(), ServeError> {
        let listener = server::bind(address).await?;
        self.serve(listener, server::ctrl_c()).await
    }

    /// Serve on a bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServeError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.start()?;
        server::run(listener, router, shutdown).await
    }

    /// Serve on a bound listener from a background task.
    ///
    /// The task stops when `shutdown` fires. If the listener fails, the error
    /// is logged, `shutdown` is triggered for the rest of the process, and
    /// the error is returned from [`ServerHandle::join`].
    pub fn spawn(&self, listener: TcpListener, shutdown: &Shutdown) -> Result<ServerHandle, ServeError> {
        let local_addr = listener.local_addr()?;
        let router = self.start()?;

        let signal = shutdown.signalled();
        let supervisor = shutdown.clone();
        let task = tokio::spawn(async move {
            let result = server::run(listener, router, signal).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Listener failed, triggering shutdown");
                supervisor.trigger();
            }
            result
        });

        Ok(ServerHandle { local_addr, task })
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("state", &self.state())
            .field("routes", &self.routes().len())
            .finish()
    }
}

/// Handle to a listener running on a background task.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: std::net::SocketAddr,
    task: JoinHandle<Result<(), ServeError>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Wait for the listener task to finish.
    pub async fn join(self) -> Result<(), ServeError> {
        self.task
            .await
            .map_err(|e| ServeError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{http_status, RawResult};

    fn route(path: &str) -> Route {
        Route::get(path, path, |_, _| RawResult::new("", http_status(200)))
    }

    #[test]
    fn starts_uninitialised() {
        let ctx = AppContext::new();
        assert_eq!(ctx.state(), LifecycleState::Uninitialised);
        assert!(ctx.routes().is_empty());
    }

    #[test]
    fn initialise_resets_routes() {
        let ctx = AppContext::new();
        ctx.initialise();
        ctx.register(route("/a")).unwrap();
        assert_eq!(ctx.routes().len(), 1);

        ctx.initialise();
        assert_eq!(ctx.state(), LifecycleState::Initialised);
        assert!(ctx.routes().is_empty());
    }

    #[test]
    fn rejects_invalid_routes() {
        let ctx = AppContext::new();
        let err = ctx.register(route("relative")).unwrap_err();
        assert!(matches!(err, RouteError::RelativePath { .. }));
        assert!(ctx.routes().is_empty());
    }

    #[test]
    fn snapshots_are_stable() {
        let ctx = AppContext::new();
        ctx.register(route("/a")).unwrap();
        let snapshot = ctx.routes();
        ctx.register(route("/b")).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(ctx.routes().len(), 2);
    }

    #[test]
    fn concurrent_registration_loses_nothing() {
        let ctx = Arc::new(AppContext::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ctx = ctx.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        ctx.register(route(&format!("/t{t}/r{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let routes = ctx.routes();
        assert_eq!(routes.len(), 200);
        for t in 0..8 {
            let order: Vec<_> = routes
                .iter()
                .filter(|r| r.path().starts_with(&format!("/t{t}/")))
                .map(|r| r.path().to_string())
                .collect();
            let expected: Vec<_> = (0..25).map(|i| format!("/t{t}/r{i}")).collect();
            assert_eq!(order, expected);
        }
    }

    #[tokio::test]
    async fn registration_after_start_is_rejected() {
        let ctx = AppContext::new();
        ctx.register(route("/a")).unwrap();

        let shutdown = Shutdown::new();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let handle = ctx.spawn(listener, &shutdown).unwrap();
        assert_eq!(ctx.state(), LifecycleState::Serving);

        let err = ctx.register(route("/b")).unwrap_err();
        assert_eq!(err, RouteError::ListenerStarted { name: "/b".into() });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        assert!(matches!(
            ctx.spawn(listener, &shutdown),
            Err(ServeError::AlreadyServing)
        ));

        shutdown.trigger();
        handle.join().await.unwrap();
    }

    #[test]
    fn global_context_is_a_singleton() {
        let a = context() as *const AppContext;
        let b = std::thread::spawn(|| context() as *const AppContext as usize)
            .join()
            .unwrap();
        assert_eq!(a as usize, b);
    }
}
