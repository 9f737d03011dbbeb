//! Minimal HTTP routing facade built on axum.
//!
//! Register named routes, start a listener, and let handlers return action
//! results that write themselves to the response.
//!
//! ```no_run
//! use forest::{context, http_status, json_result, raw_result, Route};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = context();
//! ctx.initialise();
//! ctx.register(Route::get("/ping", "ping", |_, _| raw_result("pong", http_status(200))))?;
//! ctx.register(Route::get("/data", "data", |_, _| {
//!     json_result(&serde_json::json!({ "a": 1 }), http_status(200))
//! }))?;
//! ctx.listen_and_serve("127.0.0.1:8080").await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use app::{context, AppContext, LifecycleState, ServeError, ServerHandle};
pub use config::ForestConfig;
pub use http::{
    http_status, json_result, raw_result, ActionResult, BufferedResult, HttpRequest,
    HttpResponse, HttpStatus, RawResult, RedirectResult, StatusResult,
};
pub use lifecycle::Shutdown;
pub use routing::{Route, RouteError, Routes};
