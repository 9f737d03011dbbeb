//! Application subsystem.
//!
//! # Data Flow
//! ```text
//! caller builds Routes
//!     → context.rs (AppContext::register, appended in order)
//!     → context.rs (listen_and_serve / serve / spawn freezes the table)
//!     → server.rs (axum Router from the snapshot + not-found + middleware)
//!     → dispatch.rs (per request: wrappers → handler → ActionResult::serve)
//! ```
//!
//! # Design Decisions
//! - Contexts can be created and threaded explicitly; `context()` is only a
//!   convenience for code that wants a process-wide one
//! - One task per request, scheduled by axum; no shared per-request state

pub mod context;
pub mod dispatch;
pub mod server;

pub use context::{context, AppContext, LifecycleState, ServerHandle};
pub use server::{build_router, ServeError};
