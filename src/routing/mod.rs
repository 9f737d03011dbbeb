//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route::new(method, path, name, handler)
//!     → route.rs (validate definition)
//!     → table.rs (append, registration order)
//!     → snapshot taken when the listener is built
//!     → effective routes (last duplicate wins) installed in the axum router
//! ```
//!
//! # Design Decisions
//! - URL matching itself is delegated to axum
//! - Routes are immutable once registered
//! - The table never shrinks at runtime

pub mod route;
pub mod table;

pub use route::{Route, RouteError, RouteHandler};
pub use table::Routes;
