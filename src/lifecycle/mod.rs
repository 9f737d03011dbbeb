//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → initialise context → register routes → start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received or listener failed → stop accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
