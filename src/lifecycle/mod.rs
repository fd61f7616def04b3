//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! RouteService::start
//!     → refresh.rs (catalog loop, tenant loop)
//!
//! Shutdown (shutdown.rs):
//!     ctrl-c → Shutdown::trigger → loops and admin server exit
//! ```
//!
//! # Design Decisions
//! - One independent ticker per refresh target
//! - First refresh runs at startup, not after one period

pub mod refresh;
pub mod shutdown;

pub use refresh::{RefreshLoop, RefreshTarget};
pub use shutdown::Shutdown;
