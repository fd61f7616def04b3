//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Refresh failures are logged with endpoint context and counted, never
//!   propagated to lookup callers
//! - Lookup paths log at debug level only

pub mod logging;
pub mod metrics;
