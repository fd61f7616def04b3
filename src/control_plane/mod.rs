//! Control plane access.
//!
//! # Data Flow
//! ```text
//! CatalogStore / TenantIndex / EntryRuleCache / ActivityCache
//!     → client.rs (build request, decode `{data: ...}` envelope)
//!     → transport.rs (Transport trait; HttpTransport over reqwest)
//!     → control plane HTTP API
//! ```
//!
//! # Design Decisions
//! - Transport failures and malformed JSON both surface as
//!   `ControlPlaneError`; callers log and degrade, never propagate
//! - Missing `data` is not an error: it decodes to `None`/empty

pub mod client;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::{ControlPlaneClient, Endpoints};
pub use scripted::ScriptedTransport;
pub use transport::{FetchRequest, HttpTransport, Transport};
pub use types::{ActivityDefinition, ControlPlaneError, ControlPlaneResult, TenantConfigEntry};
