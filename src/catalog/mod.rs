//! Route catalog and tenant index.
//!
//! # Data Flow
//! ```text
//! Control plane (periodic refresh)
//!     → store.rs (app → method → templates, generation-tagged)
//!     → tenant.rs (app → tenant#env)
//!
//! Lookups:
//!     CatalogStore::matcher_for(app) → RouteMatcher (cached per generation)
//!     TenantIndex::get_tenant_config(app) → TenantBinding
//! ```
//!
//! # Design Decisions
//! - Both tables are published through `ArcSwap`; lookups never take a lock
//! - A failed refresh leaves the previous snapshot in place

pub mod store;
pub mod tenant;

pub use store::{AppRoutes, CatalogRefresh, CatalogSnapshot, CatalogStore};
pub use tenant::{TenantBinding, TenantIndex, TenantRefresh};
