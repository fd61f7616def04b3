//! Route normalization and matching engine.
//!
//! Turns concrete request paths (`/user/123`) into the canonical route
//! templates (`/user/{id}`) they were served by, using route catalogs, tenant
//! bindings, entry rules and business activities fetched from a control plane.

pub mod admin;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod control_plane;
pub mod lifecycle;
pub mod normalize;
pub mod observability;
pub mod routing;
pub mod service;

pub use config::schema::ServiceConfig;
pub use lifecycle::Shutdown;
pub use normalize::{normalize_origin, normalize_path};
pub use service::RouteService;
