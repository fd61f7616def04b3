//! Route template matching.
//!
//! # Data Flow
//! ```text
//! Raw path (already normalized)
//!     → template.rs (split into segments, compare per template)
//!     → matcher.rs (exact short-circuit, method bucket, best match)
//!     → Return: Exact, Matched(template) or NoMatch
//! ```
//!
//! # Design Decisions
//! - Templates are parsed once per catalog generation, never per lookup
//! - No regex: a segment is either a literal or a whole `{variable}`
//! - Deterministic: fewer variables wins, then later variables win, then
//!   registration order

pub mod matcher;
pub mod template;

pub use matcher::{resolve_against, Resolution, RouteMatcher};
pub use template::{best_match, RequestPath, Template};
