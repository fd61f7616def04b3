//! On-demand caches for tenant-scoped rules and business activities.
//!
//! # Design Decisions
//! - Expire-after-write with a capacity bound, over `DashMap`
//! - Time comes from an injected [`Clock`](crate::clock::Clock)
//! - Concurrent misses on one key may fetch twice; the last write wins

pub mod activities;
pub mod entry_rules;
pub mod ttl;

pub use activities::{ActivityCache, ActivityMatch, ActivityRule};
pub use entry_rules::{EntryRuleCache, RuleKey};
pub use ttl::TtlCache;
