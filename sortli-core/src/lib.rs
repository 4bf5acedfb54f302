//! Core types and service wiring for the sortli waste tracker.

/// Carbon impact formulas and footprint summaries.
pub mod carbon;
/// Static per-category configuration.
pub mod catalog;
/// Recycling center distance math and ranking.
pub mod centers;
/// Label scoring, fallback policy, and the classifier.
pub mod classify;
/// Settings loaded from TOML and the environment.
pub mod config;
/// Domain models shared by all crates.
pub mod model;
/// Bundle of optional external backends.
pub mod plugin;
/// Traits describing the external service interfaces.
pub mod ports;
/// Points, levels, and badges.
pub mod rewards;
/// High-level service facade used by clients.
pub mod service;
/// Profile persistence.
pub mod store;

pub use carbon::*;
pub use catalog::*;
pub use classify::*;
pub use config::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use rewards::*;
pub use service::*;
pub use store::*;
