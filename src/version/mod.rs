//! Version discovery and comparison
//!
//! This module fetches, caches, orders and range-matches artifact versions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│    Cache    │◀────│   Source    │
//! │   (HTTP)    │     │  (on disk)  │     │ (n newest)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Constraint  │                         │ Registries  │
//! │ (ranges)    │                         │(nexus, gh)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: URL-keyed on-disk cache with freshness window
//! - [`constraint`]: Range expressions such as `>= 3.1.0 < 6.0.0`
//! - [`fetcher`]: Network access trait and its reqwest implementation
//! - [`registries`]: Nexus metadata and GitHub tag URL layouts and parsers
//! - [`source`]: Cached version lists for components
//! - [`error`]: Error types for cache, registry and constraint operations
//! - [`semver`]: Lenient version parsing and ordering
//! - [`types`]: Common types like `TagVersion`

pub mod cache;
pub mod constraint;
pub mod error;
pub mod fetcher;
pub mod registries;
pub mod semver;
pub mod source;
pub mod types;
