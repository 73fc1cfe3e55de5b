//! Runtime (Java) version selection
//!
//! # Modules
//!
//! - [`rules`]: The dependency rule document, its loader and name aliases
//! - [`resolver`]: Range matching over the rules and the strictness policy

pub mod resolver;
pub mod rules;

pub use resolver::{RuntimeStrictness, determine_runtime_version};
pub use rules::{DependencyRuleSet, DependencyRules, RangeRule};
