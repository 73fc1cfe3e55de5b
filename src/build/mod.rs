//! From resolved component specs to validated build tasks
//!
//! # Modules
//!
//! - [`task`]: The per-version build record
//! - [`expander`]: Symbolic version expansion via the remote sources
//! - [`gate`]: Batch reachability check of package-index artifacts
//! - [`packager`]: The packaging seam and its dry-run implementation

pub mod expander;
pub mod gate;
pub mod packager;
pub mod task;

pub use expander::VersionExpander;
pub use gate::{CheckEntry, CheckResult, GateVerdict, ValidationGate, ValidationReport};
pub use packager::{Packager, PlanPackager};
pub use task::ResolvedBuildTask;
