//! Component configuration: documents, layered merge and resolved records
//!
//! # Modules
//!
//! - [`definitions`]: `services-definition.yml`, `build-config.yml` and selection files
//! - [`resolver`]: Layered merge producing one [`ComponentSpec`] per component
//! - [`spec`]: Configuration layer and resolved record types

pub mod definitions;
pub mod resolver;
pub mod spec;

pub use definitions::{BuildConfig, ServiceDefinitions};
pub use resolver::{CliOverrides, resolve};
pub use spec::{BuildMethod, ComponentSpec, ServiceEntry};
