use std::path::PathBuf;

use thiserror::Error;

use crate::build::gate::ValidationReport;

/// Errors that stop the whole batch before any packaging happens
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Service '{name}' is not defined in the service definitions")]
    UnknownComponent { name: String },

    #[error(
        "Could not determine the Java version for {name} ({version}); set java_version for it in the build config or pass --java-version"
    )]
    UnresolvedRuntimeVersion { name: String, version: String },

    /// Carries the whole gate report, passing checks included
    #[error("{} artifact URL(s) are not reachable", report.failures().len())]
    ReachabilityFailure { report: ValidationReport },

    #[error("Services definition file not found: {path:?}")]
    DefinitionsNotFound { path: PathBuf },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Packaging {name} failed: {reason}")]
    Packaging { name: String, reason: String },
}
