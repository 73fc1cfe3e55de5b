//! Remote version sources: URL layout and response parsing

pub mod github;
pub mod nexus;

pub use github::GitHubTagRegistry;
pub use nexus::{ArtifactCoordinates, NexusRegistry, RepositoryKind};
