//! Layered configuration resolution for one component
//!
//! Layers, later wins per field:
//! 1. built-in defaults, then the override document's `global_defaults`
//! 2. the component's service definition (required)
//! 3. the component's entry in the override document
//! 4. command-line flags that were actually supplied

use tracing::debug;

use crate::config::DEFAULT_REGISTRY;
use crate::error::BuildError;
use crate::service::definitions::{BuildConfig, ServiceDefinitions};
use crate::service::spec::{BuildMethod, ComponentSpec, ServiceEntry};

/// Command-line values that override every document layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub version: Option<String>,
    pub registry: Option<String>,
    pub build_method: Option<BuildMethod>,
    pub java_version: Option<String>,
    pub java_base_image: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    /// `--push` can only switch pushing on
    pub push: bool,
}

impl CliOverrides {
    /// Same overrides with the version replaced, for building several tags
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            ..self.clone()
        }
    }

    fn as_entry(&self) -> ServiceEntry {
        ServiceEntry {
            version: self.version.clone(),
            registry: self.registry.clone(),
            build_method: self.build_method,
            java_version: self.java_version.clone(),
            java_base_image: self.java_base_image.clone(),
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            commit: self.commit.clone(),
            push: self.push.then_some(true),
            ..ServiceEntry::default()
        }
    }
}

fn defaults_entry(overrides: &BuildConfig) -> ServiceEntry {
    let built_in = ServiceEntry {
        registry: Some(DEFAULT_REGISTRY.to_string()),
        build_method: Some(BuildMethod::Nexus),
        push: Some(false),
        ..ServiceEntry::default()
    };
    let global = ServiceEntry {
        registry: overrides.global_defaults.registry.clone(),
        build_method: overrides.global_defaults.build_method,
        ..ServiceEntry::default()
    };
    built_in.overlay(global)
}

/// Resolves the final configuration of `name`.
///
/// Fails with [`BuildError::UnknownComponent`] when `name` has no service
/// definition, even if the override document mentions it.
pub fn resolve(
    name: &str,
    definitions: &ServiceDefinitions,
    overrides: &BuildConfig,
    cli: &CliOverrides,
) -> Result<ComponentSpec, BuildError> {
    let definition = definitions
        .get(name)
        .ok_or_else(|| BuildError::UnknownComponent {
            name: name.to_string(),
        })?;

    let mut merged = defaults_entry(overrides).overlay(definition.clone());

    if let Some(user) = overrides.get(name) {
        debug!("Applying build config overrides for {}", name);
        merged = merged.overlay(user.clone());
    }

    merged = merged.overlay(cli.as_entry());

    Ok(ComponentSpec::from_entry(name, merged))
}
