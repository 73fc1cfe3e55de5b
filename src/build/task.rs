//! One concrete image build

use serde::Serialize;

use crate::service::spec::{BuildMethod, ComponentSpec};
use crate::version::registries::ArtifactCoordinates;

/// Tag added to the newest task of an expanded component
pub const FLOATING_TAG: &str = "latest";

/// A component pinned to one version, ready for the gate and the packager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBuildTask {
    pub spec: ComponentSpec,
    /// Concrete version, or the symbolic one when discovery found nothing
    pub version: String,
    /// Extra image tags besides `version`
    pub aliases: Vec<String>,
}

impl ResolvedBuildTask {
    /// Pins `spec` to `version`
    pub fn new(spec: ComponentSpec, version: &str) -> Self {
        let mut spec = spec;
        spec.version = Some(version.to_string());
        Self {
            spec,
            version: version.to_string(),
            aliases: Vec::new(),
        }
    }

    /// Builds a tag from source as a branch build of `tag`
    pub fn from_tag(spec: ComponentSpec, version: &str, tag: &str) -> Self {
        let mut spec = spec;
        spec.build_method = BuildMethod::RepoBranch;
        spec.branch = Some(tag.to_string());
        Self::new(spec, version)
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Same task with the Java version fixed
    pub fn with_runtime_version(mut self, runtime_version: &str) -> Self {
        self.spec.java_version = Some(runtime_version.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn build_method(&self) -> BuildMethod {
        self.spec.build_method
    }

    pub fn runtime_version(&self) -> Option<&str> {
        self.spec.java_version.as_deref()
    }

    /// `registry/name:version`
    pub fn image_ref(&self) -> String {
        self.image_ref_for(&self.version)
    }

    /// The primary reference followed by one per alias
    pub fn image_refs(&self) -> Vec<String> {
        std::iter::once(self.image_ref())
            .chain(self.aliases.iter().map(|alias| self.image_ref_for(alias)))
            .collect()
    }

    fn image_ref_for(&self, tag: &str) -> String {
        format!(
            "{}/{}:{}",
            self.spec.registry.trim_end_matches('/'),
            self.spec.name,
            tag
        )
    }

    /// Arguments passed to the image build
    pub fn build_args(&self) -> Vec<(&'static str, String)> {
        vec![
            ("BUILD_METHOD", self.spec.build_method.to_string()),
            ("VERSION", self.version.clone()),
        ]
    }

    /// Configured JVM options followed by one `-Dkey=value` per extra parameter
    pub fn java_opts(&self) -> String {
        self.spec
            .java_opts
            .iter()
            .map(|opts| opts.trim().to_string())
            .chain(self.spec.extra_params.iter().filter_map(|p| p.as_flag()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Where the logging configuration lives inside the image
    pub fn logging_config_path(&self) -> Option<String> {
        self.spec
            .log_config_filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| format!("/data/{}/config/{}", self.spec.artifact_id, f))
    }

    pub fn artifact_coordinates(&self) -> ArtifactCoordinates<'_> {
        ArtifactCoordinates {
            artifact_id: &self.spec.artifact_id,
            version: &self.version,
            classifier: self.spec.classifier.as_deref(),
            extension: &self.spec.extension,
        }
    }
}
