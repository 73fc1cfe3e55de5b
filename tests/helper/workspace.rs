//! Temporary build directories with the documents the pipeline reads

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use la_image_builder::config::{CacheConfig, Endpoints};
use la_image_builder::pipeline::{PipelineRequest, PipelineSettings};

pub const NEXUS: &str = "https://nexus.test/repository";
pub const GITHUB_API: &str = "https://api.github.test";

/// `maven-metadata.xml` URL of an artifact on the test Nexus
pub fn metadata_url(artifact: &str) -> String {
    format!(
        "{}/releases/au/org/ala/{}/maven-metadata.xml",
        NEXUS, artifact
    )
}

/// Release WAR URL of an artifact version on the test Nexus
pub fn war_url(artifact: &str, version: &str) -> String {
    format!(
        "{}/releases/au/org/ala/{}/{}/{}-{}.war",
        NEXUS, artifact, version, artifact, version
    )
}

/// `maven-metadata.xml` listing `versions`
pub fn metadata(versions: &[&str]) -> String {
    let versions: String = versions
        .iter()
        .map(|v| format!("<version>{}</version>", v))
        .collect();
    format!(
        "<metadata><versioning><versions>{}</versions></versioning></metadata>",
        versions
    )
}

/// A directory holding definitions, overrides, dependency rules and a cache
pub struct Workspace {
    dir: TempDir,
    dependencies: Option<String>,
}

impl Workspace {
    pub fn new(definitions: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("services-definition.yml"), definitions).unwrap();
        Self {
            dir,
            dependencies: None,
        }
    }

    pub fn with_overrides(self, overrides: &str) -> Self {
        fs::write(self.dir.path().join("build-config.yml"), overrides).unwrap();
        self
    }

    /// Writes a local dependency rule document
    pub fn with_rules(mut self, rules: &str) -> Self {
        let path = self.dir.path().join("dependencies.yaml");
        fs::write(&path, rules).unwrap();
        self.dependencies = Some(path.to_string_lossy().into_owned());
        self
    }

    /// Reads the dependency rules from a URL instead of a file
    pub fn with_remote_rules(mut self, url: &str) -> Self {
        self.dependencies = Some(url.to_string());
        self
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn settings(&self) -> PipelineSettings {
        let dependencies = match &self.dependencies {
            Some(dependencies) => dependencies.clone(),
            None => {
                let path = self.path("no-dependencies.yaml");
                path.to_string_lossy().into_owned()
            }
        };
        PipelineSettings {
            definitions_path: self.path("services-definition.yml"),
            overrides_path: self.path("build-config.yml"),
            dependencies,
            endpoints: Endpoints {
                nexus_base_url: NEXUS.to_string(),
                github_api_url: GITHUB_API.to_string(),
                ..Endpoints::default()
            },
            cache: CacheConfig {
                dir: self.path("cache"),
                freshness: Duration::from_secs(24 * 60 * 60),
            },
        }
    }
}

pub fn request(names: &[&str]) -> PipelineRequest {
    PipelineRequest {
        names: names.iter().map(|n| n.to_string()).collect(),
        ..PipelineRequest::default()
    }
}
