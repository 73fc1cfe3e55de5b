//! Nexus (Maven repository) URL layout and `maven-metadata.xml` parsing

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::config::{DEFAULT_GROUP_PATH, DEFAULT_NEXUS_BASE_URL};
use crate::version::error::RegistryError;
use crate::version::semver::sort_by_version;

static VERSION_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<version>\s*([^<]*?)\s*</version>").expect("version element pattern is valid")
});

/// Nexus hosted repository an artifact version lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    Releases,
    Snapshots,
}

impl RepositoryKind {
    /// Snapshot versions carry the literal `SNAPSHOT` marker
    pub fn for_version(version: &str) -> Self {
        if version.contains("SNAPSHOT") {
            RepositoryKind::Snapshots
        } else {
            RepositoryKind::Releases
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryKind::Releases => "releases",
            RepositoryKind::Snapshots => "snapshots",
        }
    }
}

/// Everything needed to locate one artifact file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactCoordinates<'a> {
    pub artifact_id: &'a str,
    pub version: &'a str,
    pub classifier: Option<&'a str>,
    pub extension: &'a str,
}

impl ArtifactCoordinates<'_> {
    /// `artifact-version[-classifier].extension`
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.artifact_id, self.version);
        if let Some(classifier) = self.classifier.filter(|c| !c.is_empty()) {
            name.push('-');
            name.push_str(classifier);
        }
        format!("{}.{}", name, self.extension)
    }
}

/// URL layout of the Nexus repository manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NexusRegistry {
    base_url: String,
    group_path: String,
}

impl NexusRegistry {
    pub fn new(base_url: &str, group_path: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            group_path: group_path.trim_matches('/').to_string(),
        }
    }

    /// Location of the release metadata document listing every published version
    pub fn metadata_url(&self, artifact_id: &str) -> String {
        format!(
            "{}/{}/{}/{}/maven-metadata.xml",
            self.base_url,
            RepositoryKind::Releases.as_str(),
            self.group_path,
            artifact_id
        )
    }

    /// Location of one artifact file
    pub fn artifact_url(&self, coordinates: &ArtifactCoordinates<'_>) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            self.base_url,
            RepositoryKind::for_version(coordinates.version).as_str(),
            self.group_path,
            coordinates.artifact_id,
            coordinates.version,
            coordinates.file_name()
        )
    }

    /// Extracts every `<version>` value, deduplicated and sorted oldest to newest
    pub fn parse_metadata(body: &str) -> Result<Vec<String>, RegistryError> {
        if !body.contains("<metadata") {
            return Err(RegistryError::InvalidResponse(
                "document is not maven metadata".to_string(),
            ));
        }

        let unique: IndexSet<String> = VERSION_ELEMENT_RE
            .captures_iter(body)
            .map(|captures| captures[1].to_string())
            .filter(|version| !version.is_empty())
            .collect();

        let mut versions: Vec<String> = unique.into_iter().collect();
        sort_by_version(&mut versions, |v| v.as_str());
        Ok(versions)
    }
}

impl Default for NexusRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NEXUS_BASE_URL, DEFAULT_GROUP_PATH)
    }
}
