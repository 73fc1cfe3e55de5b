//! Component configuration records
//!
//! [`ServiceEntry`] is one sparse configuration layer as written in a document;
//! [`ComponentSpec`] is the fully merged record with defaults applied.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::DEFAULT_REGISTRY;

/// Version placeholders that must be expanded before packaging
pub const SYMBOLIC_VERSIONS: &[&str] = &["latest", "develop"];

/// Returns true for absent, empty, `latest` or `develop` versions
pub fn is_symbolic_version(version: Option<&str>) -> bool {
    match version.map(str::trim) {
        None | Some("") => true,
        Some(v) => SYMBOLIC_VERSIONS.contains(&v),
    }
}

/// How the build obtains its input
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMethod {
    /// Download the published WAR/JAR from Nexus
    #[default]
    Nexus,
    /// Clone the repository and build a branch or commit
    RepoBranch,
    /// Clone the repository and build a tag
    RepoTag,
    /// Download the artifact from a direct URL
    Url,
}

impl BuildMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMethod::Nexus => "nexus",
            BuildMethod::RepoBranch => "repo-branch",
            BuildMethod::RepoTag => "repo-tag",
            BuildMethod::Url => "url",
        }
    }
}

impl fmt::Display for BuildMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nexus" => Ok(BuildMethod::Nexus),
            "repo-branch" => Ok(BuildMethod::RepoBranch),
            "repo-tag" => Ok(BuildMethod::RepoTag),
            "url" => Ok(BuildMethod::Url),
            other => Err(format!("unknown build method '{}'", other)),
        }
    }
}

/// A `-Dkey=value` system property passed to the JVM
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraParam {
    #[serde(deserialize_with = "scalar_string")]
    pub key: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub value: Option<String>,
}

impl ExtraParam {
    /// Renders as `-Dkey=value`; entries missing either part render as nothing
    pub fn as_flag(&self) -> Option<String> {
        match (self.key.as_deref(), self.value.as_deref()) {
            (Some(key), Some(value)) if !key.is_empty() && !value.is_empty() => {
                Some(format!("-D{}={}", key, value))
            }
            _ => None,
        }
    }
}

/// One sparse configuration layer for a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub description: Option<String>,
    #[serde(rename = "artifacts", deserialize_with = "scalar_string")]
    pub artifact_id: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub extension: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub classifier: Option<String>,
    pub build_method: Option<BuildMethod>,
    #[serde(deserialize_with = "scalar_string")]
    pub build_tool: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub build_dir: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub repository: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub branch: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub commit: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub version: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub java_version: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub java_base_image: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub java_opts: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub registry: Option<String>,
    pub push: Option<bool>,
    pub port: Option<u16>,
    #[serde(deserialize_with = "scalar_string")]
    pub log_dir: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub log_config_filename: Option<String>,
    pub extra_params: Option<Vec<ExtraParam>>,
    /// Fields this tool does not interpret, carried through for templating
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

macro_rules! overlay_fields {
    ($base:ident, $over:ident, $($field:ident),+ $(,)?) => {
        ServiceEntry {
            $($field: $over.$field.or($base.$field),)+
            extra: {
                let mut extra = $base.extra;
                extra.extend($over.extra);
                extra
            },
        }
    };
}

impl ServiceEntry {
    /// Field-by-field merge: every field set in `over` replaces the one in `self`
    pub fn overlay(self, over: ServiceEntry) -> ServiceEntry {
        let base = self;
        overlay_fields!(
            base,
            over,
            description,
            artifact_id,
            extension,
            classifier,
            build_method,
            build_tool,
            build_dir,
            repository,
            branch,
            commit,
            version,
            java_version,
            java_base_image,
            java_opts,
            registry,
            push,
            port,
            log_dir,
            log_config_filename,
            extra_params,
        )
    }
}

/// Fully merged configuration of one component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    pub name: String,
    pub description: Option<String>,
    pub artifact_id: String,
    pub extension: String,
    pub classifier: Option<String>,
    pub build_method: BuildMethod,
    pub build_tool: String,
    pub build_dir: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    /// Requested version; `None` means the newest published one
    pub version: Option<String>,
    /// Java version; `None` until resolved from the dependency rules
    pub java_version: Option<String>,
    pub java_base_image: Option<String>,
    pub java_opts: Option<String>,
    pub registry: String,
    pub push: bool,
    pub port: u16,
    pub log_dir: Option<String>,
    pub log_config_filename: Option<String>,
    pub extra_params: Vec<ExtraParam>,
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl ComponentSpec {
    /// Applies the remaining field defaults to a merged entry
    pub fn from_entry(name: &str, entry: ServiceEntry) -> Self {
        Self {
            name: name.to_string(),
            description: entry.description,
            artifact_id: entry.artifact_id.unwrap_or_else(|| name.to_string()),
            extension: entry.extension.unwrap_or_else(|| "war".to_string()),
            classifier: entry.classifier.filter(|c| !c.is_empty()),
            build_method: entry.build_method.unwrap_or_default(),
            build_tool: entry.build_tool.unwrap_or_else(|| "gradle".to_string()),
            build_dir: entry.build_dir,
            repository: entry.repository.filter(|r| !r.is_empty()),
            branch: entry.branch,
            commit: entry.commit,
            version: entry.version,
            java_version: entry.java_version,
            java_base_image: entry.java_base_image,
            java_opts: entry.java_opts,
            registry: entry
                .registry
                .unwrap_or_else(|| DEFAULT_REGISTRY.to_string()),
            push: entry.push.unwrap_or(false),
            port: entry.port.unwrap_or(8080),
            log_dir: entry.log_dir,
            log_config_filename: entry.log_config_filename,
            extra_params: entry.extra_params.unwrap_or_default(),
            extra: entry.extra,
        }
    }

    pub fn has_symbolic_version(&self) -> bool {
        is_symbolic_version(self.version.as_deref())
    }
}

/// Accepts strings, numbers and booleans as a string value.
///
/// YAML authors write `java_version: 11` and `version: 2.3` as often as the
/// quoted forms.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        serde_yaml::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {:?}",
            other
        ))),
    }
}
