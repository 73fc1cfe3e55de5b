//! Service-definition and user-override documents

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::BuildError;
use crate::service::spec::{BuildMethod, ServiceEntry};

/// `services-definition.yml`: the base fields of every known component
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceDefinitions {
    pub services: IndexMap<String, ServiceEntry>,
}

impl ServiceDefinitions {
    /// Reads the definitions document; a missing file is fatal
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            return Err(BuildError::DefinitionsNotFound {
                path: path.to_path_buf(),
            });
        }
        let definitions: Self = read_yaml(path)?;
        info!(
            "Loaded {} service definitions from {:?}",
            definitions.services.len(),
            path
        );
        Ok(definitions)
    }

    pub fn get(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }

    /// Component names in document order
    pub fn names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}

/// Registry and build method applied to every component before its own entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalDefaults {
    pub registry: Option<String>,
    pub build_method: Option<BuildMethod>,
}

/// `build-config.yml`: the user's sparse overrides
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub global_defaults: GlobalDefaults,
    pub services: IndexMap<String, ServiceEntry>,
    /// Extra component name -> dependency rule key mappings
    pub dependency_aliases: IndexMap<String, String>,
}

impl BuildConfig {
    /// Reads the override document; a missing file means no overrides
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            debug!("No build config at {:?}; using defaults", path);
            return Ok(Self::default());
        }
        read_yaml(path)
    }

    pub fn get(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }
}

/// Component selection file: a list of names, or a mapping whose `services`
/// key holds a list of names or a mapping keyed by name
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectionDocument {
    Names(Vec<String>),
    Keyed { services: ServiceSelection },
}

impl Default for SelectionDocument {
    fn default() -> Self {
        SelectionDocument::Names(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceSelection {
    Names(Vec<String>),
    Mapping(IndexMap<String, serde_yaml::Value>),
}

/// Reads the component names listed in a YAML or JSON selection file
pub fn load_selection(path: &Path) -> Result<Vec<String>, BuildError> {
    let document: SelectionDocument = read_yaml(path)?;
    Ok(match document {
        SelectionDocument::Names(names) => names,
        SelectionDocument::Keyed {
            services: ServiceSelection::Names(names),
        } => names,
        SelectionDocument::Keyed {
            services: ServiceSelection::Mapping(mapping),
        } => mapping.into_keys().collect(),
    })
}

fn read_yaml<T>(path: &Path) -> Result<T, BuildError>
where
    T: DeserializeOwned + Default,
{
    let content = fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&content).map_err(|source| BuildError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn definitions_load_keeps_document_order() {
        let file = write_temp(
            r#"
services:
  collectory:
    artifacts: collectory
    repository: https://github.com/AtlasOfLivingAustralia/collectory
  ala-hub:
    artifacts: ala-hub
    port: 9000
"#,
        );

        let definitions = ServiceDefinitions::load(file.path()).unwrap();

        assert_eq!(definitions.names(), vec!["collectory", "ala-hub"]);
        assert_eq!(definitions.get("ala-hub").unwrap().port, Some(9000));
    }

    #[test]
    fn definitions_load_fails_for_missing_file() {
        let result = ServiceDefinitions::load(Path::new("/nonexistent/services-definition.yml"));

        assert!(matches!(
            result,
            Err(BuildError::DefinitionsNotFound { .. })
        ));
    }

    #[test]
    fn definitions_load_reports_invalid_yaml_with_path() {
        let file = write_temp("services: [unterminated");

        let result = ServiceDefinitions::load(file.path());

        assert!(matches!(result, Err(BuildError::Yaml { path, .. }) if path == file.path()));
    }

    #[test]
    fn build_config_missing_file_is_empty() {
        let config = BuildConfig::load(Path::new("/nonexistent/build-config.yml")).unwrap();

        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn build_config_empty_file_is_empty() {
        let file = write_temp("\n");

        let config = BuildConfig::load(file.path()).unwrap();

        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn build_config_parses_all_sections() {
        let file = write_temp(
            r#"
global_defaults:
  registry: registry.example.org/ala
  build_method: repo-branch
services:
  collectory:
    version: "3.0.0"
dependency_aliases:
  my-hub: ala-hub
"#,
        );

        let config = BuildConfig::load(file.path()).unwrap();

        assert_eq!(
            config.global_defaults,
            GlobalDefaults {
                registry: Some("registry.example.org/ala".to_string()),
                build_method: Some(BuildMethod::RepoBranch),
            }
        );
        assert_eq!(
            config.get("collectory").unwrap().version.as_deref(),
            Some("3.0.0")
        );
        assert_eq!(
            config.dependency_aliases.get("my-hub").map(String::as_str),
            Some("ala-hub")
        );
    }

    #[test]
    fn load_selection_accepts_plain_list() {
        let file = write_temp("- collectory\n- ala-hub\n");

        assert_eq!(
            load_selection(file.path()).unwrap(),
            vec!["collectory", "ala-hub"]
        );
    }

    #[test]
    fn load_selection_accepts_json_services_list() {
        let file = write_temp(r#"{"services": ["biocache-service", "collectory"]}"#);

        assert_eq!(
            load_selection(file.path()).unwrap(),
            vec!["biocache-service", "collectory"]
        );
    }

    #[test]
    fn load_selection_accepts_services_mapping() {
        let yaml = "services:\n  collectory: {}\n  ala-hub:\n    version: '1.0'\n";
        let file = write_temp(yaml);

        assert_eq!(
            load_selection(file.path()).unwrap(),
            vec!["collectory", "ala-hub"]
        );
    }
}
