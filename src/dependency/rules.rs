//! The dependency rule document and component name aliases
//!
//! The document maps a rule key to an ordered mapping of range expressions,
//! each carrying a list of requirement maps:
//!
//! ```yaml
//! collectory:
//!   ">= 1.0 < 3.0":
//!     - java: 8
//!   ">= 3.0":
//!     - java: 11
//!     - mysql: "8.0"
//! ```

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::version::cache::VersionCache;
use crate::version::error::RegistryError;
use crate::version::fetcher::Fetcher;
use crate::version::source::fetch_parsed;

/// Component names whose rule key differs from the name itself
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("ala-bie-hub", "ala-bie"),
    ("bie-index", "species"),
    ("image-service", "images"),
    ("specieslist-webapp", "species-lists"),
    ("logger-service", "logger"),
    ("spatial-hub", "spatial"),
    ("sds-webapp2", "sds"),
    ("doi-service", "doi"),
    ("ala-namematching-server", "namematching"),
    ("ala-sensitive-data-server", "sensitive-data"),
    ("data-quality-filter-service", "data-quality"),
    ("la-pipelines", "pipelines"),
];

/// One range expression and the Java version it requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRule {
    pub range: String,
    pub runtime_version: Option<String>,
}

impl RangeRule {
    pub fn new(range: &str, runtime_version: Option<&str>) -> Self {
        Self {
            range: range.to_string(),
            runtime_version: runtime_version.map(String::from),
        }
    }
}

/// Rules per key, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRuleSet {
    rules: IndexMap<String, Vec<RangeRule>>,
}

impl DependencyRuleSet {
    pub fn new(rules: IndexMap<String, Vec<RangeRule>>) -> Self {
        Self { rules }
    }

    /// Parses the YAML rule document
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(content)?;
        Ok(Self::from_value(&value))
    }

    /// Builds a rule set from a decoded document.
    ///
    /// Keys whose value is not a mapping, and ranges whose value is not a
    /// list, are skipped.
    pub fn from_value(value: &Value) -> Self {
        let Value::Mapping(document) = value else {
            return Self::default();
        };

        let mut rules = IndexMap::new();
        for (key, ranges) in document {
            let (Some(key), Value::Mapping(ranges)) = (scalar(key), ranges) else {
                continue;
            };

            let parsed = ranges
                .iter()
                .filter_map(|(range, requirements)| {
                    let range = scalar(range)?;
                    let Value::Sequence(requirements) = requirements else {
                        return None;
                    };
                    Some(RangeRule {
                        range,
                        runtime_version: java_requirement(requirements),
                    })
                })
                .collect();

            rules.insert(key, parsed);
        }

        Self { rules }
    }

    pub fn get(&self, key: &str) -> Option<&[RangeRule]> {
        self.rules.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The `java` value of the first requirement map that has one
fn java_requirement(requirements: &[Value]) -> Option<String> {
    requirements
        .iter()
        .filter_map(|requirement| requirement.as_mapping()?.get("java"))
        .find_map(scalar)
        .map(|java| java.trim().to_string())
        .filter(|java| !java.is_empty())
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A rule set together with the component name aliases used to look it up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRules {
    rules: DependencyRuleSet,
    aliases: IndexMap<String, String>,
}

impl Default for DependencyRules {
    fn default() -> Self {
        Self::new(DependencyRuleSet::default())
    }
}

impl DependencyRules {
    /// Rules with the built-in alias table
    pub fn new(rules: DependencyRuleSet) -> Self {
        Self {
            rules,
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(name, key)| (name.to_string(), key.to_string()))
                .collect(),
        }
    }

    /// Adds or replaces aliases
    pub fn with_aliases(mut self, aliases: &IndexMap<String, String>) -> Self {
        for (name, key) in aliases {
            self.aliases.insert(name.clone(), key.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finds the rule key for a component name.
    ///
    /// Tries the alias, then the key itself, then the key with `-` replaced by
    /// `_`, then with `_` replaced by `-`.
    pub fn key_for(&self, name: &str) -> Option<String> {
        let key = self.aliases.get(name).map(String::as_str).unwrap_or(name);

        [
            key.to_string(),
            key.replace('-', "_"),
            key.replace('_', "-"),
        ]
        .into_iter()
        .find(|candidate| self.rules.contains_key(candidate))
    }

    /// Rules that apply to a component name
    pub fn lookup(&self, name: &str) -> Option<&[RangeRule]> {
        let key = self.key_for(name)?;
        self.rules.get(&key)
    }

    /// Loads the rule document from an `http(s)` URL or a local path.
    ///
    /// Remote documents go through `cache`. Any failure is logged and yields
    /// an empty rule set.
    pub async fn load(
        location: &str,
        cache: &VersionCache,
        fetcher: &dyn Fetcher,
        refresh: bool,
    ) -> DependencyRuleSet {
        let loaded = if location.starts_with("http") {
            fetch_parsed(fetcher, cache, location, refresh, |body| {
                DependencyRuleSet::parse(body)
                    .map_err(|e| RegistryError::InvalidResponse(e.to_string()))
            })
            .await
            .map_err(|e| e.to_string())
        } else {
            debug!("Reading dependency rules from {}", location);
            match tokio::fs::read_to_string(location).await {
                Ok(content) => DependencyRuleSet::parse(&content).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            }
        };

        match loaded {
            Ok(rules) => {
                info!("Loaded dependency rules for {} services", rules.len());
                rules
            }
            Err(e) => {
                warn!("Could not load dependencies from {}: {}", location, e);
                DependencyRuleSet::default()
            }
        }
    }
}
