//! Java version selection from the dependency rules

use tracing::debug;

use crate::config::DEFAULT_JAVA_VERSION;
use crate::dependency::rules::DependencyRules;
use crate::error::BuildError;
use crate::version::constraint::matches;

/// Target that selects the highest known Java version instead of matching
const DEVELOP: &str = "develop";

/// Picks the Java version for `name` at version `target`.
///
/// For `develop` or an absent target this is the highest integer Java version
/// any rule of the component mentions. Any other target gets the Java version
/// of the last rule whose range matches. `None` when the component has no
/// rules or nothing applies.
pub fn determine_runtime_version(
    name: &str,
    target: Option<&str>,
    rules: &DependencyRules,
) -> Option<String> {
    let Some(component_rules) = rules.lookup(name) else {
        debug!("No dependency rules for {}", name);
        return None;
    };

    let symbolic = matches!(target, None | Some("") | Some(DEVELOP));
    let mut highest: Option<(u64, &str)> = None;
    let mut matched: Option<&str> = None;

    for rule in component_rules {
        let Some(runtime) = rule.runtime_version.as_deref() else {
            continue;
        };

        if let Ok(numeric) = runtime.parse::<u64>() {
            if highest.is_none_or(|(current, _)| numeric > current) {
                highest = Some((numeric, runtime));
            }
        }

        if symbolic {
            continue;
        }

        if target.is_some_and(|target| matches(target, &rule.range)) {
            matched = Some(runtime);
        }
    }

    let selected = if symbolic {
        highest.map(|(_, runtime)| runtime)
    } else {
        matched
    };

    debug!(
        "Runtime version for {} ({}): {:?}",
        name,
        target.unwrap_or("latest"),
        selected
    );
    selected.map(String::from)
}

/// What to do when no rule yields a Java version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStrictness {
    /// Abort the batch
    Strict,
    /// Use a fixed fallback version
    Permissive { default: String },
}

impl Default for RuntimeStrictness {
    fn default() -> Self {
        RuntimeStrictness::Permissive {
            default: DEFAULT_JAVA_VERSION.to_string(),
        }
    }
}

impl RuntimeStrictness {
    /// Turns a lookup result into the final Java version for `name`
    pub fn settle(
        &self,
        name: &str,
        version: &str,
        resolved: Option<String>,
    ) -> Result<String, BuildError> {
        match (resolved, self) {
            (Some(runtime), _) => Ok(runtime),
            (None, RuntimeStrictness::Permissive { default }) => Ok(default.clone()),
            (None, RuntimeStrictness::Strict) => Err(BuildError::UnresolvedRuntimeVersion {
                name: name.to_string(),
                version: version.to_string(),
            }),
        }
    }
}
