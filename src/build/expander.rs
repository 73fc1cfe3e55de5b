//! Expansion of symbolic versions into concrete build tasks

use std::sync::Arc;

use tracing::{info, warn};

use crate::build::task::{FLOATING_TAG, ResolvedBuildTask};
use crate::service::spec::{BuildMethod, ComponentSpec};
use crate::version::source::RemoteVersionSource;

/// True when the version asks for the newest published release(s)
fn wants_discovery(version: Option<&str>) -> bool {
    matches!(version.map(str::trim), None | Some("" | FLOATING_TAG))
}

/// Turns component specs into build tasks, discovering versions remotely
pub struct VersionExpander {
    source: Arc<RemoteVersionSource>,
}

impl VersionExpander {
    pub fn new(source: Arc<RemoteVersionSource>) -> Self {
        Self { source }
    }

    /// Expands `spec` into its build tasks, oldest version first.
    ///
    /// Discovered lists hold at most `n` tasks and the newest one carries the
    /// floating tag. When discovery finds nothing, the spec is kept as a single
    /// task with its symbolic version.
    pub async fn expand(
        &self,
        spec: &ComponentSpec,
        n: usize,
        refresh: bool,
    ) -> Vec<ResolvedBuildTask> {
        let discover = wants_discovery(spec.version.as_deref());

        let tasks = match (spec.build_method, discover) {
            (BuildMethod::Nexus, true) => self.from_package_index(spec, n, refresh).await,
            (BuildMethod::RepoTag, true) => self.from_tags(spec, n, refresh).await,
            (BuildMethod::RepoTag, false) => {
                let version = spec.version.as_deref().unwrap_or(FLOATING_TAG);
                return vec![ResolvedBuildTask::from_tag(spec.clone(), version, version)];
            }
            _ => return vec![Self::passthrough(spec)],
        };

        if tasks.is_empty() {
            warn!(
                "No versions found for {}; keeping requested version {}",
                spec.name,
                spec.version.as_deref().unwrap_or(FLOATING_TAG)
            );
            return vec![Self::passthrough(spec)];
        }

        info!(
            "Resolved {} version(s) for {}: {}",
            tasks.len(),
            spec.name,
            tasks
                .iter()
                .map(|t| t.version.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        mark_newest(tasks)
    }

    async fn from_package_index(
        &self,
        spec: &ComponentSpec,
        n: usize,
        refresh: bool,
    ) -> Vec<ResolvedBuildTask> {
        self.source
            .package_versions(&spec.name, &spec.artifact_id, n, refresh)
            .await
            .iter()
            .map(|version| ResolvedBuildTask::new(spec.clone(), version))
            .collect()
    }

    async fn from_tags(
        &self,
        spec: &ComponentSpec,
        n: usize,
        refresh: bool,
    ) -> Vec<ResolvedBuildTask> {
        let Some(repository) = spec.repository.as_deref() else {
            warn!("{} uses repo-tag but has no repository", spec.name);
            return Vec::new();
        };

        self.source
            .tag_versions(&spec.name, repository, n, refresh)
            .await
            .iter()
            .map(|tag| ResolvedBuildTask::from_tag(spec.clone(), &tag.version, &tag.tag))
            .collect()
    }

    fn passthrough(spec: &ComponentSpec) -> ResolvedBuildTask {
        let version = spec
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(FLOATING_TAG);
        ResolvedBuildTask::new(spec.clone(), version)
    }
}

fn mark_newest(mut tasks: Vec<ResolvedBuildTask>) -> Vec<ResolvedBuildTask> {
    if let Some(newest) = tasks.pop() {
        tasks.push(newest.with_alias(FLOATING_TAG));
    }
    tasks
}
