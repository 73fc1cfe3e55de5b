//! All-or-nothing reachability check of package-download artifacts

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::build::task::ResolvedBuildTask;
use crate::service::spec::BuildMethod;
use crate::version::fetcher::Fetcher;
use crate::version::registries::NexusRegistry;

/// Outcome of probing one artifact URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub version: String,
    pub url: String,
    pub success: bool,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) -> {}", self.name, self.version, self.url)
    }
}

/// One row of the validation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CheckEntry {
    Checked(CheckResult),
    /// Tasks that do not download from the package index
    Skipped {
        name: String,
        method: BuildMethod,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GateVerdict {
    Passed,
    Aborted(Vec<CheckResult>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// One entry per task, in task order
    pub entries: Vec<CheckEntry>,
    pub verdict: GateVerdict,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.verdict == GateVerdict::Passed
    }

    pub fn failures(&self) -> &[CheckResult] {
        match &self.verdict {
            GateVerdict::Passed => &[],
            GateVerdict::Aborted(failures) => failures,
        }
    }
}

/// Probes every package-download task before anything is built
pub struct ValidationGate {
    fetcher: Arc<dyn Fetcher>,
    nexus: NexusRegistry,
}

impl ValidationGate {
    pub fn new(fetcher: Arc<dyn Fetcher>, nexus: NexusRegistry) -> Self {
        Self { fetcher, nexus }
    }

    /// Artifact URL a `nexus` task downloads from
    pub fn artifact_url(&self, task: &ResolvedBuildTask) -> String {
        self.nexus.artifact_url(&task.artifact_coordinates())
    }

    /// Probes all `nexus` tasks concurrently.
    ///
    /// Every probe runs even after a failure so the report lists all of them.
    pub async fn validate_all(&self, tasks: &[ResolvedBuildTask]) -> ValidationReport {
        info!("Checking artifact URLs for {} task(s)", tasks.len());

        let entries: Vec<CheckEntry> = join_all(tasks.iter().map(|task| self.check(task))).await;

        let failures: Vec<CheckResult> = entries
            .iter()
            .filter_map(|entry| match entry {
                CheckEntry::Checked(result) if !result.success => Some(result.clone()),
                _ => None,
            })
            .collect();

        let verdict = if failures.is_empty() {
            info!("All artifact URLs validated");
            GateVerdict::Passed
        } else {
            warn!("{} artifact URL(s) failed validation", failures.len());
            GateVerdict::Aborted(failures)
        };

        ValidationReport { entries, verdict }
    }

    async fn check(&self, task: &ResolvedBuildTask) -> CheckEntry {
        if task.build_method() != BuildMethod::Nexus {
            info!("{}: skipped ({})", task.name(), task.build_method());
            return CheckEntry::Skipped {
                name: task.name().to_string(),
                method: task.build_method(),
            };
        }

        let url = self.artifact_url(task);
        let success = match self.fetcher.probe(&url).await {
            Ok(()) => {
                info!("{} ({}): {}", task.name(), task.version, url);
                true
            }
            Err(e) => {
                warn!(
                    "{} ({}) is not reachable at {}: {}",
                    task.name(),
                    task.version,
                    url,
                    e
                );
                false
            }
        };

        CheckEntry::Checked(CheckResult {
            name: task.name().to_string(),
            version: task.version.clone(),
            url,
            success,
        })
    }
}
