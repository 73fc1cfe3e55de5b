//! Hand-off point to the image build

use std::io::{self, Write};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::info;

use crate::build::task::ResolvedBuildTask;
use crate::error::BuildError;

/// Consumer of validated build tasks
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Packager: Send + Sync {
    /// Packages one task
    ///
    /// # Returns
    /// * `Ok(())` - The image for the task was produced
    /// * `Err(BuildError::Packaging)` - The task could not be packaged
    async fn package(&self, task: &ResolvedBuildTask) -> Result<(), BuildError>;
}

/// Prints what would be built without building anything
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanPackager;

impl PlanPackager {
    /// Human-readable plan for one task
    pub fn describe(task: &ResolvedBuildTask) -> String {
        let mut lines = vec![format!("{} ({})", task.name(), task.version)];

        for image in task.image_refs() {
            lines.push(format!("  image: {}", image));
        }
        for (key, value) in task.build_args() {
            lines.push(format!("  build-arg: {}={}", key, value));
        }
        lines.push(format!(
            "  java: {}",
            task.runtime_version().unwrap_or("unresolved")
        ));
        if let Some(base) = task.spec.java_base_image.as_deref() {
            lines.push(format!("  java base image: {}", base));
        }
        if let Some(branch) = task.spec.branch.as_deref() {
            lines.push(format!("  branch: {}", branch));
        }
        if let Some(commit) = task.spec.commit.as_deref() {
            lines.push(format!("  commit: {}", commit));
        }
        let java_opts = task.java_opts();
        if !java_opts.is_empty() {
            lines.push(format!("  java opts: {}", java_opts));
        }
        if let Some(logging) = task.logging_config_path() {
            lines.push(format!("  logging config: {}", logging));
        }
        if task.spec.push {
            lines.push("  push: yes".to_string());
        }

        lines.join("\n")
    }
}

#[async_trait]
impl Packager for PlanPackager {
    async fn package(&self, task: &ResolvedBuildTask) -> Result<(), BuildError> {
        info!("[Dry Run] Would build {}", task.image_ref());
        if let Err(e) = writeln!(io::stdout().lock(), "{}", Self::describe(task)) {
            return Err(BuildError::Packaging {
                name: task.name().to_string(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::task::FLOATING_TAG;
    use crate::service::spec::{BuildMethod, ComponentSpec, ServiceEntry};

    fn task() -> ResolvedBuildTask {
        let spec = ComponentSpec::from_entry(
            "collectory",
            ServiceEntry {
                build_method: Some(BuildMethod::RepoBranch),
                branch: Some("v2.1.0".into()),
                java_opts: Some("-Xmx1g".into()),
                push: Some(true),
                ..ServiceEntry::default()
            },
        );
        ResolvedBuildTask::new(spec, "2.1.0")
            .with_alias(FLOATING_TAG)
            .with_runtime_version("11")
    }

    #[test]
    fn describe_lists_images_args_and_runtime() {
        let plan = PlanPackager::describe(&task());

        assert_eq!(
            plan,
            [
                "collectory (2.1.0)",
                "  image: hub.docker.com/u/livingatlases/collectory:2.1.0",
                "  image: hub.docker.com/u/livingatlases/collectory:latest",
                "  build-arg: BUILD_METHOD=repo-branch",
                "  build-arg: VERSION=2.1.0",
                "  java: 11",
                "  branch: v2.1.0",
                "  java opts: -Xmx1g",
                "  push: yes",
            ]
            .join("\n")
        );
    }

    #[tokio::test]
    async fn plan_packager_writes_plan_to_stdout() {
        assert!(PlanPackager.package(&task()).await.is_ok());
    }
}
