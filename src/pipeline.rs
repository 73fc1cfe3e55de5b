//! The build pipeline: resolve, expand, assign runtimes, validate, package
//!
//! Phases run strictly in order and a fatal error in one phase stops the batch
//! before the next begins. Within expansion and validation the per-component
//! work runs concurrently.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::build::expander::VersionExpander;
use crate::build::gate::{ValidationGate, ValidationReport};
use crate::build::packager::Packager;
use crate::build::task::ResolvedBuildTask;
use crate::config::{
    CacheConfig, DEFAULT_BUILD_CONFIG, DEFAULT_DEPENDENCIES_URL, DEFAULT_SERVICES_DEFINITION,
    Endpoints,
};
use crate::dependency::resolver::{RuntimeStrictness, determine_runtime_version};
use crate::dependency::rules::DependencyRules;
use crate::error::BuildError;
use crate::service::definitions::{BuildConfig, ServiceDefinitions};
use crate::service::resolver::{CliOverrides, resolve};
use crate::service::spec::ComponentSpec;
use crate::version::cache::VersionCache;
use crate::version::fetcher::Fetcher;
use crate::version::registries::{GitHubTagRegistry, NexusRegistry};
use crate::version::source::RemoteVersionSource;

/// Where the pipeline reads its documents and remote data from
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub definitions_path: PathBuf,
    pub overrides_path: PathBuf,
    /// URL or local path of the dependency rule document
    pub dependencies: String,
    pub endpoints: Endpoints,
    pub cache: CacheConfig,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            definitions_path: PathBuf::from(DEFAULT_SERVICES_DEFINITION),
            overrides_path: PathBuf::from(DEFAULT_BUILD_CONFIG),
            dependencies: DEFAULT_DEPENDENCIES_URL.to_string(),
            endpoints: Endpoints::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// One invocation's selection and options
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Components to build, in order
    pub names: Vec<String>,
    pub cli: CliOverrides,
    /// Explicit versions; each component is resolved once per entry
    pub list_tags: Vec<String>,
    /// How many discovered versions to build per component
    pub n_tags: usize,
    pub refresh: bool,
    /// Stop after a passing validation gate
    pub check_only: bool,
    pub strictness: RuntimeStrictness,
}

impl Default for PipelineRequest {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            cli: CliOverrides::default(),
            list_tags: Vec::new(),
            n_tags: 1,
            refresh: false,
            check_only: false,
            strictness: RuntimeStrictness::default(),
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub tasks: Vec<ResolvedBuildTask>,
    pub report: ValidationReport,
    /// False when the run stopped after validation
    pub packaged: bool,
}

pub struct Pipeline {
    definitions: ServiceDefinitions,
    overrides: BuildConfig,
    rules: DependencyRules,
    expander: VersionExpander,
    gate: ValidationGate,
    packager: Arc<dyn Packager>,
}

impl Pipeline {
    pub fn new(
        definitions: ServiceDefinitions,
        overrides: BuildConfig,
        rules: DependencyRules,
        source: Arc<RemoteVersionSource>,
        fetcher: Arc<dyn Fetcher>,
        packager: Arc<dyn Packager>,
    ) -> Self {
        let gate = ValidationGate::new(fetcher, source.nexus().clone());
        Self {
            definitions,
            overrides,
            rules,
            expander: VersionExpander::new(source),
            gate,
            packager,
        }
    }

    /// Reads the documents and dependency rules named by `settings`.
    ///
    /// A missing definitions file is fatal; the dependency rules degrade to an
    /// empty set.
    pub async fn load(
        settings: &PipelineSettings,
        fetcher: Arc<dyn Fetcher>,
        packager: Arc<dyn Packager>,
        refresh: bool,
    ) -> Result<Self, BuildError> {
        let definitions = ServiceDefinitions::load(&settings.definitions_path)?;
        let overrides = BuildConfig::load(&settings.overrides_path)?;

        let cache = Arc::new(VersionCache::from_config(&settings.cache));
        let rule_set =
            DependencyRules::load(&settings.dependencies, &cache, fetcher.as_ref(), refresh).await;
        let rules = DependencyRules::new(rule_set).with_aliases(&overrides.dependency_aliases);

        let source = Arc::new(RemoteVersionSource::new(
            fetcher.clone(),
            cache,
            NexusRegistry::new(
                &settings.endpoints.nexus_base_url,
                &settings.endpoints.group_path,
            ),
            GitHubTagRegistry::new(&settings.endpoints.github_api_url),
        ));

        Ok(Self::new(
            definitions,
            overrides,
            rules,
            source,
            fetcher,
            packager,
        ))
    }

    pub fn definitions(&self) -> &ServiceDefinitions {
        &self.definitions
    }

    /// Resolves every requested component, once per listed version if any
    pub fn resolve_specs(
        &self,
        request: &PipelineRequest,
    ) -> Result<Vec<ComponentSpec>, BuildError> {
        let mut specs = Vec::new();
        for name in &request.names {
            if request.list_tags.is_empty() {
                let spec = resolve(name, &self.definitions, &self.overrides, &request.cli)?;
                specs.push(spec);
                continue;
            }
            for tag in &request.list_tags {
                let cli = request.cli.with_version(tag);
                specs.push(resolve(name, &self.definitions, &self.overrides, &cli)?);
            }
        }
        Ok(specs)
    }

    /// Expands all specs concurrently, keeping their order
    pub async fn expand(
        &self,
        specs: &[ComponentSpec],
        n: usize,
        refresh: bool,
    ) -> Vec<ResolvedBuildTask> {
        join_all(
            specs
                .iter()
                .map(|spec| self.expander.expand(spec, n, refresh)),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fixes the Java version of every task.
    ///
    /// An explicitly configured version is kept as is; otherwise the rules
    /// decide and `strictness` handles the case where they cannot.
    pub fn assign_runtime_versions(
        &self,
        tasks: Vec<ResolvedBuildTask>,
        strictness: &RuntimeStrictness,
    ) -> Result<Vec<ResolvedBuildTask>, BuildError> {
        tasks
            .into_iter()
            .map(|task| {
                if task.runtime_version().is_some() {
                    return Ok(task);
                }
                let resolved =
                    determine_runtime_version(task.name(), Some(&task.version), &self.rules);
                if resolved.is_none() {
                    warn!(
                        "No dependency rule gives a Java version for {} ({})",
                        task.name(),
                        task.version
                    );
                }
                let runtime = strictness.settle(task.name(), &task.version, resolved)?;
                info!(
                    "Resolved Java version for {} ({}): {}",
                    task.name(),
                    task.version,
                    runtime
                );
                Ok(task.with_runtime_version(&runtime))
            })
            .collect()
    }

    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutcome, BuildError> {
        let specs = self.resolve_specs(request)?;
        info!("Resolved configuration for {} component(s)", specs.len());

        let tasks = self.expand(&specs, request.n_tags, request.refresh).await;
        let tasks = self.assign_runtime_versions(tasks, &request.strictness)?;

        let report = self.gate.validate_all(&tasks).await;
        if !report.passed() {
            return Err(BuildError::ReachabilityFailure { report });
        }

        if request.check_only {
            info!("Check-only mode; skipping packaging");
            return Ok(PipelineOutcome {
                tasks,
                report,
                packaged: false,
            });
        }

        for task in &tasks {
            self.packager.package(task).await?;
        }

        Ok(PipelineOutcome {
            tasks,
            report,
            packaged: true,
        })
    }
}
