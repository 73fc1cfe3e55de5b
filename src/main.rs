use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use la_image_builder::build::gate::{CheckEntry, ValidationReport};
use la_image_builder::build::packager::PlanPackager;
use la_image_builder::config::{
    CacheConfig, DEFAULT_BUILD_CONFIG, DEFAULT_DEPENDENCIES_URL, DEFAULT_GITHUB_API_URL,
    DEFAULT_JAVA_VERSION, DEFAULT_NEXUS_BASE_URL, DEFAULT_SERVICES_DEFINITION, Endpoints,
};
use la_image_builder::dependency::RuntimeStrictness;
use la_image_builder::error::BuildError;
use la_image_builder::pipeline::{Pipeline, PipelineRequest, PipelineSettings};
use la_image_builder::service::definitions::load_selection;
use la_image_builder::service::{BuildMethod, CliOverrides};
use la_image_builder::version::fetcher::HttpFetcher;

#[derive(Parser)]
#[command(name = "la-image-builder")]
#[command(version, about = "Living Atlas docker image builder")]
struct Cli {
    /// Service(s) to build; repeatable
    #[arg(long = "service", value_name = "NAME")]
    services: Vec<String>,

    /// Build every service in the definitions file
    #[arg(long, conflicts_with_all = ["services", "from_file"])]
    all: bool,

    /// Build the services listed in a YAML/JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "services")]
    from_file: Option<PathBuf>,

    /// Force a specific version
    #[arg(long)]
    tag: Option<String>,

    /// Build several explicit versions (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "tag")]
    list_tags: Vec<String>,

    /// Build the last N versions found in Nexus or the repository tags
    #[arg(long, default_value_t = 1)]
    n_tags: usize,

    /// Override the Java version
    #[arg(long)]
    java_version: Option<String>,

    /// Override the base Java image
    #[arg(long = "java-base", value_name = "IMAGE")]
    java_base: Option<String>,

    #[arg(long, value_enum)]
    build_method: Option<BuildMethod>,

    /// Docker registry to push to
    #[arg(long)]
    registry: Option<String>,

    /// Override the git repository URL
    #[arg(long = "repo", value_name = "URL")]
    repo: Option<String>,

    #[arg(long)]
    branch: Option<String>,

    #[arg(long)]
    commit: Option<String>,

    /// Push images after a successful build
    #[arg(long)]
    push: bool,

    /// Only resolve versions and check artifact URLs
    #[arg(long)]
    check_only: bool,

    /// Ignore cached remote metadata
    #[arg(long)]
    refresh_cache: bool,

    /// Fail instead of falling back to Java 11 when no dependency rule applies
    #[arg(long)]
    strict: bool,

    /// Local build config overrides
    #[arg(long, default_value = DEFAULT_BUILD_CONFIG)]
    config: PathBuf,

    /// Service definitions
    #[arg(long, default_value = DEFAULT_SERVICES_DEFINITION)]
    defs: PathBuf,

    /// URL or path of dependencies.yaml used for Java version resolution
    #[arg(long, default_value = DEFAULT_DEPENDENCIES_URL)]
    dependencies: String,

    /// Directory for cached remote metadata
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_NEXUS_BASE_URL)]
    nexus_url: String,

    #[arg(long, default_value = DEFAULT_GITHUB_API_URL)]
    github_api: String,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> PipelineSettings {
        let mut cache = CacheConfig::default();
        if let Some(dir) = &self.cache_dir {
            cache.dir = dir.clone();
        }
        PipelineSettings {
            definitions_path: self.defs.clone(),
            overrides_path: self.config.clone(),
            dependencies: self.dependencies.clone(),
            endpoints: Endpoints {
                nexus_base_url: self.nexus_url.clone(),
                github_api_url: self.github_api.clone(),
                ..Endpoints::default()
            },
            cache,
        }
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            version: self.tag.clone(),
            registry: self.registry.clone(),
            build_method: self.build_method,
            java_version: self.java_version.clone(),
            java_base_image: self.java_base.clone(),
            repository: self.repo.clone(),
            branch: self.branch.clone(),
            commit: self.commit.clone(),
            push: self.push,
        }
    }

    fn strictness(&self) -> RuntimeStrictness {
        if self.strict {
            RuntimeStrictness::Strict
        } else {
            RuntimeStrictness::Permissive {
                default: DEFAULT_JAVA_VERSION.to_string(),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &ValidationReport) {
    for entry in &report.entries {
        match entry {
            CheckEntry::Checked(result) => {
                let status = if result.success { "OK  " } else { "FAIL" };
                println!("{} {}", status, result);
            }
            CheckEntry::Skipped { name, method } => {
                println!("SKIP {} (method: {})", name, method);
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pipeline = Pipeline::load(
        &cli.settings(),
        Arc::new(HttpFetcher::default()),
        Arc::new(PlanPackager),
        cli.refresh_cache,
    )
    .await?;

    let names = if cli.all {
        pipeline.definitions().names()
    } else if let Some(file) = &cli.from_file {
        load_selection(file)?
    } else {
        cli.services.clone()
    };

    if names.is_empty() {
        println!("No services selected to build.");
        return Ok(());
    }

    let request = PipelineRequest {
        names,
        cli: cli.overrides(),
        list_tags: cli.list_tags.clone(),
        n_tags: cli.n_tags,
        refresh: cli.refresh_cache,
        check_only: cli.check_only,
        strictness: cli.strictness(),
    };

    match pipeline.run(&request).await {
        Ok(outcome) => {
            print_report(&outcome.report);
            let done = if outcome.packaged {
                "planned"
            } else {
                "validated"
            };
            info!("{} task(s) {}", outcome.tasks.len(), done);
            Ok(())
        }
        Err(BuildError::ReachabilityFailure { report }) => {
            print_report(&report);
            println!("Nexus URL check failed for the following services:");
            for failure in report.failures() {
                println!("  - {}", failure);
            }
            error!("Aborting due to unreachable artifact URLs");
            Err(BuildError::ReachabilityFailure { report }.into())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
