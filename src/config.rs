use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Defaults
// =============================================================================

/// Docker registry images are tagged for unless overridden
pub const DEFAULT_REGISTRY: &str = "hub.docker.com/u/livingatlases";

/// Location of the dependency rule document used for Java version selection
pub const DEFAULT_DEPENDENCIES_URL: &str = "https://raw.githubusercontent.com/living-atlases/la-toolkit-backend/master/assets/dependencies.yaml";

/// Java version used when rules give no answer and resolution is permissive
pub const DEFAULT_JAVA_VERSION: &str = "11";

/// Base URL of the Nexus repository manager hosting release and snapshot artifacts
pub const DEFAULT_NEXUS_BASE_URL: &str = "https://nexus.ala.org.au/repository";

/// Maven group path shared by all Living Atlas artifacts
pub const DEFAULT_GROUP_PATH: &str = "au/org/ala";

/// Default base URL for GitHub API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

pub const DEFAULT_SERVICES_DEFINITION: &str = "services-definition.yml";
pub const DEFAULT_BUILD_CONFIG: &str = "build-config.yml";

pub const USER_AGENT: &str = "la-image-builder";

// =============================================================================
// Time-related constants
// =============================================================================

/// Cache entries older than this are treated as absent (24 hours)
pub const CACHE_FRESHNESS_SECS: u64 = 24 * 60 * 60;

/// Timeout for metadata and tag fetches (30 seconds)
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Timeout for artifact reachability probes (10 seconds)
pub const PROBE_TIMEOUT_SECS: u64 = 10;

/// Remote endpoints consulted while resolving versions and checking artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub nexus_base_url: String,
    pub group_path: String,
    pub github_api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nexus_base_url: DEFAULT_NEXUS_BASE_URL.to_string(),
            group_path: DEFAULT_GROUP_PATH.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub freshness: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: cache_dir(),
            freshness: Duration::from_secs(CACHE_FRESHNESS_SECS),
        }
    }
}

/// Returns the directory holding cached remote documents.
/// Uses $XDG_CACHE_HOME/la-docker-images if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/la-docker-images,
/// or ./la-docker-images if neither is available.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir())
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));

    cache_dir.join("la-docker-images")
}
