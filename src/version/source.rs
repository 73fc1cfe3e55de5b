//! Remote version discovery through the URL-keyed cache
//!
//! Every lookup here degrades to an empty result: failures are logged with the
//! component name and cause, never returned to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::version::cache::VersionCache;
use crate::version::error::RegistryError;
use crate::version::fetcher::Fetcher;
use crate::version::registries::{GitHubTagRegistry, NexusRegistry};
use crate::version::semver::take_last;
use crate::version::types::TagVersion;

/// Fetches `url` through `cache` and parses the payload.
///
/// A fresh cached payload is used unless `refresh` is set. Cached payloads that
/// no longer parse are dropped from the cache. Only payloads that parse are
/// written back.
pub async fn fetch_parsed<T, P>(
    fetcher: &dyn Fetcher,
    cache: &VersionCache,
    url: &str,
    refresh: bool,
    parse: P,
) -> Result<T, RegistryError>
where
    P: Fn(&str) -> Result<T, RegistryError>,
{
    if !refresh {
        let cached = cache
            .get(url)
            .inspect_err(|e| warn!("Failed to read cache for {}: {}", url, e))
            .ok()
            .flatten();

        if let Some(payload) = cached {
            match parse(&payload) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    debug!("Dropping cached payload for {}: {}", url, e);
                    let _ = cache
                        .invalidate(url)
                        .inspect_err(|e| warn!("Failed to invalidate {}: {}", url, e));
                }
            }
        }
    }

    let payload = fetcher.fetch_text(url).await?;
    let parsed = parse(&payload)?;

    let _ = cache
        .put(url, &payload)
        .inspect_err(|e| warn!("Failed to write cache for {}: {}", url, e));

    Ok(parsed)
}

/// Version lists from the package index and from repository tags
pub struct RemoteVersionSource {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<VersionCache>,
    nexus: NexusRegistry,
    github: GitHubTagRegistry,
}

impl RemoteVersionSource {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<VersionCache>,
        nexus: NexusRegistry,
        github: GitHubTagRegistry,
    ) -> Self {
        Self {
            fetcher,
            cache,
            nexus,
            github,
        }
    }

    pub fn nexus(&self) -> &NexusRegistry {
        &self.nexus
    }

    /// The last `n` published versions of `artifact_id`, oldest first
    pub async fn package_versions(
        &self,
        component: &str,
        artifact_id: &str,
        n: usize,
        refresh: bool,
    ) -> Vec<String> {
        let url = self.nexus.metadata_url(artifact_id);

        match fetch_parsed(
            self.fetcher.as_ref(),
            &self.cache,
            &url,
            refresh,
            NexusRegistry::parse_metadata,
        )
        .await
        {
            Ok(versions) => take_last(versions, n),
            Err(e) => {
                warn!(
                    "Could not list versions of {} from {}: {}",
                    component, url, e
                );
                Vec::new()
            }
        }
    }

    /// The last `n` tags of `repository_url`, ordered by their clean version
    pub async fn tag_versions(
        &self,
        component: &str,
        repository_url: &str,
        n: usize,
        refresh: bool,
    ) -> Vec<TagVersion> {
        let url = match self.github.tags_url(repository_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot list tags for {}: {}", component, e);
                return Vec::new();
            }
        };

        match fetch_parsed(
            self.fetcher.as_ref(),
            &self.cache,
            &url,
            refresh,
            GitHubTagRegistry::parse_tags,
        )
        .await
        {
            Ok(tags) => take_last(tags, n),
            Err(e) => {
                warn!("Could not list tags of {} from {}: {}", component, url, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::cache::tests::ManualClock;
    use crate::version::fetcher::MockFetcher;
    use mockall::predicate::eq;
    use std::time::Duration;
    use tempfile::TempDir;

    const METADATA_URL: &str =
        "https://nexus.example.org/repository/releases/au/org/ala/collectory/maven-metadata.xml";
    const TAGS_URL: &str =
        "https://api.example.org/repos/AtlasOfLivingAustralia/ala-hub/tags?per_page=100";

    const METADATA: &str = "<metadata><versioning><versions>\
        <version>1.0.0</version><version>1.2.0</version>\
        <version>1.10.0</version><version>1.9.0</version>\
        </versions></versioning></metadata>";
    const NEWER_METADATA: &str = "<metadata><version>2.0.0</version></metadata>";
    const TAGS: &str = r#"[{"name": "v3.0.0"}, {"name": "v2.10.0"}, {"name": "v2.9.0"}]"#;

    fn source_with(fetcher: MockFetcher) -> (TempDir, Arc<ManualClock>, RemoteVersionSource) {
        let temp_dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new());
        let cache = VersionCache::with_clock(
            temp_dir.path(),
            Duration::from_secs(24 * 60 * 60),
            clock.clone(),
        );
        let source = RemoteVersionSource::new(
            Arc::new(fetcher),
            Arc::new(cache),
            NexusRegistry::new("https://nexus.example.org/repository", "au/org/ala"),
            GitHubTagRegistry::new("https://api.example.org"),
        );
        (temp_dir, clock, source)
    }

    async fn collectory_versions(
        source: &RemoteVersionSource,
        n: usize,
        refresh: bool,
    ) -> Vec<String> {
        source
            .package_versions("collectory", "collectory", n, refresh)
            .await
    }

    #[tokio::test]
    async fn package_versions_returns_last_n_in_semver_order() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .with(eq(METADATA_URL))
            .times(1)
            .returning(|_| Ok(METADATA.to_string()));
        let (_dir, _clock, source) = source_with(fetcher);

        let versions = source
            .package_versions("collectory", "collectory", 2, false)
            .await;

        assert_eq!(versions, vec!["1.9.0", "1.10.0"]);
    }

    #[tokio::test]
    async fn package_versions_second_call_within_window_uses_cache() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|_| Ok(METADATA.to_string()));
        let (_dir, clock, source) = source_with(fetcher);

        let first = collectory_versions(&source, 10, false).await;
        clock.advance(Duration::from_secs(60 * 60));
        let second = collectory_versions(&source, 10, false).await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[tokio::test]
    async fn package_versions_fetches_again_after_window_expires() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(2)
            .returning(|_| Ok(METADATA.to_string()));
        let (_dir, clock, source) = source_with(fetcher);

        collectory_versions(&source, 1, false).await;
        clock.advance(Duration::from_secs(25 * 60 * 60));
        let versions = collectory_versions(&source, 1, false).await;

        assert_eq!(versions, vec!["1.10.0"]);
    }

    #[tokio::test]
    async fn package_versions_refresh_bypasses_cache_and_rewrites_it() {
        let mut fetcher = MockFetcher::new();
        let mut seq = mockall::Sequence::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(METADATA.to_string()));
        fetcher
            .expect_fetch_text()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(NEWER_METADATA.to_string()));
        let (_dir, _clock, source) = source_with(fetcher);

        collectory_versions(&source, 1, false).await;
        let refreshed = collectory_versions(&source, 1, true).await;
        let cached = collectory_versions(&source, 1, false).await;

        assert_eq!(refreshed, vec!["2.0.0"]);
        assert_eq!(cached, vec!["2.0.0"]);
    }

    #[tokio::test]
    async fn package_versions_degrades_to_empty_on_network_failure() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(|url| Err(RegistryError::NotFound(url.to_string())));
        let (_dir, _clock, source) = source_with(fetcher);

        let versions = collectory_versions(&source, 3, false).await;

        assert!(versions.is_empty());
    }

    #[tokio::test]
    async fn package_versions_does_not_cache_unparseable_payload() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(2)
            .returning(|_| Ok("<html>maintenance</html>".to_string()));
        let (_dir, _clock, source) = source_with(fetcher);

        assert!(collectory_versions(&source, 3, false).await.is_empty());
        assert!(collectory_versions(&source, 3, false).await.is_empty());
    }

    #[tokio::test]
    async fn package_versions_drops_cached_payload_that_no_longer_parses() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(1)
            .returning(|url| Err(RegistryError::NotFound(url.to_string())));
        let (_dir, _clock, source) = source_with(fetcher);
        let stale = "<html>stale</html>";
        source.cache.put(METADATA_URL, stale).unwrap();

        let versions = collectory_versions(&source, 3, false).await;

        assert!(versions.is_empty());
        assert_eq!(source.cache.get(METADATA_URL).unwrap(), None);
    }

    #[tokio::test]
    async fn tag_versions_returns_clean_and_original_names() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .with(eq(TAGS_URL))
            .times(1)
            .returning(|_| Ok(TAGS.to_string()));
        let (_dir, _clock, source) = source_with(fetcher);

        let tags = source
            .tag_versions(
                "ala-hub",
                "https://github.com/AtlasOfLivingAustralia/ala-hub.git",
                2,
                false,
            )
            .await;

        assert_eq!(
            tags,
            vec![
                TagVersion::new("2.10.0", "v2.10.0"),
                TagVersion::new("3.0.0", "v3.0.0"),
            ]
        );
    }

    #[tokio::test]
    async fn tag_versions_for_unsupported_host_is_empty_without_network_call() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().never();
        let (_dir, _clock, source) = source_with(fetcher);

        let tags = source
            .tag_versions("ala-hub", "https://gitlab.com/ala/ala-hub", 5, false)
            .await;

        assert!(tags.is_empty());
    }
}
