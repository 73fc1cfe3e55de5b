//! GitHub tags API URL layout and response parsing

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::DEFAULT_GITHUB_API_URL;
use crate::version::error::RegistryError;
use crate::version::semver::sort_by_version;
use crate::version::types::TagVersion;

static REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://(?:www\.)?github\.com/|git@github\.com:|ssh://git@github\.com/)([^/\s]+)/([^/\s]+?)(?:\.git)?/?$",
    )
    .expect("repository pattern is valid")
});

/// Page size requested from the tags endpoint, the maximum GitHub allows
const TAGS_PER_PAGE: u32 = 100;

/// Optional `name-`/`name_` prefix and `v` marker in front of the numeric part
static TAG_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z_.-]*?[-_])?[vV]?(\d.*)$").expect("tag pattern is valid")
});

/// Response item from GitHub tags API
#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// URL layout of the GitHub REST API for repository tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubTagRegistry {
    api_url: String,
}

impl GitHubTagRegistry {
    /// Creates a new GitHubTagRegistry with a custom API base URL
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Splits a github.com repository URL into `(owner, repo)`
    pub fn parse_repository(repository_url: &str) -> Option<(String, String)> {
        let captures = REPOSITORY_RE.captures(repository_url.trim())?;
        Some((captures[1].to_string(), captures[2].to_string()))
    }

    /// Tags endpoint for a repository, or `UnsupportedRepository` for other hosts
    pub fn tags_url(&self, repository_url: &str) -> Result<String, RegistryError> {
        let (owner, repo) = Self::parse_repository(repository_url)
            .ok_or_else(|| RegistryError::UnsupportedRepository(repository_url.to_string()))?;
        Ok(format!(
            "{}/repos/{}/{}/tags?per_page={}",
            self.api_url, owner, repo, TAGS_PER_PAGE
        ))
    }

    /// Parses a tags response into `(clean version, original tag)` pairs sorted oldest to newest.
    ///
    /// Tags without a numeric part are dropped.
    pub fn parse_tags(body: &str) -> Result<Vec<TagVersion>, RegistryError> {
        let tags: Vec<Tag> = serde_json::from_str(body)
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        let mut versions: Vec<TagVersion> = tags
            .into_iter()
            .filter_map(|tag| {
                clean_version(&tag.name).map(|version| TagVersion {
                    version,
                    tag: tag.name,
                })
            })
            .collect();

        sort_by_version(&mut versions, |t| t.version.as_str());
        Ok(versions)
    }
}

impl Default for GitHubTagRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_API_URL)
    }
}

/// Strips a leading project-name prefix and `v` marker from a tag name.
///
/// `None` for tags without a numeric part.
pub fn clean_version(tag: &str) -> Option<String> {
    TAG_PREFIX_RE
        .captures(tag)
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/ala/collectory", Some(("ala", "collectory")))]
    #[case("https://github.com/ala/collectory.git", Some(("ala", "collectory")))]
    #[case("https://github.com/ala/collectory/", Some(("ala", "collectory")))]
    #[case("https://www.github.com/ala/collectory", Some(("ala", "collectory")))]
    #[case("git@github.com:gbif/pipelines.git", Some(("gbif", "pipelines")))]
    #[case("https://gitlab.com/owner/repo", None)]
    #[case("https://github.com/owner", None)]
    #[case("", None)]
    fn parse_repository_accepts_only_github(
        #[case] url: &str,
        #[case] expected: Option<(&str, &str)>,
    ) {
        assert_eq!(
            GitHubTagRegistry::parse_repository(url),
            expected.map(|(o, r)| (o.to_string(), r.to_string()))
        );
    }

    #[test]
    fn tags_url_uses_repos_endpoint() {
        let registry = GitHubTagRegistry::new("https://api.github.com/");

        assert_eq!(
            registry
                .tags_url("https://github.com/AtlasOfLivingAustralia/ala-hub")
                .unwrap(),
            "https://api.github.com/repos/AtlasOfLivingAustralia/ala-hub/tags?per_page=100"
        );
    }

    #[test]
    fn tags_url_rejects_other_hosts() {
        let registry = GitHubTagRegistry::default();

        let result = registry.tags_url("https://bitbucket.org/owner/repo");

        assert!(matches!(
            result,
            Err(RegistryError::UnsupportedRepository(_))
        ));
    }

    #[rstest]
    #[case("v1.2.0", Some("1.2.0"))]
    #[case("1.2.0", Some("1.2.0"))]
    #[case("collectory-1.2.0", Some("1.2.0"))]
    #[case("ala-hub-4.0.1", Some("4.0.1"))]
    #[case("release_v3.0", Some("3.0"))]
    #[case("V2", Some("2"))]
    #[case("v2.0-fix-3", Some("2.0-fix-3"))]
    #[case("nightly", None)]
    #[case("", None)]
    fn clean_version_strips_prefixes(#[case] tag: &str, #[case] expected: Option<&str>) {
        assert_eq!(clean_version(tag).as_deref(), expected);
    }

    #[test]
    fn parse_tags_sorts_by_clean_version_and_keeps_original_tag() {
        let body = r#"[
            {"name": "v2.10.0", "commit": {"sha": "a"}},
            {"name": "v2.9.0", "commit": {"sha": "b"}},
            {"name": "collectory-3.0.0", "commit": {"sha": "c"}}
        ]"#;

        let tags = GitHubTagRegistry::parse_tags(body).unwrap();

        assert_eq!(
            tags,
            vec![
                TagVersion::new("2.9.0", "v2.9.0"),
                TagVersion::new("2.10.0", "v2.10.0"),
                TagVersion::new("3.0.0", "collectory-3.0.0"),
            ]
        );
    }

    #[test]
    fn parse_tags_drops_tags_without_version_number() {
        let body = r#"[{"name": "v2.10.0"}, {"name": "v2.9.0"}, {"name": "nightly"}]"#;

        let tags = GitHubTagRegistry::parse_tags(body).unwrap();

        assert_eq!(
            tags,
            vec![
                TagVersion::new("2.9.0", "v2.9.0"),
                TagVersion::new("2.10.0", "v2.10.0"),
            ]
        );
    }

    #[test]
    fn parse_tags_returns_empty_for_repo_without_tags() {
        assert!(GitHubTagRegistry::parse_tags("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_tags_rejects_non_list_payload() {
        let result = GitHubTagRegistry::parse_tags(r#"{"message": "Not Found"}"#);

        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }
}
