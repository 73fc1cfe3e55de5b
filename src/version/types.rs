//! Common types for remote version sources

/// A repository tag together with the version it denotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVersion {
    /// Tag name with any project prefix and `v` marker removed
    pub version: String,
    /// Tag name exactly as published, usable as a git reference
    pub tag: String,
}

impl TagVersion {
    pub fn new(version: &str, tag: &str) -> Self {
        Self {
            version: version.to_string(),
            tag: tag.to_string(),
        }
    }
}
