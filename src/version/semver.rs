use semver::Version;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros, keeping any
/// pre-release or build suffix attached to the padded core. A single leading
/// `v` is accepted.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "2.3" -> Version(2, 3, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
/// - "3.0-SNAPSHOT" -> Version(3, 0, 0, pre: SNAPSHOT)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);

    let split_at = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split_at);

    let parts: Vec<&str> = core.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Sort items ascending by the version string `key` extracts.
///
/// Semantic order is used when every key parses; a single unparseable key
/// switches the whole sequence to plain lexical order.
pub fn sort_by_version<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    let all_parse = items.iter().all(|item| parse_version(key(item)).is_some());

    if all_parse {
        items.sort_by_cached_key(|item| parse_version(key(item)));
    } else {
        items.sort_by(|a, b| key(a).cmp(key(b)));
    }
}

/// Keep only the last `n` items of an ascending sequence.
pub fn take_last<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(n);
    items.drain(..skip);
    items
}
