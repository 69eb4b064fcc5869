//! Module version strings
//!
//! Module versions are semantic versions with a mandatory `v` prefix
//! (`v1.2.3`, `v1.2.3-pre.1`, `v2.0.0+incompatible`). The shorthands `v1` and
//! `v1.2` are valid and stand for `v1.0.0` and `v1.2.0`; shorthands may not
//! carry a pre-release or build suffix.

use std::cmp::Ordering;

use semver::Version;

/// Parse a module version into a semver::Version.
///
/// Returns None for anything `is_valid_version` rejects.
pub fn parse_version(version: &str) -> Option<Version> {
    let stripped = version.strip_prefix('v')?;
    let is_shorthand = !stripped.contains(['-', '+']);
    let parts: Vec<&str> = stripped.split('.').collect();
    let normalized = match parts.len() {
        1 if is_shorthand => format!("{}.0.0", parts[0]),
        2 if is_shorthand => format!("{}.{}.0", parts[0], parts[1]),
        _ => stripped.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Reports whether `version` is a valid module version.
pub fn is_valid_version(version: &str) -> bool {
    parse_version(version).is_some()
}

/// Returns the major version prefix of `version` (e.g. "v2" for "v2.3.4").
pub fn major(version: &str) -> Option<String> {
    parse_version(version).map(|v| format!("v{}", v.major))
}

/// Compare two module versions. Invalid versions sort before valid ones.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Find the latest version from a list
///
/// Release versions win over pre-releases; pre-releases are only considered
/// when no release exists. Invalid versions are skipped.
pub fn find_latest<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let parsed: Vec<(&str, Version)> = versions
        .into_iter()
        .filter_map(|v| parse_version(v).map(|parsed| (v, parsed)))
        .collect();

    let has_release = parsed.iter().any(|(_, v)| v.pre.is_empty());
    parsed
        .into_iter()
        .filter(|(_, v)| !has_release || v.pre.is_empty())
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(original, _)| original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v1.2.3", true)]
    #[case("v1.2", true)]
    #[case("v1", true)]
    #[case("v1.2.3-pre.1", true)]
    #[case("v2.0.0+incompatible", true)]
    #[case("v0.0.0-20210101000000-abcdef123456", true)]
    #[case("", false)]
    #[case("1.2.3", false)]
    #[case("v1.2-pre", false)]
    #[case("v1.02.3", false)]
    #[case("v1.2.3.4", false)]
    #[case("master", false)]
    #[case("latest", false)]
    fn is_valid_version_returns_expected(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(is_valid_version(version), expected);
    }

    #[rstest]
    #[case("v1.0.0", "v1.0.0", Ordering::Equal)]
    #[case("v1.0.0", "v1.0.1", Ordering::Less)]
    #[case("v2.0.0", "v1.9.9", Ordering::Greater)]
    #[case("v1.0.0-beta", "v1.0.0", Ordering::Less)]
    #[case("v1", "v1.0.0", Ordering::Equal)]
    #[case("bogus", "v0.0.1", Ordering::Less)]
    fn compare_versions_returns_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_versions(a, b), expected);
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec!["v1.0.0", "v2.0.0", "v1.5.0"], Some("v2.0.0"))]
    #[case(vec!["v1.0.0", "v2.0.0-beta.1"], Some("v1.0.0"))]
    #[case(vec!["v2.0.0-beta.1", "v2.0.0-alpha"], Some("v2.0.0-beta.1"))]
    #[case(vec!["invalid", "v1.0.0", "not-semver"], Some("v1.0.0"))]
    #[case(vec!["invalid", "not-semver"], None)]
    fn find_latest_returns_expected(#[case] versions: Vec<&str>, #[case] expected: Option<&str>) {
        assert_eq!(find_latest(versions), expected);
    }

    #[test]
    fn major_returns_major_prefix() {
        assert_eq!(major("v2.3.4"), Some("v2".to_string()));
        assert_eq!(major("v0.1.0-pre"), Some("v0".to_string()));
        assert_eq!(major("nope"), None);
    }
}
