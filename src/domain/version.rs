use crate::error::{ReleaseError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Version used when a changelog has no prior release.
pub const INITIAL_VERSION: Version = Version::new(1, 0, 0);

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)\.([0-9]+)\.([0-9]+)").expect("valid version regex"))
}

fn strict_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("valid strict version regex")
    })
}

/// Semantic version representation
///
/// Ordering is lexicographic on (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `X.Y.Z` string with no prefix, suffix or whitespace.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = strict_version_regex().captures(input).ok_or_else(|| {
            ReleaseError::version(format!("Invalid version format: '{}' - expected X.Y.Z", input))
        })?;

        Self::from_components(&caps[1], &caps[2], &caps[3]).ok_or_else(|| {
            ReleaseError::version(format!("Version component out of range: '{}'", input))
        })
    }

    fn from_components(major: &str, minor: &str, patch: &str) -> Option<Self> {
        Some(Version {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
            patch: patch.parse().ok()?,
        })
    }

    /// Next patch release. Plain increment, never carries into minor.
    ///
    /// Fails when the patch component is already `u64::MAX`, since the
    /// result would not be greater than `self`.
    pub fn next_patch(&self) -> Result<Self> {
        let patch = self.patch.checked_add(1).ok_or_else(|| {
            ReleaseError::version(format!("Patch version of {} cannot be incremented", self))
        })?;
        Ok(Version {
            major: self.major,
            minor: self.minor,
            patch,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Where in the changelog to look for the latest released version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionScan {
    /// First `X.Y.Z` anywhere in the text.
    #[default]
    Anywhere,
    /// First `X.Y.Z` on a line starting with `#`.
    Headings,
}

/// Finds the first `X.Y.Z` substring anywhere in `text`.
///
/// The match is not anchored, so a version mentioned in prose before the
/// first release heading wins. Use [`extract_latest_version_with`] and
/// [`VersionScan::Headings`] to restrict the search.
///
/// # Returns
/// * `Ok(Some(version))` - The first triplet
/// * `Ok(None)` - No triplet in `text`
/// * `Err` - The first triplet has a component too large for `u64`
pub fn extract_latest_version(text: &str) -> Result<Option<Version>> {
    first_version_in(text)
}

/// Finds the latest released version using the given scan mode.
pub fn extract_latest_version_with(text: &str, scan: VersionScan) -> Result<Option<Version>> {
    match scan {
        VersionScan::Anywhere => first_version_in(text),
        VersionScan::Headings => {
            for line in text.lines().filter(|line| line.trim_start().starts_with('#')) {
                if let Some(version) = first_version_in(line)? {
                    return Ok(Some(version));
                }
            }
            Ok(None)
        }
    }
}

fn first_version_in(text: &str) -> Result<Option<Version>> {
    let Some(caps) = version_regex().captures(text) else {
        return Ok(None);
    };
    Version::from_components(&caps[1], &caps[2], &caps[3])
        .map(Some)
        .ok_or_else(|| {
            ReleaseError::version(format!(
                "Latest version '{}' in changelog is out of range",
                &caps[0]
            ))
        })
}

/// Suggested (and minimum) version for the upcoming release.
///
/// * `None` - [`INITIAL_VERSION`] (`1.0.0`)
/// * `Some(v)` - `v` with its patch component incremented, or an error if
///   the patch cannot grow
pub fn compute_next_version(latest: Option<Version>) -> Result<Version> {
    match latest {
        Some(version) => version.next_patch(),
        None => Ok(INITIAL_VERSION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_rejects_prefix_and_whitespace() {
        assert!(Version::parse("v1.2.3").is_err());
        assert!(Version::parse(" 1.2.3").is_err());
        assert!(Version::parse("1.2.3\n").is_err());
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("a.b.c").is_err());
    }

    #[test]
    fn test_version_parse_large_component() {
        assert_eq!(
            Version::parse("1.0.4294967296").unwrap(),
            Version::new(1, 0, 4_294_967_296)
        );
    }

    #[test]
    fn test_version_parse_overflow() {
        let err = Version::parse("1.2.99999999999999999999").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_version_ordering_is_tuple_wise() {
        assert!(Version::new(1, 2, 3) < Version::new(1, 3, 0));
        assert!(Version::new(1, 9, 9) < Version::new(2, 0, 0));
        assert!(Version::new(1, 2, 10) > Version::new(1, 2, 9));
    }

    #[test]
    fn test_extract_first_match() {
        let text = "# Changelog\n\n## v1.4.2\n\n## v1.4.1\n";
        assert_eq!(extract_latest_version(text).unwrap(), Some(Version::new(1, 4, 2)));
    }

    #[test]
    fn test_extract_matches_inside_prose() {
        let text = "Requires node 18.12.0 or later.\n\n## v2.0.0\n";
        assert_eq!(extract_latest_version(text).unwrap(), Some(Version::new(18, 12, 0)));
    }

    #[test]
    fn test_extract_headings_only() {
        let text = "Requires node 18.12.0 or later.\n\n## v2.0.0\n";
        assert_eq!(
            extract_latest_version_with(text, VersionScan::Headings).unwrap(),
            Some(Version::new(2, 0, 0))
        );
    }

    #[test]
    fn test_extract_not_found() {
        assert_eq!(extract_latest_version("").unwrap(), None);
        assert_eq!(extract_latest_version("## vNEXT\n\nDate: TBD").unwrap(), None);
        assert_eq!(extract_latest_version("1.2 and 3.4").unwrap(), None);
    }

    #[test]
    fn test_extract_overflowing_triplet_is_an_error() {
        let err = extract_latest_version("## v1.0.99999999999999999999").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(
            extract_latest_version_with("# 1.0.99999999999999999999", VersionScan::Headings)
                .is_err()
        );
    }

    #[test]
    fn test_extract_beyond_u32() {
        assert_eq!(
            extract_latest_version("## v1.0.99999999999").unwrap(),
            Some(Version::new(1, 0, 99_999_999_999))
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "## v0.3.7 - notes mention 9.9.9";
        assert_eq!(
            extract_latest_version(text).unwrap(),
            extract_latest_version(text).unwrap()
        );
    }

    #[test]
    fn test_next_version_default() {
        assert_eq!(compute_next_version(None).unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_next_version_bumps_patch_without_carry() {
        assert_eq!(
            compute_next_version(Some(Version::new(2, 3, 9))).unwrap(),
            Version::new(2, 3, 10)
        );
        assert_eq!(
            compute_next_version(Some(Version::new(0, 0, 0))).unwrap(),
            Version::new(0, 0, 1)
        );
    }

    #[test]
    fn test_next_version_is_always_greater() {
        let latest = extract_latest_version("## v1.0.4294967295").unwrap();
        let next = compute_next_version(latest).unwrap();
        assert_eq!(next, Version::new(1, 0, 4_294_967_296));
        assert!(Some(next) > latest);
    }

    #[test]
    fn test_next_version_patch_overflow_is_an_error() {
        let err = compute_next_version(Some(Version::new(1, 0, u64::MAX))).unwrap_err();
        assert!(err.to_string().starts_with("Version error"));
    }
}
