//! Schema version representation.
//!
//! Snapshots carry a semantic version (`MAJOR.MINOR.PATCH[-PRERELEASE]`). The
//! regression gate treats a major bump between two snapshots as an explicit
//! acknowledgment of breaking changes.
use std::cmp::Ordering;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::TypesError;

/// A parsed schema version.
///
/// Accepts `1.2.3`, `v1.2.3` and `2.0.0-alpha.1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaVersion {
    /// Original version string.
    pub version_string: String,
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
    /// Pre-release label (e.g. `alpha.1`).
    pub prerelease: Option<String>,
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)).then_with(
            || match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            },
        )
    }
}

fn parse_component(s: &str) -> std::result::Result<u32, TypesError> {
    s.parse().map_err(|e: std::num::ParseIntError| TypesError::VersionParse(e.to_string()))
}

impl SchemaVersion {
    /// Parse a version string.
    pub fn parse(s: &str) -> std::result::Result<Self, TypesError> {
        let re = Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z.-]+))?$")
            .map_err(|e| TypesError::VersionParse(e.to_string()))?;
        let caps = re.captures(s).ok_or_else(|| TypesError::InvalidVersion(s.to_string()))?;

        Ok(Self {
            version_string: s.to_string(),
            major: parse_component(&caps[1])?,
            minor: parse_component(&caps[2])?,
            patch: parse_component(&caps[3])?,
            prerelease: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    /// Original version string.
    pub fn as_str(&self) -> &str { &self.version_string }

    /// Whether `self` bumps the major component relative to `previous`.
    pub fn is_major_bump_from(&self, previous: &Self) -> bool { self.major > previous.major }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.version_string)
    }
}

impl std::str::FromStr for SchemaVersion {
    type Err = TypesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> { Self::parse(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_and_prerelease() {
        let v = SchemaVersion::parse("2.0.0-alpha.1").expect("parse");
        assert_eq!((v.major, v.minor, v.patch), (2, 0, 0));
        assert_eq!(v.prerelease.as_deref(), Some("alpha.1"));

        let v = SchemaVersion::parse("v1.4.2").expect("parse");
        assert_eq!(v.prerelease, None);
        assert_eq!(v.to_string(), "v1.4.2");
    }

    #[test]
    fn test_rejects_partial_versions() {
        assert!(matches!(SchemaVersion::parse("1.2"), Err(TypesError::InvalidVersion(_))));
        assert!(SchemaVersion::parse("latest").is_err());
    }

    #[test]
    fn test_ordering_puts_prerelease_first() {
        let alpha: SchemaVersion = "2.0.0-alpha.1".parse().expect("parse");
        let release: SchemaVersion = "2.0.0".parse().expect("parse");
        let old: SchemaVersion = "1.9.9".parse().expect("parse");
        assert!(alpha < release);
        assert!(old < alpha);
    }

    #[test]
    fn test_major_bump() {
        let one: SchemaVersion = "1.3.0".parse().expect("parse");
        let two: SchemaVersion = "2.0.0".parse().expect("parse");
        assert!(two.is_major_bump_from(&one));
        assert!(!one.is_major_bump_from(&two));
        assert!(!one.is_major_bump_from(&one));
    }
}
