//! Version normalization and freshness checks

use std::{cmp::Ordering, str::FromStr};

use semver::Version;
use tracing::debug;

/// How the client's version is ordered against the latest release tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionOrdering {
    /// Plain string comparison. "9.0.0" sorts after "10.0.0".
    #[default]
    Lexicographic,
    /// Semantic version precedence, falling back to string comparison when
    /// either side does not parse.
    Semver,
}

impl VersionOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOrdering::Lexicographic => "lexicographic",
            VersionOrdering::Semver => "semver",
        }
    }
}

impl FromStr for VersionOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexicographic" | "string" => Ok(VersionOrdering::Lexicographic),
            "semver" | "semantic" => Ok(VersionOrdering::Semver),
            _ => Err(format!("Unknown version ordering: {}", s)),
        }
    }
}

impl std::fmt::Display for VersionOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strip one optional leading `v`
pub fn normalize(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// True when `current` is the same as or newer than `latest`.
///
/// Both arguments are expected to be normalized already.
pub fn is_up_to_date(current: &str, latest: &str, ordering: VersionOrdering) -> bool {
    let cmp = match ordering {
        VersionOrdering::Lexicographic => current.cmp(latest),
        VersionOrdering::Semver => match (Version::parse(current), Version::parse(latest)) {
            (Ok(current_ver), Ok(latest_ver)) => current_ver.cmp(&latest_ver),
            _ => {
                debug!(
                    "Falling back to string comparison for {} vs {}",
                    current, latest
                );
                current.cmp(latest)
            }
        },
    };

    cmp != Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("v1.2.3"), "1.2.3");
        assert_eq!(normalize("1.2.3"), "1.2.3");
        // only one prefix is removed
        assert_eq!(normalize("vv1.0.0"), "v1.0.0");
        assert_eq!(normalize("v"), "");
    }

    #[test]
    fn lexicographic_comparison() {
        let ordering = VersionOrdering::Lexicographic;
        assert!(is_up_to_date("1.4.0", "1.4.0", ordering));
        assert!(is_up_to_date("1.4.1", "1.4.0", ordering));
        assert!(!is_up_to_date("1.3.9", "1.4.0", ordering));
    }

    #[test]
    fn lexicographic_keeps_string_order_for_multi_digit_components() {
        // "9" sorts after "1", so a 1.10.0 release is not offered to 1.9.0
        assert!(is_up_to_date("1.9.0", "1.10.0", VersionOrdering::Lexicographic));
    }

    #[test]
    fn semver_comparison() {
        let ordering = VersionOrdering::Semver;
        assert!(!is_up_to_date("1.9.0", "1.10.0", ordering));
        assert!(is_up_to_date("1.10.0", "1.10.0", ordering));
        assert!(!is_up_to_date("1.0.0-beta.1", "1.0.0", ordering));
    }

    #[test]
    fn semver_falls_back_on_unparsable_versions() {
        assert!(is_up_to_date("nightly-b", "nightly-a", VersionOrdering::Semver));
        assert!(!is_up_to_date("1.0", "1.1", VersionOrdering::Semver));
    }

    #[test]
    fn test_parse_ordering() {
        assert_eq!(
            "semver".parse::<VersionOrdering>().unwrap(),
            VersionOrdering::Semver
        );
        assert_eq!(
            "Lexicographic".parse::<VersionOrdering>().unwrap(),
            VersionOrdering::Lexicographic
        );
        assert!("numeric".parse::<VersionOrdering>().is_err());
    }
}
