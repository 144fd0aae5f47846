//! Permissive version parsing for drupal.org and Packagist releases.
//!
//! Catalog version strings come in several shapes: plain semver (`5.0.3`),
//! legacy core-prefixed drupal.org releases (`8.x-1.0-rc17`), two-segment
//! versions (`3.16`) and the occasional malformed entry. Parsing never fails;
//! anything unreadable degrades to an empty version so callers can still
//! render a row for it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// Legacy `<core>.x-` branch marker, only when a version number follows it.
static LEGACY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\.x)-\d").unwrap());

/// First pre-release marker, introduced by `-` (release tags) or `@` (pins).
static STABILITY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-@]((?i:rc|beta|alpha))").unwrap());

/// Pre-release quality tier of a version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Stability {
    #[default]
    Stable,
    Rc,
    Beta,
    Alpha,
}

impl Stability {
    /// Composer stability flag, empty for stable releases
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Stable => "",
            Stability::Rc => "RC",
            Stability::Beta => "beta",
            Stability::Alpha => "alpha",
        }
    }

    fn from_marker(marker: &str) -> Self {
        match marker.to_ascii_lowercase().as_str() {
            "rc" => Stability::Rc,
            "beta" => Stability::Beta,
            "alpha" => Stability::Alpha,
            _ => Stability::Stable,
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed version string (`[<core>.x-]major[.minor[.patch]][-stability...]`)
///
/// Missing segments are `None`, which is distinct from an explicit zero when
/// rendering a pin but compares like zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version {
    /// Legacy branch marker such as `8.x`; informational only
    pub prefix: Option<String>,
    pub stability: Stability,
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
}

impl Version {
    /// Create a plain `major.minor.patch` version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            prefix: None,
            stability: Stability::Stable,
            major: Some(major),
            minor: Some(minor),
            patch: Some(patch),
        }
    }

    /// Parse a raw version string. Never fails.
    pub fn parse(raw: &str) -> Self {
        // Tag prefixes and constraint operators, so pins parse back to themselves
        let mut rest = raw.trim().trim_start_matches(['v', '^', '~', '=']);
        let mut version = Version::default();

        if let Some(caps) = LEGACY_PREFIX.captures(rest) {
            let prefix = &caps[1];
            version.prefix = Some(prefix.to_string());
            rest = &rest[prefix.len() + 1..];
        }

        if let Some(caps) = STABILITY_MARKER.captures(rest) {
            version.stability = Stability::from_marker(&caps[1]);
            if let Some(whole) = caps.get(0) {
                rest = &rest[..whole.start()];
            }
        }

        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return version;
        }

        let mut segments = rest.splitn(3, '.').map(leading_int);
        version.major = segments.next();
        version.minor = segments.next();
        version.patch = segments.next();
        version
    }

    /// Composer constraint for this version: caret on major.minor, patch
    /// dropped, stability flag appended.
    ///
    /// `5.0.3` → `^5.0`, `8.x-1.0-rc17` → `^1.0@RC`, `42` → `^42`
    pub fn pin(&self) -> String {
        let mut pin = format!("^{}", self.major.unwrap_or(0));
        if let Some(minor) = self.minor {
            pin.push('.');
            pin.push_str(&minor.to_string());
        }
        if self.stability != Stability::Stable {
            pin.push('@');
            pin.push_str(self.stability.as_str());
        }
        pin
    }

    /// Numeric ordering key, absent segments counted as zero
    pub fn ordinal(&self) -> (u64, u64, u64) {
        (
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }

    /// Three-way comparison on (major, minor, patch) only.
    ///
    /// Prefix and stability are ignored, so `3.0.0-rc21` and `3.0.0` compare
    /// equal. This is why `Version` does not implement `Ord`.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }

    /// Check if this version carries a pre-release marker
    pub fn is_prerelease(&self) -> bool {
        self.stability != Stability::Stable
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, "{}-", prefix)?;
        }
        let segments = [self.major, self.minor, self.patch];
        let mut first = true;
        for segment in segments.iter().map_while(|s| *s) {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        if self.is_prerelease() {
            write!(f, "-{}", self.stability)?;
        }
        Ok(())
    }
}

/// Leading decimal digits of a segment; `16abc` → 16, `x` → 0
fn leading_int(segment: &str) -> u64 {
    segment
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |n, digit| {
            n.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        // (input, prefix, major, minor, patch, stability)
        let cases: &[(&str, Option<&str>, Option<u64>, Option<u64>, Option<u64>, Stability)] = &[
            ("5.0.3", None, Some(5), Some(0), Some(3), Stability::Stable),
            ("8.x-3.16", Some("8.x"), Some(3), Some(16), None, Stability::Stable),
            ("11.1.0", None, Some(11), Some(1), Some(0), Stability::Stable),
            ("8.x-1.0-rc17", Some("8.x"), Some(1), Some(0), None, Stability::Rc),
            ("3.0.0-rc21", None, Some(3), Some(0), Some(0), Stability::Rc),
            ("2.0.0-beta3", None, Some(2), Some(0), Some(0), Stability::Beta),
            ("1.0.0-alpha1", None, Some(1), Some(0), Some(0), Stability::Alpha),
            ("12.x-1.0.3-beta5", Some("12.x"), Some(1), Some(0), Some(3), Stability::Beta),
            ("42", None, Some(42), None, None, Stability::Stable),
        ];

        for (input, prefix, major, minor, patch, stability) in cases {
            let v = Version::parse(input);
            assert_eq!(v.prefix.as_deref(), *prefix, "prefix of {}", input);
            assert_eq!(v.major, *major, "major of {}", input);
            assert_eq!(v.minor, *minor, "minor of {}", input);
            assert_eq!(v.patch, *patch, "patch of {}", input);
            assert_eq!(v.stability, *stability, "stability of {}", input);
        }
    }

    #[test]
    fn test_version_pin() {
        let cases = [
            ("5.0.3", "^5.0"),
            ("4.0.2", "^4.0"),
            ("11.1.0", "^11.1"),
            ("10.4.3", "^10.4"),
            ("13.0.1", "^13.0"),
            ("3.16", "^3.16"),
            ("8.x-3.16", "^3.16"),
            ("8.x-1.5", "^1.5"),
            ("8.x-2.0", "^2.0"),
            ("0.5.0", "^0.5"),
            ("8.x-1.0-rc17", "^1.0@RC"),
            ("3.0.0-rc21", "^3.0@RC"),
            ("2.1.0-RC3", "^2.1@RC"),
            ("2.0.0-beta3", "^2.0@beta"),
            ("8.x-4.0-beta1", "^4.0@beta"),
            ("1.0.0-alpha1", "^1.0@alpha"),
            ("8.x-2.0-alpha5", "^2.0@alpha"),
            ("42", "^42"),
        ];

        for (input, expected) in cases {
            assert_eq!(Version::parse(input).pin(), expected, "pin of {}", input);
        }
    }

    #[test]
    fn test_version_comparison() {
        let gt = |a: &str, b: &str| Version::parse(a).compare(&Version::parse(b));

        assert_eq!(gt("11.1.0", "10.4.3"), Ordering::Greater);
        assert_eq!(gt("10.4.3", "11.1.0"), Ordering::Less);
        assert_eq!(gt("4.0.2", "3.0.5"), Ordering::Greater);
        assert_eq!(gt("11.1.0", "11.0.8"), Ordering::Greater);
        assert_eq!(gt("8.x-1.5", "3.0.5"), Ordering::Less);
        assert_eq!(gt("3.0.5", "3.0.5"), Ordering::Equal);
        assert_eq!(gt("42", "11.1.0"), Ordering::Greater);
        assert_eq!(gt("3.16", "3.16.0"), Ordering::Equal);
    }

    #[test]
    fn test_stability_does_not_affect_order() {
        let rc = Version::parse("3.0.0-rc21");
        let stable = Version::parse("3.0.0");
        assert_eq!(rc.compare(&stable), Ordering::Equal);
        assert_ne!(rc, stable);
    }

    #[test]
    fn test_unparseable_input() {
        for input in ["", "dev-main", "x", "-rc1"] {
            let v = Version::parse(input);
            assert_eq!(v.major, None, "major of {:?}", input);
            assert_eq!(v.ordinal(), (0, 0, 0));
        }
        assert_eq!(Version::parse("dev-main").pin(), "^0");
    }

    #[test]
    fn test_trailing_garbage_in_segments() {
        let v = Version::parse("16abc");
        assert_eq!(v.major, Some(16));

        let v = Version::parse("1.0.x-dev");
        assert_eq!((v.major, v.minor, v.patch), (Some(1), Some(0), Some(0)));
        assert_eq!(v.stability, Stability::Stable);

        let v = Version::parse("1.2.3.4");
        assert_eq!(v.patch, Some(3));
    }

    #[test]
    fn test_prefix_without_number_is_not_stripped() {
        let v = Version::parse("8.x-dev");
        assert_eq!(v.prefix, None);
        assert_eq!(v.major, Some(8));
    }

    #[test]
    fn test_pins_parse_back() {
        for pin in ["^5.0", "^1.0@RC", "^2.0@beta", "^42", "~3.16"] {
            let reparsed = Version::parse(pin).pin();
            assert_eq!(reparsed, pin.replace('~', "^"));
        }
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::parse("8.x-1.0-rc17").to_string(), "8.x-1.0-RC");
        assert_eq!(Version::parse("v2.1.0").to_string(), "2.1.0");
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }
}
