// src/version.rs

//! Release version ordering for package-index queries
//!
//! PyPI version strings are not semver: they allow an arbitrary number of
//! release segments plus pre-release and post-release suffixes such as
//! `1.0.dev0`, `1.0rc2`, or `2.1.post1`. This module provides a lenient
//! total ordering used to sort release lists newest-first: semver-compliant
//! strings take a fast path, everything else is compared segment by segment.

use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// One parsed component of a version string
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Num(u64),
    Alpha(String),
}

/// Relative rank of an alphabetic segment.
///
/// Pre-release markers sort below a plain release, post-release markers
/// above it. Unrecognized words are treated as pre-release, matching how
/// the index treats arbitrary tags like `1.0.x`.
fn alpha_rank(s: &str) -> u8 {
    match s {
        "dev" => 0,
        "a" | "alpha" => 1,
        "b" | "beta" => 2,
        "c" | "rc" | "pre" | "preview" => 3,
        "post" | "rev" | "r" => 6,
        _ => 4,
    }
}

/// A package release version with lenient parsing
///
/// Parsing never fails; the original string is kept for display. Equality
/// follows the comparison, so `1.0` and `1.0.0` are equal despite their
/// different spellings.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl ReleaseVersion {
    /// Parse a version string into alternating numeric and alphabetic
    /// segments, discarding separators (`.`, `-`, `_`, `+`).
    pub fn parse(s: &str) -> Self {
        let mut segments = Vec::new();
        let mut chars = s.trim().chars().peekable();

        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    num.push(d);
                    chars.next();
                }
                // Very long numeric runs saturate rather than wrap
                segments.push(Segment::Num(num.parse::<u64>().unwrap_or(u64::MAX)));
            } else if c.is_ascii_alphabetic() {
                let mut word = String::new();
                while let Some(&a) = chars.peek() {
                    if !a.is_ascii_alphabetic() {
                        break;
                    }
                    word.push(a.to_ascii_lowercase());
                    chars.next();
                }
                segments.push(Segment::Alpha(word));
            } else {
                chars.next();
            }
        }

        Self {
            raw: s.trim().to_string(),
            segments,
        }
    }

    /// The original version string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compare two release versions
    pub fn compare(&self, other: &ReleaseVersion) -> Ordering {
        // Semver fast path for well-formed versions
        if let (Ok(a), Ok(b)) = (Version::parse(&self.raw), Version::parse(&other.raw)) {
            return a.cmp(&b);
        }

        let mut left = self.segments.iter();
        let mut right = other.segments.iter();

        loop {
            match (left.next(), right.next()) {
                (Some(Segment::Num(a)), Some(Segment::Num(b))) => match a.cmp(b) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
                (Some(Segment::Alpha(a)), Some(Segment::Alpha(b))) => {
                    match alpha_rank(a).cmp(&alpha_rank(b)) {
                        Ordering::Equal => match a.cmp(b) {
                            Ordering::Equal => {}
                            ord => return ord,
                        },
                        ord => return ord,
                    }
                }
                // A numeric segment outranks an alphabetic one at the same
                // position: 1.0.1 is newer than 1.0rc1
                (Some(Segment::Num(_)), Some(Segment::Alpha(_))) => return Ordering::Greater,
                (Some(Segment::Alpha(_)), Some(Segment::Num(_))) => return Ordering::Less,
                // Trailing segments: a numeric or post-release tail makes the
                // longer version newer, a pre-release tail makes it older
                (Some(seg), None) => {
                    return trailing_ordering(std::iter::once(seg).chain(left));
                }
                (None, Some(seg)) => {
                    return trailing_ordering(std::iter::once(seg).chain(right)).reverse();
                }
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

/// Ordering contribution of the segments present on only one side.
///
/// Trailing zeroes are skipped rather than decisive, so `1.0.0` still
/// equals `1.0` but `1.0.0.1` and `1.0.0.post1` are newer than it.
fn trailing_ordering<'a, I>(segments: I) -> Ordering
where
    I: IntoIterator<Item = &'a Segment>,
{
    for seg in segments {
        let ord = match seg {
            Segment::Num(0) => Ordering::Equal,
            Segment::Num(_) => Ordering::Greater,
            Segment::Alpha(a) if alpha_rank(a) > 4 => Ordering::Greater,
            Segment::Alpha(_) => Ordering::Less,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// Equality must agree with the ordering: two spellings of the same
// version compare Equal, so they must also be ==
impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort version strings newest-first
pub fn sort_newest_first(versions: &mut [String]) {
    versions.sort_by(|a, b| ReleaseVersion::parse(b).cmp(&ReleaseVersion::parse(a)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_newer(a: &str, b: &str) {
        assert_eq!(
            ReleaseVersion::parse(a).cmp(&ReleaseVersion::parse(b)),
            Ordering::Greater,
            "{} should be newer than {}",
            a,
            b
        );
    }

    #[test]
    fn test_simple_ordering() {
        assert_newer("1.0.3", "1.0.1");
        assert_newer("2.0.0", "1.9.9");
        assert_newer("1.10.0", "1.9.0");
    }

    #[test]
    fn test_different_lengths() {
        assert_newer("1.0.1", "1.0");
        assert_eq!(
            ReleaseVersion::parse("1.0").cmp(&ReleaseVersion::parse("1.0.0")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_segments_after_trailing_zero_still_compared() {
        assert_newer("1.0.0.1", "1.0");
        assert_newer("1.0.0.post1", "1.0");
        assert_newer("1.0", "1.0.0.dev1");
    }

    #[test]
    fn test_equality_agrees_with_ordering() {
        assert_eq!(ReleaseVersion::parse("1.0"), ReleaseVersion::parse("1.0.0"));
        assert_ne!(
            ReleaseVersion::parse("1.0"),
            ReleaseVersion::parse("1.0.0.1")
        );
        assert_ne!(
            ReleaseVersion::parse("1.0"),
            ReleaseVersion::parse("1.0.0.post1")
        );
    }

    #[test]
    fn test_dev_sorts_below_release() {
        assert_newer("1.0", "1.0.dev0");
        assert_newer("1.0.3", "1.0.3.dev2");
    }

    #[test]
    fn test_prerelease_ordering() {
        assert_newer("1.0", "1.0rc1");
        assert_newer("1.0rc1", "1.0b2");
        assert_newer("1.0b1", "1.0a2");
        assert_newer("1.0rc2", "1.0rc1");
    }

    #[test]
    fn test_post_release_sorts_above() {
        assert_newer("1.0.post1", "1.0");
        assert_newer("1.0.post2", "1.0.post1");
    }

    #[test]
    fn test_sort_newest_first() {
        let mut versions = vec![
            "1.0.dev0".to_string(),
            "1.2.0".to_string(),
            "0.9".to_string(),
            "1.2.0rc1".to_string(),
        ];
        sort_newest_first(&mut versions);
        assert_eq!(versions, vec!["1.2.0", "1.2.0rc1", "1.0.dev0", "0.9"]);
    }

    #[test]
    fn test_display_roundtrip() {
        let v = ReleaseVersion::parse(" 1.0.dev0 ");
        assert_eq!(v.as_str(), "1.0.dev0");
        assert_eq!(format!("{}", v), "1.0.dev0");
    }
}
