//! Segment descriptors and the set handed to the composer

use crate::error::{MergeError, Result};
use std::path::PathBuf;

/// One input binary and the absolute offset its first byte lands on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub offset: u64,
    pub source: PathBuf,
}

impl Segment {
    pub fn new(offset: u64, source: impl Into<PathBuf>) -> Self {
        Self {
            offset,
            source: source.into(),
        }
    }
}

/// Unordered collection of segments.
///
/// Callers may push segments in any order; [`SegmentSet::sorted`] yields
/// them by ascending offset, keeping input order for equal offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSet {
    segments: Vec<Segment>,
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Add a segment, builder style
    pub fn segment(mut self, offset: u64, source: impl Into<PathBuf>) -> Self {
        self.push(Segment::new(offset, source));
        self
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Segments in processing order
    pub fn sorted(&self) -> Vec<&Segment> {
        let mut sorted: Vec<&Segment> = self.segments.iter().collect();
        sorted.sort_by_key(|s| s.offset);
        sorted
    }
}

impl FromIterator<Segment> for SegmentSet {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Extend<Segment> for SegmentSet {
    fn extend<I: IntoIterator<Item = Segment>>(&mut self, iter: I) {
        self.segments.extend(iter);
    }
}

impl IntoIterator for SegmentSet {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

/// Parse a flash offset written in hexadecimal.
///
/// The `0x`/`0X` prefix is optional: flasher manifests write offsets as
/// bare hex digits as often as prefixed ones.
pub fn parse_offset(s: &str) -> Result<u64> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MergeError::invalid_offset(s));
    }

    u64::from_str_radix(digits, 16).map_err(|_| MergeError::invalid_offset(s))
}
