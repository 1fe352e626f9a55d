//! Genomic coordinates.
//!
//! Coordinates are always stored 0-indexed and half-open. The 1-indexed,
//! inclusive notation (`chr1:1-10`) is only used at the text boundary via
//! [`GenomicRegion::parse_one_indexed`] and [`GenomicRegion::to_one_indexed`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegionError;

/// A half-open interval `[start, end)` on a sequence.
///
/// Start/end are `u64` to fit genomes which overflow `u32`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct GenomicInterval {
    /// First base, 0-indexed.
    pub start: u64,
    /// One past the last base.
    pub end: u64,
}

impl GenomicInterval {
    /// Create an interval, rejecting `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidRange`] if `end < start`.
    pub fn new(start: u64, end: u64) -> Result<Self, RegionError> {
        if end < start {
            return Err(RegionError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of bases covered. Zero for empty or reverse-ordered intervals.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the interval covers no bases.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `start <= end`. Intervals built through deserialization are
    /// not validated, so renderers check this before drawing.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &GenomicInterval) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A named sequence plus an interval on it.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicRegion {
    /// Chromosome or contig name.
    pub seq_name: String,
    /// Covered interval.
    pub interval: GenomicInterval,
}

impl GenomicRegion {
    /// Create a region from 0-indexed, half-open coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidRange`] if `end < start`.
    pub fn new(seq_name: impl Into<String>, start: u64, end: u64) -> Result<Self, RegionError> {
        Ok(Self {
            seq_name: seq_name.into(),
            interval: GenomicInterval::new(start, end)?,
        })
    }

    /// First base, 0-indexed.
    pub fn start(&self) -> u64 {
        self.interval.start
    }

    /// One past the last base.
    pub fn end(&self) -> u64 {
        self.interval.end
    }

    /// Number of bases covered.
    pub fn len(&self) -> u64 {
        self.interval.len()
    }

    /// Whether the region covers no bases.
    pub fn is_empty(&self) -> bool {
        self.interval.is_empty()
    }

    /// Parse a 1-indexed, inclusive region string (`chr1:1,000-2,000`).
    ///
    /// The sequence name is everything before the last `:`, and thousands
    /// separators in coordinates are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`RegionError`] if the string is malformed, a coordinate is
    /// not a number, the start is zero or the end precedes the start.
    pub fn parse_one_indexed(s: &str) -> Result<Self, RegionError> {
        let (seq_name, rest) = s
            .rsplit_once(':')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        let (start_str, end_str) = rest
            .split_once('-')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        if seq_name.is_empty() {
            return Err(RegionError::InvalidFormat(s.to_string()));
        }
        let start: u64 = start_str.trim().replace(',', "").parse()?;
        let end: u64 = end_str.trim().replace(',', "").parse()?;
        if start == 0 || end < start - 1 {
            return Err(RegionError::InvalidRange { start, end });
        }
        Self::new(seq_name, start - 1, end)
    }

    /// Format as a 1-indexed, inclusive region string.
    pub fn to_one_indexed(&self) -> String {
        format!(
            "{}:{}-{}",
            self.seq_name,
            self.interval.start.saturating_add(1),
            self.interval.end
        )
    }
}

/// 0-indexed, half-open display (`chr1:0-10`).
impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.seq_name, self.interval)
    }
}

/// Parses the 1-indexed notation, see [`GenomicRegion::parse_one_indexed`].
impl FromStr for GenomicRegion {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_one_indexed(s)
    }
}

/// Length in bases of a region.
pub fn get_length(region: &GenomicRegion) -> u64 {
    region.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_one_indexed_region() {
        let region: GenomicRegion = "X:1-10".parse().unwrap();
        assert_eq!(region, GenomicRegion::new("X", 0, 10).unwrap());
        assert_eq!(region.to_one_indexed(), "X:1-10");
    }

    #[test]
    fn parse_with_thousands_separators() {
        let region = GenomicRegion::parse_one_indexed("chr17:10,958,130-11,017,414").unwrap();
        assert_eq!(region.seq_name, "chr17");
        assert_eq!(region.start(), 10_958_129);
        assert_eq!(region.end(), 11_017_414);
    }

    #[test]
    fn parse_name_containing_colon() {
        let region = GenomicRegion::parse_one_indexed("HLA-A*01:01:1-5").unwrap();
        assert_eq!(region.seq_name, "HLA-A*01:01");
        assert_eq!(region.len(), 5);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("chr1".parse::<GenomicRegion>().is_err());
        assert!("chr1:100".parse::<GenomicRegion>().is_err());
        assert!("chr1:abc-def".parse::<GenomicRegion>().is_err());
        assert!(":1-10".parse::<GenomicRegion>().is_err());
        assert!("chr1:0-10".parse::<GenomicRegion>().is_err());
        assert!("chr1:20-10".parse::<GenomicRegion>().is_err());
    }

    #[test]
    fn parse_end_at_coordinate_limit() {
        let region = GenomicRegion::parse_one_indexed("X:5-18446744073709551615").unwrap();
        assert_eq!(region.start(), 4);
        assert_eq!(region.end(), u64::MAX);
        assert_eq!(region.to_one_indexed(), "X:5-18446744073709551615");

        let last = GenomicRegion::new("X", u64::MAX, u64::MAX).unwrap();
        assert_eq!(last.to_one_indexed(), "X:18446744073709551615-18446744073709551615");
    }

    #[test]
    fn single_base_region() {
        let region = GenomicRegion::parse_one_indexed("chr2:5-5").unwrap();
        assert_eq!(get_length(&region), 1);
        assert_eq!(region.to_one_indexed(), "chr2:5-5");
    }

    #[test]
    fn length_matches_interval_width() {
        for (start, end) in [(0, 0), (0, 1), (10, 25), (3_000_000_000, 3_000_000_100)] {
            let region = GenomicRegion::new("chr1", start, end).unwrap();
            assert_eq!(get_length(&region), end - start);
        }
        assert!(GenomicRegion::new("chr1", 5, 5).unwrap().is_empty());
    }

    #[test]
    fn reverse_interval_is_rejected() {
        assert!(GenomicInterval::new(100, 0).is_err());
        assert!(GenomicRegion::new("X", 100, 0).is_err());
    }

    #[test]
    fn deserialized_reverse_interval_is_flagged() {
        let interval: GenomicInterval = serde_json::from_str(r#"{"start":9,"end":3}"#).unwrap();
        assert!(!interval.is_well_formed());
        assert_eq!(interval.len(), 0);
    }

    #[test]
    fn display_is_zero_indexed() {
        let region = GenomicRegion::new("chrX", 1, 10000).unwrap();
        assert_eq!(region.to_string(), "chrX:1-10000");
        assert_eq!(region.interval.to_string(), "1-10000");
    }

    #[test]
    fn contains_interval() {
        let outer = GenomicInterval::new(10, 100).unwrap();
        assert!(outer.contains(&GenomicInterval::new(10, 100).unwrap()));
        assert!(outer.contains(&GenomicInterval::new(50, 60).unwrap()));
        assert!(!outer.contains(&GenomicInterval::new(5, 60).unwrap()));
    }
}
