use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("invalid region format: expected 'chr:start-end', got '{0}'")]
    InvalidFormat(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] std::num::ParseIntError),
    #[error("start ({start}) must not be greater than end ({end})")]
    InvalidRange { start: u64, end: u64 },
}

/// Return whether the half-open ranges `[start1, end1)` and `[start2, end2)` overlap.
///
/// Ranges that only touch (`end1 == start2`) do not overlap.
pub fn overlaps(start1: u64, end1: u64, start2: u64, end2: u64) -> bool {
    start1 < end2 && end1 > start2
}

/// A genomic region specified as chromosome:start-end (0-based, half-open).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Result<Self, RegionError> {
        if start > end {
            return Err(RegionError::InvalidRange { start, end });
        }
        Ok(Self {
            chrom: chrom.into(),
            start,
            end,
        })
    }

    /// Length of the region in bases.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `[start, end)` overlaps this region.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        overlaps(self.start, self.end, start, end)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chrom, rest) = s
            .rsplit_once(':')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        if chrom.is_empty() {
            return Err(RegionError::InvalidFormat(s.to_string()));
        }
        let (start_str, end_str) = rest
            .split_once('-')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        let start: u64 = start_str.replace(',', "").parse()?;
        let end: u64 = end_str.replace(',', "").parse()?;
        Region::new(chrom, start, end)
    }
}
