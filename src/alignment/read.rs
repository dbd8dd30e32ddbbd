use crate::alignment::cigar::CigarKind;
use crate::region::overlaps;

/// Letter shown for reference positions a read deletes or skips.
pub const PLACEHOLDER_LETTER: u8 = b'-';

/// Quality assigned to placeholder pieces.
pub const PLACEHOLDER_QUALITY: u8 = 100;

/// One displayed base of a decoded read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPiece {
    /// Base letter, or [`PLACEHOLDER_LETTER`] for deletions and skips.
    pub letter: u8,
    /// 0-based reference position occupied by this piece.
    pub position: u64,
    /// Phred quality, or [`PLACEHOLDER_QUALITY`] for placeholders.
    pub quality: u8,
    /// The CIGAR operation that produced this piece.
    pub kind: CigarKind,
}

impl ReadPiece {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, CigarKind::Deletion | CigarKind::Skip)
    }
}

/// Level of detail a decoded read carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadDetail {
    /// Span only; per-base pieces have been dropped.
    Summary,
    /// Full per-base pieces in reference order.
    WithBases(Vec<ReadPiece>),
}

impl ReadDetail {
    pub fn has_bases(&self) -> bool {
        matches!(self, ReadDetail::WithBases(_))
    }

    pub fn pieces(&self) -> &[ReadPiece] {
        match self {
            ReadDetail::Summary => &[],
            ReadDetail::WithBases(pieces) => pieces,
        }
    }
}

/// An alignment record decoded for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRead {
    /// Derived identity: name (or backend id) + position + CIGAR text.
    pub id: String,
    pub name: String,
    /// Start of the half-open reference span `[position, end)`.
    pub position: u64,
    pub end: u64,
    pub detail: ReadDetail,
    pub reverse: bool,
    /// Display lane. Overlapping reads never share a lane.
    pub lane: usize,
    /// Set when the record had no usable CIGAR.
    pub unmapped: bool,
    pub cigar: Option<String>,
    pub flags: u32,
    pub mate_position: Option<u64>,
    pub mapping_quality: Option<u32>,
    /// Index of the record within the batch it was decoded from.
    pub index: usize,
}

impl DecodedRead {
    /// Number of reference positions covered.
    pub fn len(&self) -> u64 {
        self.end - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.position
    }

    pub fn has_bases(&self) -> bool {
        self.detail.has_bases()
    }

    pub fn pieces(&self) -> &[ReadPiece] {
        self.detail.pieces()
    }

    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        overlaps(self.position, self.end, start, end)
    }

    /// Drop per-base pieces, keeping span and lane.
    pub fn strip_bases(&mut self) {
        self.detail = ReadDetail::Summary;
    }

    /// Consume the read, returning it without per-base pieces.
    pub fn into_summary(mut self) -> Self {
        self.strip_bases();
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A read spanning `[position, end)` with one `M` piece per position.
    pub fn read_with_bases(id: &str, position: u64, end: u64) -> DecodedRead {
        let pieces = (position..end)
            .map(|p| ReadPiece {
                letter: b'A',
                position: p,
                quality: 30,
                kind: CigarKind::Match,
            })
            .collect();
        DecodedRead {
            id: id.to_string(),
            name: id.to_string(),
            position,
            end,
            detail: ReadDetail::WithBases(pieces),
            reverse: false,
            lane: 0,
            unmapped: false,
            cigar: Some(format!("{}M", end - position)),
            flags: 0,
            mate_position: None,
            mapping_quality: None,
            index: 0,
        }
    }

    pub fn summary_read(id: &str, position: u64, end: u64) -> DecodedRead {
        read_with_bases(id, position, end).into_summary()
    }
}
