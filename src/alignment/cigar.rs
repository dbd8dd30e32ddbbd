use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CigarError {
    #[error("empty CIGAR string")]
    Empty,
    #[error("CIGAR operation '{op}' at offset {offset} has no length")]
    MissingLength { op: char, offset: usize },
    #[error("CIGAR ends with a length but no operation: '{0}'")]
    TrailingLength(String),
    #[error("unknown CIGAR operation '{op}' at offset {offset}")]
    UnknownOp { op: char, offset: usize },
    #[error("invalid CIGAR length '{0}'")]
    InvalidLength(String),
    #[error("CIGAR spans {0} positions, more than a single read can")]
    SpanTooLong(u64),
}

/// The kind of a CIGAR operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarKind {
    /// `M`: alignment match (sequence match or mismatch).
    Match,
    /// `I`: insertion to the reference.
    Insertion,
    /// `D`: deletion from the reference.
    Deletion,
    /// `N`: skipped region of the reference.
    Skip,
    /// `S`: soft clip (bases present in the read but not aligned).
    SoftClip,
    /// `H`: hard clip (bases not present in the read).
    HardClip,
    /// `P`: padding.
    Pad,
    /// `=`: sequence match.
    SequenceMatch,
    /// `X`: sequence mismatch. Not displayed.
    SequenceMismatch,
    /// `x`: alternate match tag, displayed like `M`.
    AltMatch,
}

impl CigarKind {
    pub fn from_code(code: char) -> Option<Self> {
        let kind = match code {
            'M' => CigarKind::Match,
            'I' => CigarKind::Insertion,
            'D' => CigarKind::Deletion,
            'N' => CigarKind::Skip,
            'S' => CigarKind::SoftClip,
            'H' => CigarKind::HardClip,
            'P' => CigarKind::Pad,
            '=' => CigarKind::SequenceMatch,
            'X' => CigarKind::SequenceMismatch,
            'x' => CigarKind::AltMatch,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(&self) -> char {
        match self {
            CigarKind::Match => 'M',
            CigarKind::Insertion => 'I',
            CigarKind::Deletion => 'D',
            CigarKind::Skip => 'N',
            CigarKind::SoftClip => 'S',
            CigarKind::HardClip => 'H',
            CigarKind::Pad => 'P',
            CigarKind::SequenceMatch => '=',
            CigarKind::SequenceMismatch => 'X',
            CigarKind::AltMatch => 'x',
        }
    }

    /// Whether each unit of this operation becomes a displayed piece.
    pub fn emits_pieces(&self) -> bool {
        matches!(
            self,
            CigarKind::Match
                | CigarKind::Insertion
                | CigarKind::Deletion
                | CigarKind::Skip
                | CigarKind::SequenceMatch
                | CigarKind::AltMatch
        )
    }
}

impl fmt::Display for CigarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single `(count, kind)` CIGAR token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub len: u32,
    pub kind: CigarKind,
}

impl CigarOp {
    pub fn new(kind: CigarKind, len: u32) -> Self {
        Self { len, kind }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind)
    }
}

/// Parse a textual CIGAR such as `5S3M2D2M` into its operations.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>, CigarError> {
    if cigar.is_empty() {
        return Err(CigarError::Empty);
    }

    let mut ops = Vec::new();
    let mut digits_start = 0;
    for (offset, c) in cigar.char_indices() {
        if c.is_ascii_digit() {
            continue;
        }
        let kind = CigarKind::from_code(c).ok_or(CigarError::UnknownOp { op: c, offset })?;
        let digits = &cigar[digits_start..offset];
        if digits.is_empty() {
            return Err(CigarError::MissingLength { op: c, offset });
        }
        let len: u32 = digits
            .parse()
            .map_err(|_| CigarError::InvalidLength(digits.to_string()))?;
        if len == 0 {
            return Err(CigarError::InvalidLength(digits.to_string()));
        }
        ops.push(CigarOp::new(kind, len));
        digits_start = offset + c.len_utf8();
    }

    if digits_start != cigar.len() {
        return Err(CigarError::TrailingLength(cigar.to_string()));
    }
    Ok(ops)
}

/// Render operations back into CIGAR text.
pub fn format_cigar(ops: &[CigarOp]) -> String {
    ops.iter().map(|op| op.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let ops = parse_cigar("3M2D2M").unwrap();
        assert_eq!(
            ops,
            vec![
                CigarOp::new(CigarKind::Match, 3),
                CigarOp::new(CigarKind::Deletion, 2),
                CigarOp::new(CigarKind::Match, 2),
            ]
        );
    }

    #[test]
    fn test_parse_all_codes() {
        let ops = parse_cigar("1M2I3D4N5S6H7P8=9X").unwrap();
        let kinds: Vec<CigarKind> = ops.iter().map(|op| op.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CigarKind::Match,
                CigarKind::Insertion,
                CigarKind::Deletion,
                CigarKind::Skip,
                CigarKind::SoftClip,
                CigarKind::HardClip,
                CigarKind::Pad,
                CigarKind::SequenceMatch,
                CigarKind::SequenceMismatch,
            ]
        );
        let lens: Vec<u32> = ops.iter().map(|op| op.len).collect();
        assert_eq!(lens, (1..=9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_upper_and_lowercase_x_differ() {
        let ops = parse_cigar("4x2X").unwrap();
        assert_eq!(
            ops,
            vec![
                CigarOp::new(CigarKind::AltMatch, 4),
                CigarOp::new(CigarKind::SequenceMismatch, 2),
            ]
        );
        assert!(ops[0].kind.emits_pieces());
        assert!(!ops[1].kind.emits_pieces());
        assert_eq!(format_cigar(&ops), "4x2X");
    }

    #[test]
    fn test_multi_digit_lengths() {
        let ops = parse_cigar("150M1000N25M").unwrap();
        assert_eq!(ops[0].len, 150);
        assert_eq!(ops[1].len, 1000);
        assert_eq!(ops[2].len, 25);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_cigar(""), Err(CigarError::Empty));
        assert_eq!(
            parse_cigar("M"),
            Err(CigarError::MissingLength { op: 'M', offset: 0 })
        );
        assert_eq!(
            parse_cigar("3M2"),
            Err(CigarError::TrailingLength("3M2".to_string()))
        );
        assert_eq!(
            parse_cigar("3Q"),
            Err(CigarError::UnknownOp { op: 'Q', offset: 1 })
        );
        assert!(matches!(parse_cigar("0M"), Err(CigarError::InvalidLength(_))));
        assert!(matches!(
            parse_cigar("99999999999M"),
            Err(CigarError::InvalidLength(_))
        ));
        assert!(matches!(parse_cigar("3m"), Err(CigarError::UnknownOp { .. })));
    }

    #[test]
    fn test_format_roundtrip_text() {
        let text = "5S10M3I5M2D8M4S";
        assert_eq!(format_cigar(&parse_cigar(text).unwrap()), text);
    }
}
