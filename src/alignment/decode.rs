use std::collections::HashMap;

use log::{debug, info, warn};
use thiserror::Error;

use crate::alignment::cigar::{CigarError, CigarKind, parse_cigar};
use crate::alignment::lanes::assign_bulk_lanes;
use crate::alignment::read::{
    DecodedRead, PLACEHOLDER_LETTER, PLACEHOLDER_QUALITY, ReadDetail, ReadPiece,
};
use crate::alignment::record::RawRead;
use crate::stats::BaseStats;

/// Offset of Phred+33 quality characters.
const PHRED_OFFSET: u8 = 33;

/// Flag bit marking a reverse-strand read.
const REVERSE_FLAG_SHIFT: u32 = 4;

/// Largest number of pieces one read may decode to (the BAM op length limit).
pub const MAX_READ_SPAN: u64 = 1 << 28;

/// Non-fatal conditions found while decoding a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    #[error("There is more than one read with the ID {id} - this will cause display problems")]
    DuplicateId { id: String, first: usize, second: usize },
    #[error("read {id} has a malformed CIGAR '{cigar}' ({error}); showing it as unmapped")]
    MalformedCigar {
        id: String,
        cigar: String,
        error: CigarError,
    },
}

/// Derive the display identity of a raw record.
///
/// Backends do not hand back unique ids, so the position and CIGAR are folded in.
pub fn read_id(raw: &RawRead) -> String {
    let base = raw.id.as_deref().or(raw.name.as_deref()).unwrap_or_default();
    format!(
        "{}{}{}",
        base,
        raw.position,
        raw.cigar.as_deref().unwrap_or_default()
    )
}

/// Decode one raw record into per-base pieces.
///
/// Returns the decoded read, plus the CIGAR error if the CIGAR could not be
/// parsed (the read is then decoded as unmapped).
pub fn decode_read(raw: &RawRead, index: usize) -> (DecodedRead, Option<CigarError>) {
    let id = read_id(raw);
    let mut read = DecodedRead {
        name: raw.name.clone().unwrap_or_else(|| id.clone()),
        id,
        position: raw.position,
        end: raw.position,
        detail: ReadDetail::WithBases(Vec::new()),
        reverse: (raw.flags >> REVERSE_FLAG_SHIFT) % 2 == 1,
        lane: 0,
        unmapped: true,
        cigar: raw.cigar.clone(),
        flags: raw.flags,
        mate_position: raw.mate_position,
        mapping_quality: raw.mapping_quality,
        index,
    };

    let Some(cigar) = raw.cigar.as_deref() else {
        return (read, None);
    };
    let ops = match parse_cigar(cigar) {
        Ok(ops) => ops,
        Err(e) => return (read, Some(e)),
    };
    let span: u64 = ops
        .iter()
        .filter(|op| op.kind.emits_pieces())
        .map(|op| u64::from(op.len))
        .sum();
    if span > MAX_READ_SPAN {
        return (read, Some(CigarError::SpanTooLong(span)));
    }

    let bases = raw.original_bases.as_deref().unwrap_or_default().as_bytes();
    let quals = raw.base_quality.as_deref().unwrap_or_default().as_bytes();
    let mut pieces: Vec<ReadPiece> = Vec::new();
    let mut base_index = 0usize;

    for op in ops {
        match op.kind {
            // Clipped sequence and `X` runs are not displayed.
            CigarKind::HardClip | CigarKind::Pad | CigarKind::SequenceMismatch => {}
            CigarKind::Deletion | CigarKind::Skip => {
                for _ in 0..op.len {
                    pieces.push(ReadPiece {
                        letter: PLACEHOLDER_LETTER,
                        position: raw.position + pieces.len() as u64,
                        quality: PLACEHOLDER_QUALITY,
                        kind: op.kind,
                    });
                }
            }
            CigarKind::SoftClip => base_index += op.len as usize,
            CigarKind::Insertion
            | CigarKind::Match
            | CigarKind::SequenceMatch
            | CigarKind::AltMatch => {
                for _ in 0..op.len {
                    pieces.push(ReadPiece {
                        letter: bases.get(base_index).copied().unwrap_or(b'N'),
                        position: raw.position + pieces.len() as u64,
                        quality: quals
                            .get(base_index)
                            .map_or(0, |q| q.saturating_sub(PHRED_OFFSET)),
                        kind: op.kind,
                    });
                    base_index += 1;
                }
            }
        }
    }

    read.end = raw.position + pieces.len() as u64;
    read.detail = ReadDetail::WithBases(pieces);
    read.unmapped = false;
    (read, None)
}

/// The result of decoding one full batch of records.
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    /// Decoded reads in input order, with bulk lanes assigned.
    pub reads: Vec<DecodedRead>,
    /// Number of lanes used by the bulk layout.
    pub lane_count: usize,
    pub warnings: Vec<DecodeWarning>,
    /// Letters observed at each reference position.
    pub base_stats: BaseStats,
}

/// Decode a whole batch, laying it out with the bulk lane sweep.
pub fn decode_batch(records: &[RawRead]) -> DecodedBatch {
    let mut batch = DecodedBatch::default();
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for (index, raw) in records.iter().enumerate() {
        let (read, cigar_error) = decode_read(raw, index);

        if let Some(&first) = seen.get(&read.id) {
            let warning = DecodeWarning::DuplicateId {
                id: read.id.clone(),
                first,
                second: index,
            };
            warn!("{warning}");
            batch.warnings.push(warning);
        }
        seen.insert(read.id.clone(), index);

        if let Some(error) = cigar_error {
            let warning = DecodeWarning::MalformedCigar {
                id: read.id.clone(),
                cigar: raw.cigar.clone().unwrap_or_default(),
                error,
            };
            warn!("{warning}");
            batch.warnings.push(warning);
        }

        batch.base_stats.add_read(&read);
        batch.reads.push(read);
    }

    batch.lane_count = assign_bulk_lanes(&mut batch.reads);
    info!(
        "decoded {} reads into {} lanes ({} warnings)",
        batch.reads.len(),
        batch.lane_count,
        batch.warnings.len()
    );
    debug!("base stats cover {} positions", batch.base_stats.len());
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, position: u64, cigar: Option<&str>, bases: &str) -> RawRead {
        RawRead {
            name: Some(name.to_string()),
            position,
            cigar: cigar.map(str::to_string),
            original_bases: Some(bases.to_string()),
            base_quality: Some("?".repeat(bases.len())),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_match_deletion_match() {
        let (read, err) = decode_read(&raw("q", 100, Some("3M2D2M"), "ACGAT"), 0);
        assert!(err.is_none());
        assert!(!read.unmapped);
        assert_eq!(read.end, 107);
        assert_eq!(read.len(), 7);

        let pieces = read.pieces();
        let positions: Vec<u64> = pieces.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![100, 101, 102, 103, 104, 105, 106]);
        let letters: Vec<u8> = pieces.iter().map(|p| p.letter).collect();
        assert_eq!(letters, b"ACG--AT".to_vec());

        assert_eq!(pieces[0].quality, 30);
        assert_eq!(pieces[0].kind, CigarKind::Match);
        assert_eq!(pieces[3].quality, PLACEHOLDER_QUALITY);
        assert_eq!(pieces[3].kind, CigarKind::Deletion);
        assert_eq!(pieces[6].quality, 30);
    }

    #[test]
    fn test_decode_unmapped() {
        let (read, err) = decode_read(&raw("q", 50, None, ""), 0);
        assert!(err.is_none());
        assert!(read.unmapped);
        assert_eq!(read.end, 50);
        assert_eq!(read.len(), 0);
        assert!(read.pieces().is_empty());
    }

    #[test]
    fn test_decode_malformed_cigar_is_unmapped() {
        let (read, err) = decode_read(&raw("q", 50, Some("3Q"), "ACG"), 0);
        assert!(matches!(err, Some(CigarError::UnknownOp { op: 'Q', .. })));
        assert!(read.unmapped);
        assert_eq!(read.end, 50);
        assert!(read.pieces().is_empty());
    }

    #[test]
    fn test_soft_clip_skips_bases_without_advancing_reference() {
        let (read, _) = decode_read(&raw("q", 10, Some("2S3M"), "NNACG"), 0);
        assert_eq!(read.end, 13);
        let letters: Vec<u8> = read.pieces().iter().map(|p| p.letter).collect();
        assert_eq!(letters, b"ACG".to_vec());
        assert_eq!(read.pieces()[0].position, 10);
    }

    #[test]
    fn test_hard_clip_and_pad_emit_nothing() {
        let (read, _) = decode_read(&raw("q", 10, Some("5H2M1P2M5H"), "ACGT"), 0);
        assert_eq!(read.end, 14);
        let letters: Vec<u8> = read.pieces().iter().map(|p| p.letter).collect();
        assert_eq!(letters, b"ACGT".to_vec());
    }

    #[test]
    fn test_insertion_occupies_reference_slot() {
        let (read, _) = decode_read(&raw("q", 0, Some("2M1I2M"), "ACTGT"), 0);
        assert_eq!(read.end, 5);
        assert_eq!(read.pieces()[2].kind, CigarKind::Insertion);
        assert_eq!(read.pieces()[2].letter, b'T');
        assert_eq!(read.pieces()[2].position, 2);
    }

    #[test]
    fn test_skip_and_mismatch_codes() {
        let (read, _) = decode_read(&raw("q", 0, Some("1=2N1x1x"), "ACG"), 0);
        let kinds: Vec<CigarKind> = read.pieces().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CigarKind::SequenceMatch,
                CigarKind::Skip,
                CigarKind::Skip,
                CigarKind::AltMatch,
                CigarKind::AltMatch,
            ]
        );
        let letters: Vec<u8> = read.pieces().iter().map(|p| p.letter).collect();
        assert_eq!(letters, b"A--CG".to_vec());
    }

    #[test]
    fn test_uppercase_x_emits_nothing_and_keeps_base_cursor() {
        let (read, err) = decode_read(&raw("q", 0, Some("2X2M"), "ACGT"), 0);
        assert!(err.is_none());
        assert_eq!(read.end, 2);
        let letters: Vec<u8> = read.pieces().iter().map(|p| p.letter).collect();
        assert_eq!(letters, b"AC".to_vec());
    }

    #[test]
    fn test_oversized_span_is_unmapped() {
        let (read, err) = decode_read(&raw("q", 5, Some("4000000000N"), ""), 0);
        assert_eq!(err, Some(CigarError::SpanTooLong(4_000_000_000)));
        assert!(read.unmapped);
        assert_eq!(read.end, 5);
        assert!(read.pieces().is_empty());

        // Hard clips and `X` runs add no pieces, so they do not count.
        let (read, err) = decode_read(&raw("q", 5, Some("4000000000H2M"), "AC"), 0);
        assert!(err.is_none());
        assert_eq!(read.end, 7);
    }

    #[test]
    fn test_short_bases_and_qualities() {
        let record = RawRead {
            name: Some("q".to_string()),
            position: 0,
            cigar: Some("3M".to_string()),
            original_bases: Some("A".to_string()),
            base_quality: None,
            ..Default::default()
        };
        let (read, _) = decode_read(&record, 0);
        let letters: Vec<u8> = read.pieces().iter().map(|p| p.letter).collect();
        assert_eq!(letters, b"ANN".to_vec());
        assert!(read.pieces().iter().all(|p| p.quality == 0));
    }

    #[test]
    fn test_reverse_flag_bit() {
        let mut record = raw("q", 0, Some("1M"), "A");
        record.flags = 16;
        assert!(decode_read(&record, 0).0.reverse);
        record.flags = 0x10 | 0x1 | 0x40;
        assert!(decode_read(&record, 0).0.reverse);
        record.flags = 32;
        assert!(!decode_read(&record, 0).0.reverse);
    }

    #[test]
    fn test_read_id_derivation() {
        let mut record = raw("q1", 100, Some("3M"), "ACG");
        assert_eq!(read_id(&record), "q11003M");
        record.id = Some("backend".to_string());
        assert_eq!(read_id(&record), "backend1003M");

        let unnamed = RawRead {
            position: 7,
            ..Default::default()
        };
        assert_eq!(read_id(&unnamed), "7");
        let (read, _) = decode_read(&unnamed, 3);
        assert_eq!(read.name, "7");
        assert_eq!(read.index, 3);
    }

    #[test]
    fn test_batch_reports_duplicate_ids() {
        let records = vec![
            raw("dup", 10, Some("2M"), "AC"),
            raw("other", 10, Some("2M"), "AC"),
            raw("dup", 10, Some("2M"), "GT"),
        ];
        let batch = decode_batch(&records);
        assert_eq!(batch.reads.len(), 3);
        assert_eq!(
            batch.warnings,
            vec![DecodeWarning::DuplicateId {
                id: "dup102M".to_string(),
                first: 0,
                second: 2,
            }]
        );
        assert!(batch.warnings[0].to_string().contains("dup102M"));
    }

    #[test]
    fn test_batch_reports_malformed_cigar() {
        let batch = decode_batch(&[raw("bad", 10, Some("2M3"), "AC")]);
        assert_eq!(batch.warnings.len(), 1);
        assert!(matches!(
            batch.warnings[0],
            DecodeWarning::MalformedCigar { .. }
        ));
        assert!(batch.reads[0].unmapped);
    }

    #[test]
    fn test_batch_lays_out_and_collects_stats() {
        let records = vec![
            raw("a", 0, Some("10M"), "AAAAAAAAAA"),
            raw("b", 5, Some("10M"), "CCCCCCCCCC"),
            raw("c", 12, Some("8M"), "GGGGGGGG"),
        ];
        let batch = decode_batch(&records);
        let lanes: Vec<usize> = batch.reads.iter().map(|r| r.lane).collect();
        assert_eq!(lanes, vec![0, 1, 0]);
        assert_eq!(batch.lane_count, 2);
        assert_eq!(batch.base_stats.summary(6), "1A 1C ");
        assert!(batch.warnings.is_empty());
    }
}
