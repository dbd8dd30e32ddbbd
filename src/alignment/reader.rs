use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use noodles::sam::alignment::record::cigar::op::Kind;

use crate::alignment::cigar::{CigarKind, CigarOp, format_cigar};
use crate::alignment::record::RawRead;
use crate::region::Region;

/// Reads raw records out of indexed BAM files.
pub struct AlignmentReader;

impl AlignmentReader {
    /// Read every record overlapping `region` (0-based, half-open).
    ///
    /// The BAM file must be sorted and indexed (.bai). Unmapped records placed
    /// in the region are returned without a CIGAR.
    pub fn read_bam(path: &Path, region: &Region) -> Result<Vec<RawRead>> {
        let mut reader = noodles::bam::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .with_context(|| format!("failed to open BAM file: {}", path.display()))?;

        let header = reader.read_header().context("failed to read BAM header")?;

        // noodles regions are 1-based and inclusive.
        let region_str = format!(
            "{}:{}-{}",
            region.chrom,
            region.start + 1,
            region.end.max(region.start + 1)
        );
        let query_region: noodles::core::Region = region_str
            .parse()
            .with_context(|| format!("failed to parse region: {region_str}"))?;

        let mut reads = Vec::new();
        let query = reader
            .query(&header, &query_region)
            .context("failed to query BAM region")?;

        for result in query {
            let record = result.context("failed to read BAM record")?;
            reads.push(Self::convert_bam_record(&record)?);
        }

        info!("read {} records from {} in {region}", reads.len(), path.display());
        Ok(reads)
    }

    /// Convert a noodles BAM record into a raw read record.
    fn convert_bam_record(record: &noodles::bam::Record) -> Result<RawRead> {
        let name = record
            .name()
            .map(|n| String::from_utf8_lossy(n).into_owned());

        let flags = record.flags();

        let position = match record.alignment_start() {
            Some(Ok(p)) => p.get() as u64 - 1,
            Some(Err(e)) => return Err(e).context("failed to read alignment start"),
            None => 0,
        };

        let cigar = if flags.is_unmapped() {
            None
        } else {
            let mut ops = Vec::new();
            for result in record.cigar().iter() {
                let op = result.context("failed to read CIGAR operation")?;
                ops.push(CigarOp::new(cigar_kind(op.kind()), op.len() as u32));
            }
            Some(format_cigar(&ops)).filter(|t| !t.is_empty())
        };

        let sequence = record.sequence();
        let original_bases: String = (0..sequence.len())
            .filter_map(|i| sequence.get(i))
            .map(char::from)
            .collect();

        let base_quality = encode_qualities(record.quality_scores().as_ref());

        let mapping_quality = record.mapping_quality().map(|q| u32::from(q.get()));

        let mate_position = match record.mate_alignment_start() {
            Some(Ok(p)) => Some(p.get() as u64 - 1),
            _ => None,
        };

        Ok(RawRead {
            id: None,
            name,
            position,
            cigar,
            original_bases: Some(original_bases).filter(|s| !s.is_empty()),
            base_quality,
            flags: u32::from(flags.bits()),
            mate_position,
            mapping_quality,
        })
    }
}

fn cigar_kind(kind: Kind) -> CigarKind {
    match kind {
        Kind::Match => CigarKind::Match,
        Kind::Insertion => CigarKind::Insertion,
        Kind::Deletion => CigarKind::Deletion,
        Kind::Skip => CigarKind::Skip,
        Kind::SoftClip => CigarKind::SoftClip,
        Kind::HardClip => CigarKind::HardClip,
        Kind::Pad => CigarKind::Pad,
        Kind::SequenceMatch => CigarKind::SequenceMatch,
        // BAM mismatches are shown like matches.
        Kind::SequenceMismatch => CigarKind::AltMatch,
    }
}

/// Re-encode raw Phred scores as Phred+33 text. BAM marks missing qualities
/// with 0xff.
fn encode_qualities(scores: &[u8]) -> Option<String> {
    if scores.is_empty() || scores[0] == 0xff {
        return None;
    }
    Some(scores.iter().map(|&q| char::from(q.min(93) + 33)).collect())
}
