use std::collections::BTreeMap;

use crate::alignment::read::DecodedRead;

/// Letters observed at each reference position across a decoded batch.
#[derive(Debug, Clone, Default)]
pub struct BaseStats {
    letters: BTreeMap<u64, Vec<u8>>,
}

impl BaseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every piece of `read`, placeholders included.
    pub fn add_read(&mut self, read: &DecodedRead) {
        for piece in read.pieces() {
            self.letters.entry(piece.position).or_default().push(piece.letter);
        }
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Letter counts at `position`, in the order letters were first seen.
    pub fn counts(&self, position: u64) -> Vec<(u8, usize)> {
        let mut counts: Vec<(u8, usize)> = Vec::new();
        for &letter in self.letters.get(&position).map(Vec::as_slice).unwrap_or_default() {
            match counts.iter_mut().find(|(l, _)| *l == letter) {
                Some((_, n)) => *n += 1,
                None => counts.push((letter, 1)),
            }
        }
        counts
    }

    /// Pileup text for a hover readout, e.g. `"3A 1C "`.
    pub fn summary(&self, position: u64) -> String {
        self.counts(position)
            .iter()
            .map(|&(letter, n)| format!("{n}{} ", letter as char))
            .collect()
    }

    /// The (up to) two alleles supported at `position`.
    ///
    /// Letters seen no more than `total * min_fraction` times are dropped. With a
    /// single surviving letter the call is homozygous.
    pub fn alleles(&self, position: u64, min_fraction: f64) -> Option<(u8, u8)> {
        let counts = self.counts(position);
        let total: usize = counts.iter().map(|&(_, n)| n).sum();
        let min_count = total as f64 * min_fraction;
        let mut kept = counts
            .iter()
            .filter(|&&(_, n)| n as f64 > min_count)
            .map(|&(letter, _)| letter);
        let a1 = kept.next()?;
        let a2 = kept.next().unwrap_or(a1);
        Some((a1, a2))
    }
}
