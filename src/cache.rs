//! Windowed, lane-assigning cache of decoded reads.
//!
//! Every resident read overlaps the current window `[start, end)`, and every
//! resident read carries per-base pieces exactly when the cache wants bases.
//! Lanes are assigned once, when a read first becomes resident, and are kept
//! for as long as the read stays resident.

use std::collections::HashMap;

use log::debug;

use crate::alignment::read::DecodedRead;
use crate::region::overlaps;

#[derive(Debug, Default)]
pub struct ReadCache {
    want_bases: bool,
    start: u64,
    end: u64,
    reads: HashMap<String, DecodedRead>,
}

impl ReadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether resident reads keep per-base pieces.
    pub fn want_bases(&self) -> bool {
        self.want_bases
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// All resident reads, in no particular order.
    pub fn reads(&self) -> impl Iterator<Item = &DecodedRead> {
        self.reads.values()
    }

    pub fn get(&self, id: &str) -> Option<&DecodedRead> {
        self.reads.get(id)
    }

    /// Empty the cache and reset the window to `[0, 0)` without bases.
    pub fn clear(&mut self) {
        self.want_bases = false;
        self.start = 0;
        self.end = 0;
        self.reads.clear();
    }

    /// Move the window, evicting reads that fall outside it.
    ///
    /// Reads that stay keep their lane. When bases are no longer wanted their
    /// pieces are dropped; when bases become wanted, resident summary reads stay
    /// as they are until they are re-added with bases.
    pub fn set_range(&mut self, start: u64, end: u64, want_bases: bool) {
        let before = self.reads.len();
        self.reads.retain(|_, read| {
            if !overlaps(read.position, read.end, start, end) {
                return false;
            }
            if !want_bases {
                read.strip_bases();
            }
            true
        });
        debug!(
            "window [{start}, {end}) bases={want_bases}: evicted {} of {before} reads",
            before - self.reads.len()
        );

        self.start = start;
        self.end = end;
        self.want_bases = want_bases;
    }

    /// Whether a read with `id` is resident with the given base status.
    pub fn has_read(&self, id: &str, want_bases: bool) -> bool {
        self.reads
            .get(id)
            .is_some_and(|read| read.has_bases() == want_bases)
    }

    /// Add `read` if it is still relevant, or update the resident read with its id.
    ///
    /// Reads outside the window or with the wrong base status are ignored. An
    /// update keeps the resident read's lane; a new read gets the lowest lane not
    /// used by any overlapping resident read.
    ///
    /// # Panics
    ///
    /// Panics if the read's span is inconsistent with its decoded pieces.
    pub fn add_or_update(&mut self, mut read: DecodedRead) {
        assert!(
            read.end >= read.position,
            "read {} ends ({}) before it starts ({})",
            read.id,
            read.end,
            read.position
        );
        if read.has_bases() {
            assert_eq!(
                read.end,
                read.position + read.pieces().len() as u64,
                "read {} span does not match its decoded pieces",
                read.id
            );
        }

        if !overlaps(read.position, read.end, self.start, self.end)
            || read.has_bases() != self.want_bases
        {
            return;
        }

        match self.reads.get(&read.id) {
            Some(existing) => read.lane = existing.lane,
            None => read.lane = self.free_lane(read.position, read.end),
        }
        self.reads.insert(read.id.clone(), read);
    }

    /// Lowest lane not taken by a resident read overlapping `[start, end)`.
    fn free_lane(&self, start: u64, end: u64) -> usize {
        let mut taken: Vec<bool> = Vec::new();
        for other in self.reads.values() {
            if overlaps(start, end, other.position, other.end) {
                if other.lane >= taken.len() {
                    taken.resize(other.lane + 1, false);
                }
                taken[other.lane] = true;
            }
        }
        taken.iter().position(|&t| !t).unwrap_or(taken.len())
    }
}
