//! Bulk lane layout for a freshly decoded batch.
//!
//! This is a single greedy sweep in input order and is deliberately independent
//! of the cache's incremental lane search in [`crate::cache`]: when reads arrive
//! out of position order the two can pack differently.

use crate::alignment::read::DecodedRead;

/// Assign lanes to `reads` in input order and return the number of lanes used.
///
/// Each read goes to the first lane whose last read ends at or before this
/// read's start; otherwise a new lane is opened. Unmapped reads keep lane 0 and
/// do not occupy a lane.
pub fn assign_bulk_lanes(reads: &mut [DecodedRead]) -> usize {
    let mut lane_ends: Vec<u64> = Vec::new();

    for read in reads.iter_mut() {
        if read.unmapped {
            read.lane = 0;
            continue;
        }
        match lane_ends.iter().position(|&end| end <= read.position) {
            Some(lane) => {
                lane_ends[lane] = read.end;
                read.lane = lane;
            }
            None => {
                read.lane = lane_ends.len();
                lane_ends.push(read.end);
            }
        }
    }

    lane_ends.len()
}
