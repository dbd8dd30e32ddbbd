pub mod cigar;
pub mod decode;
pub mod lanes;
pub mod read;
pub mod reader;
pub mod record;

pub use cigar::{CigarError, CigarKind, CigarOp, parse_cigar};
pub use decode::{DecodeWarning, DecodedBatch, decode_batch, decode_read, read_id};
pub use lanes::assign_bulk_lanes;
pub use read::{DecodedRead, ReadDetail, ReadPiece};
pub use reader::AlignmentReader;
pub use record::{RawRead, ReadPage};
