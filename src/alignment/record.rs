use bstr::BString;

use super::{
    data::{Tag, Value},
    Cigar, Flags, MappingQuality,
};
use crate::Position;

/// An alignment record: the logical field set consumed and produced at the
/// codec boundary.
///
/// Fields are public; this is a plain data carrier, not an abstraction over
/// a storage format.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordBuf {
    /// The read name, if preserved.
    pub name: Option<BString>,
    /// The SAM flags.
    pub flags: Flags,
    /// The reference sequence id, if placed.
    pub reference_sequence_id: Option<usize>,
    /// The 1-based alignment start, if placed.
    pub alignment_start: Option<Position>,
    /// The mapping quality, if available.
    pub mapping_quality: Option<MappingQuality>,
    /// The CIGAR.
    pub cigar: Cigar,
    /// The mate's reference sequence id.
    pub mate_reference_sequence_id: Option<usize>,
    /// The mate's 1-based alignment start.
    pub mate_alignment_start: Option<Position>,
    /// The observed template length.
    pub template_length: i32,
    /// The read bases (ACGTN-normalized on encode).
    pub sequence: Vec<u8>,
    /// The per-base quality scores, or empty if missing.
    pub quality_scores: Vec<u8>,
    /// The read group id, resolved against the header by the caller.
    pub read_group_id: Option<usize>,
    /// The optional data fields.
    pub data: Vec<(Tag, Value)>,
}

impl RecordBuf {
    /// Returns the 1-based inclusive alignment end, if placed.
    pub fn alignment_end(&self) -> Option<Position> {
        self.alignment_start.and_then(|start| {
            let span = self.cigar.alignment_span();
            start.checked_add(span.saturating_sub(1))
        })
    }
}
