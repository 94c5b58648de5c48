//! The logical CRAM record.

pub mod convert;
pub mod feature;
mod flags;
mod mate_flags;
pub(crate) mod resolve;

pub use self::{feature::Feature, flags::Flags, mate_flags::MateFlags};

use bstr::{BStr, BString};

use crate::{
    alignment::{
        self,
        cigar::{Kind, Op},
        data::{Tag, Value},
        Cigar, MappingQuality,
    },
    Position,
};

/// A CRAM record.
///
/// This is the in-memory form of one aligned (or unaligned) read as CRAM
/// stores it: alignment fields, two flag sets, tags, and a read-feature edit
/// script standing in for the CIGAR and (for mapped reads) the bases.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    // the per-stream sequential record number
    pub(crate) id: u64,
    pub(crate) name: Option<BString>,
    pub(crate) bam_flags: alignment::Flags,
    pub(crate) cram_flags: Flags,
    pub(crate) reference_sequence_id: Option<usize>,
    pub(crate) read_length: usize,
    pub(crate) alignment_start: Option<Position>,
    pub(crate) read_group_id: Option<usize>,
    pub(crate) mate_flags: MateFlags,
    pub(crate) mate_reference_sequence_id: Option<usize>,
    pub(crate) mate_alignment_start: Option<Position>,
    pub(crate) template_length: i32,
    pub(crate) mate_distance: Option<usize>,
    pub(crate) data: Vec<(Tag, Value)>,
    pub(crate) features: Vec<Feature>,
    pub(crate) mapping_quality: Option<MappingQuality>,
    pub(crate) sequence: Vec<u8>,
    pub(crate) quality_scores: Vec<u8>,
    // in-slice mate graph links (indices into the slice's record array)
    pub(crate) next_mate_index: Option<usize>,
    pub(crate) previous_mate_index: Option<usize>,
}

impl Record {
    /// Returns the sequential record number within the stream.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the read name, if preserved.
    pub fn name(&self) -> Option<&BStr> {
        self.name.as_ref().map(|name| name.as_ref())
    }

    /// Returns the SAM flags.
    pub fn bam_flags(&self) -> alignment::Flags {
        self.bam_flags
    }

    /// Returns the CRAM flags.
    pub fn cram_flags(&self) -> Flags {
        self.cram_flags
    }

    /// Returns the reference sequence id.
    pub fn reference_sequence_id(&self) -> Option<usize> {
        self.reference_sequence_id
    }

    /// Returns the read length.
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> Option<Position> {
        self.alignment_start
    }

    /// Returns the read group id.
    pub fn read_group_id(&self) -> Option<usize> {
        self.read_group_id
    }

    /// Returns the mate flags.
    pub fn mate_flags(&self) -> MateFlags {
        self.mate_flags
    }

    /// Returns the mate's reference sequence id.
    pub fn mate_reference_sequence_id(&self) -> Option<usize> {
        self.mate_reference_sequence_id
    }

    /// Returns the mate's 1-based alignment start.
    pub fn mate_alignment_start(&self) -> Option<Position> {
        self.mate_alignment_start
    }

    /// Returns the template length.
    pub fn template_length(&self) -> i32 {
        self.template_length
    }

    /// Returns the number of records to the next fragment, when the mate is
    /// downstream in the same slice.
    pub fn mate_distance(&self) -> Option<usize> {
        self.mate_distance
    }

    /// Returns the optional data fields.
    pub fn data(&self) -> &[(Tag, Value)] {
        &self.data
    }

    /// Returns the read features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Returns the mapping quality.
    pub fn mapping_quality(&self) -> Option<MappingQuality> {
        self.mapping_quality
    }

    /// Returns the read bases.
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Returns the quality scores, or an empty slice if they were not
    /// preserved.
    pub fn quality_scores(&self) -> &[u8] {
        &self.quality_scores
    }

    /// Returns whether the record is placed, i.e., has an alignment start.
    ///
    /// A record can be placed but unmapped; such records sit next to their
    /// mapped neighbors.
    pub fn is_placed(&self) -> bool {
        self.alignment_start.is_some()
    }

    /// Returns the 1-based inclusive alignment end, derived from the
    /// alignment start and the read features.
    pub fn alignment_end(&self) -> Option<Position> {
        self.alignment_start
            .and_then(|start| start.checked_add(self.alignment_span().checked_sub(1)?))
    }

    /// Returns the CIGAR derived from the read features.
    ///
    /// Positions with no feature are implicit matches. Unmapped records have
    /// an empty CIGAR.
    pub fn cigar(&self) -> Cigar {
        if self.bam_flags.is_unmapped() {
            return Cigar::default();
        }

        let mut cigar = Cigar::default();
        let mut read_position = 1;

        for feature in &self.features {
            let position = usize::from(feature.position());

            if position > read_position {
                cigar.push(Op::new(Kind::Match, position - read_position));
                read_position = position;
            }

            let (kind, len) = match feature {
                Feature::Bases { bases, .. } => (Kind::Match, bases.len()),
                Feature::Scores { .. } => continue,
                Feature::ReadBase { .. } => (Kind::Match, 1),
                Feature::Substitution { .. } => (Kind::Match, 1),
                Feature::Insertion { bases, .. } => (Kind::Insertion, bases.len()),
                Feature::Deletion { len, .. } => (Kind::Deletion, *len),
                Feature::InsertBase { .. } => (Kind::Insertion, 1),
                Feature::QualityScore { .. } => continue,
                Feature::ReferenceSkip { len, .. } => (Kind::Skip, *len),
                Feature::SoftClip { bases, .. } => (Kind::SoftClip, bases.len()),
                Feature::Padding { len, .. } => (Kind::Pad, *len),
                Feature::HardClip { len, .. } => (Kind::HardClip, *len),
            };

            cigar.push(Op::new(kind, len));

            if kind.consumes_read() {
                read_position += len;
            }
        }

        if read_position <= self.read_length {
            cigar.push(Op::new(Kind::Match, self.read_length - read_position + 1));
        }

        cigar
    }

    /// Returns the number of reference bases the record covers.
    fn alignment_span(&self) -> usize {
        let mut span = self.read_length;

        for feature in &self.features {
            match feature {
                Feature::Insertion { bases, .. } => span -= bases.len(),
                Feature::InsertBase { .. } => span -= 1,
                Feature::SoftClip { bases, .. } => span -= bases.len(),
                Feature::Deletion { len, .. } => span += len,
                Feature::ReferenceSkip { len, .. } => span += len,
                _ => {}
            }
        }

        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_end() {
        let mut record = Record::default();
        record.alignment_start = Position::new(8);
        record.read_length = 4;

        assert_eq!(record.alignment_end(), Position::new(11));

        record.features.push(Feature::Deletion {
            position: Position::new(2).unwrap(),
            len: 3,
        });

        assert_eq!(record.alignment_end(), Position::new(14));
    }

    #[test]
    fn test_alignment_end_with_unplaced_record() {
        let record = Record::default();
        assert_eq!(record.alignment_end(), None);
    }

    #[test]
    fn test_cigar() {
        let mut record = Record::default();
        record.read_length = 10;

        assert_eq!(record.cigar().to_string(), "10M");

        record.features = vec![
            Feature::SoftClip {
                position: Position::new(1).unwrap(),
                bases: b"AC".to_vec(),
            },
            Feature::Deletion {
                position: Position::new(5).unwrap(),
                len: 2,
            },
        ];

        assert_eq!(record.cigar().to_string(), "2S2M2D6M");
    }

    #[test]
    fn test_cigar_with_unmapped_record() {
        let mut record = Record::default();
        record.bam_flags = alignment::Flags::UNMAPPED;
        record.read_length = 4;

        assert!(record.cigar().is_empty());
    }
}
