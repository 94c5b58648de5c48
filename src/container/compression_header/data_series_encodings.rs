//! Data series encodings.

pub(crate) mod data_series;

pub use self::data_series::DataSeries;

use std::collections::HashSet;

use super::{
    encoding::codec::{Byte, ByteArray, Integer},
    Encoding,
};
use crate::container::block;

/// The per-data-series encoding map.
///
/// A data series with no encoding (`None`) carries no data in the container;
/// decoders only fail if a record actually needs it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct DataSeriesEncodings {
    pub(crate) bam_flags: Option<Encoding<Integer>>,
    pub(crate) cram_flags: Option<Encoding<Integer>>,
    pub(crate) reference_sequence_ids: Option<Encoding<Integer>>,
    pub(crate) read_lengths: Option<Encoding<Integer>>,
    pub(crate) alignment_starts: Option<Encoding<Integer>>,
    pub(crate) read_group_ids: Option<Encoding<Integer>>,
    pub(crate) names: Option<Encoding<ByteArray>>,
    pub(crate) mate_flags: Option<Encoding<Integer>>,
    pub(crate) mate_reference_sequence_ids: Option<Encoding<Integer>>,
    pub(crate) mate_alignment_starts: Option<Encoding<Integer>>,
    pub(crate) template_lengths: Option<Encoding<Integer>>,
    pub(crate) mate_distances: Option<Encoding<Integer>>,
    pub(crate) tag_set_ids: Option<Encoding<Integer>>,
    pub(crate) feature_counts: Option<Encoding<Integer>>,
    pub(crate) feature_codes: Option<Encoding<Byte>>,
    pub(crate) feature_position_deltas: Option<Encoding<Integer>>,
    pub(crate) deletion_lengths: Option<Encoding<Integer>>,
    pub(crate) stretches_of_bases: Option<Encoding<ByteArray>>,
    pub(crate) stretches_of_quality_scores: Option<Encoding<ByteArray>>,
    pub(crate) base_substitution_codes: Option<Encoding<Byte>>,
    pub(crate) insertion_bases: Option<Encoding<ByteArray>>,
    pub(crate) reference_skip_lengths: Option<Encoding<Integer>>,
    pub(crate) padding_lengths: Option<Encoding<Integer>>,
    pub(crate) hard_clip_lengths: Option<Encoding<Integer>>,
    pub(crate) soft_clip_bases: Option<Encoding<ByteArray>>,
    pub(crate) mapping_qualities: Option<Encoding<Integer>>,
    pub(crate) bases: Option<Encoding<Byte>>,
    pub(crate) quality_scores: Option<Encoding<Byte>>,
}

impl DataSeriesEncodings {
    /// Builds the default write-side map: every data series routed to its
    /// canonical external block.
    pub fn init() -> Self {
        fn external_int(data_series: DataSeries) -> Option<Encoding<Integer>> {
            Some(Encoding::new(Integer::External {
                block_content_id: block::ContentId::from(data_series),
            }))
        }

        fn external_byte(data_series: DataSeries) -> Option<Encoding<Byte>> {
            Some(Encoding::new(Byte::External {
                block_content_id: block::ContentId::from(data_series),
            }))
        }

        fn byte_array_stop(
            stop_byte: u8,
            data_series: DataSeries,
        ) -> Option<Encoding<ByteArray>> {
            Some(Encoding::new(ByteArray::ByteArrayStop {
                stop_byte,
                block_content_id: block::ContentId::from(data_series),
            }))
        }

        Self {
            bam_flags: external_int(DataSeries::BamFlags),
            cram_flags: external_int(DataSeries::CramFlags),
            reference_sequence_ids: external_int(DataSeries::ReferenceSequenceIds),
            read_lengths: external_int(DataSeries::ReadLengths),
            alignment_starts: external_int(DataSeries::AlignmentStarts),
            read_group_ids: external_int(DataSeries::ReadGroupIds),
            names: byte_array_stop(b'\t', DataSeries::Names),
            mate_flags: external_int(DataSeries::MateFlags),
            mate_reference_sequence_ids: external_int(DataSeries::MateReferenceSequenceIds),
            mate_alignment_starts: external_int(DataSeries::MateAlignmentStarts),
            template_lengths: external_int(DataSeries::TemplateLengths),
            mate_distances: external_int(DataSeries::MateDistances),
            tag_set_ids: external_int(DataSeries::TagSetIds),
            feature_counts: external_int(DataSeries::FeatureCounts),
            feature_codes: external_byte(DataSeries::FeatureCodes),
            feature_position_deltas: external_int(DataSeries::FeaturePositionDeltas),
            deletion_lengths: external_int(DataSeries::DeletionLengths),
            // BB and QQ are unused on write
            stretches_of_bases: None,
            stretches_of_quality_scores: None,
            base_substitution_codes: external_byte(DataSeries::BaseSubstitutionCodes),
            insertion_bases: byte_array_stop(b'\t', DataSeries::InsertionBases),
            reference_skip_lengths: external_int(DataSeries::ReferenceSkipLengths),
            padding_lengths: external_int(DataSeries::PaddingLengths),
            hard_clip_lengths: external_int(DataSeries::HardClipLengths),
            soft_clip_bases: byte_array_stop(b'\t', DataSeries::SoftClipBases),
            mapping_qualities: external_int(DataSeries::MappingQualities),
            bases: external_byte(DataSeries::Bases),
            quality_scores: external_byte(DataSeries::QualityScores),
        }
    }

    /// Drops encodings whose canonical block content ids are not in `used`,
    /// so the compression header only declares data series with
    /// corresponding non-empty blocks.
    ///
    /// Only valid for maps built by [`Self::init`], whose content ids match
    /// the canonical assignment.
    pub fn retain_used_content_ids(&mut self, used: &HashSet<block::ContentId>) {
        macro_rules! clear_if_unused {
            ($field:ident, $series:expr) => {
                if !used.contains(&block::ContentId::from($series)) {
                    self.$field = None;
                }
            };
        }

        clear_if_unused!(bam_flags, DataSeries::BamFlags);
        clear_if_unused!(cram_flags, DataSeries::CramFlags);
        clear_if_unused!(reference_sequence_ids, DataSeries::ReferenceSequenceIds);
        clear_if_unused!(read_lengths, DataSeries::ReadLengths);
        clear_if_unused!(alignment_starts, DataSeries::AlignmentStarts);
        clear_if_unused!(read_group_ids, DataSeries::ReadGroupIds);
        clear_if_unused!(names, DataSeries::Names);
        clear_if_unused!(mate_flags, DataSeries::MateFlags);
        clear_if_unused!(
            mate_reference_sequence_ids,
            DataSeries::MateReferenceSequenceIds
        );
        clear_if_unused!(mate_alignment_starts, DataSeries::MateAlignmentStarts);
        clear_if_unused!(template_lengths, DataSeries::TemplateLengths);
        clear_if_unused!(mate_distances, DataSeries::MateDistances);
        clear_if_unused!(tag_set_ids, DataSeries::TagSetIds);
        clear_if_unused!(feature_counts, DataSeries::FeatureCounts);
        clear_if_unused!(feature_codes, DataSeries::FeatureCodes);
        clear_if_unused!(feature_position_deltas, DataSeries::FeaturePositionDeltas);
        clear_if_unused!(deletion_lengths, DataSeries::DeletionLengths);
        clear_if_unused!(base_substitution_codes, DataSeries::BaseSubstitutionCodes);
        clear_if_unused!(insertion_bases, DataSeries::InsertionBases);
        clear_if_unused!(reference_skip_lengths, DataSeries::ReferenceSkipLengths);
        clear_if_unused!(padding_lengths, DataSeries::PaddingLengths);
        clear_if_unused!(hard_clip_lengths, DataSeries::HardClipLengths);
        clear_if_unused!(soft_clip_bases, DataSeries::SoftClipBases);
        clear_if_unused!(mapping_qualities, DataSeries::MappingQualities);
        clear_if_unused!(bases, DataSeries::Bases);
        clear_if_unused!(quality_scores, DataSeries::QualityScores);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_routes_all_series_externally() {
        let encodings = DataSeriesEncodings::init();

        assert_eq!(
            encodings.bam_flags,
            Some(Encoding::new(Integer::External {
                block_content_id: 1
            }))
        );

        assert_eq!(
            encodings.names,
            Some(Encoding::new(ByteArray::ByteArrayStop {
                stop_byte: b'\t',
                block_content_id: 7,
            }))
        );

        assert!(encodings.stretches_of_bases.is_none());
        assert!(encodings.stretches_of_quality_scores.is_none());
    }

    #[test]
    fn test_retain_used_content_ids() {
        let mut encodings = DataSeriesEncodings::init();

        let used: HashSet<block::ContentId> = [
            block::ContentId::from(DataSeries::BamFlags),
            block::ContentId::from(DataSeries::ReadLengths),
        ]
        .into_iter()
        .collect();

        encodings.retain_used_content_ids(&used);

        assert!(encodings.bam_flags.is_some());
        assert!(encodings.read_lengths.is_some());
        assert!(encodings.cram_flags.is_none());
        assert!(encodings.quality_scores.is_none());
    }
}
