use super::encoding::{read_byte_array_encoding, read_byte_encoding, read_integer_encoding};
use crate::{
    container::compression_header::{DataSeries, DataSeriesEncodings},
    io::reader::collections::read_map,
    Error, Result,
};

pub(super) fn read_data_series_encodings(src: &mut &[u8]) -> Result<DataSeriesEncodings> {
    let (mut buf, len) = read_map(src)?;
    read_data_series_encodings_inner(&mut buf, len)
}

fn read_data_series_encodings_inner(src: &mut &[u8], len: usize) -> Result<DataSeriesEncodings> {
    use std::io;

    let mut encodings = DataSeriesEncodings::default();

    for _ in 0..len {
        let (key, rest) = src
            .split_first_chunk::<2>()
            .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))?;

        *src = rest;

        let data_series =
            DataSeries::try_from(*key).map_err(|e| Error::malformed(e.to_string()))?;

        let context = data_series.to_string();

        match data_series {
            DataSeries::BamFlags => {
                encodings.bam_flags = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::CramFlags => {
                encodings.cram_flags = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::ReferenceSequenceIds => {
                encodings.reference_sequence_ids = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::ReadLengths => {
                encodings.read_lengths = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::AlignmentStarts => {
                encodings.alignment_starts = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::ReadGroupIds => {
                encodings.read_group_ids = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::Names => {
                encodings.names = Some(read_byte_array_encoding(src, &context)?);
            }
            DataSeries::MateFlags => {
                encodings.mate_flags = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::MateReferenceSequenceIds => {
                encodings.mate_reference_sequence_ids =
                    Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::MateAlignmentStarts => {
                encodings.mate_alignment_starts = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::TemplateLengths => {
                encodings.template_lengths = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::MateDistances => {
                encodings.mate_distances = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::TagSetIds => {
                encodings.tag_set_ids = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::FeatureCounts => {
                encodings.feature_counts = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::FeatureCodes => {
                encodings.feature_codes = Some(read_byte_encoding(src, &context)?);
            }
            DataSeries::FeaturePositionDeltas => {
                encodings.feature_position_deltas = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::DeletionLengths => {
                encodings.deletion_lengths = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::StretchesOfBases => {
                encodings.stretches_of_bases = Some(read_byte_array_encoding(src, &context)?);
            }
            DataSeries::StretchesOfQualityScores => {
                encodings.stretches_of_quality_scores =
                    Some(read_byte_array_encoding(src, &context)?);
            }
            DataSeries::BaseSubstitutionCodes => {
                encodings.base_substitution_codes = Some(read_byte_encoding(src, &context)?);
            }
            DataSeries::InsertionBases => {
                encodings.insertion_bases = Some(read_byte_array_encoding(src, &context)?);
            }
            DataSeries::ReferenceSkipLengths => {
                encodings.reference_skip_lengths = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::PaddingLengths => {
                encodings.padding_lengths = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::HardClipLengths => {
                encodings.hard_clip_lengths = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::SoftClipBases => {
                encodings.soft_clip_bases = Some(read_byte_array_encoding(src, &context)?);
            }
            DataSeries::MappingQualities => {
                encodings.mapping_qualities = Some(read_integer_encoding(src, &context)?);
            }
            DataSeries::Bases => {
                encodings.bases = Some(read_byte_encoding(src, &context)?);
            }
            DataSeries::QualityScores => {
                encodings.quality_scores = Some(read_byte_encoding(src, &context)?);
            }
            // CRAM 1.0 leftovers: parse and discard
            DataSeries::ReservedTagCounts | DataSeries::ReservedTagNamesAndTypes => {
                consume_encoding(src)?;
            }
        }
    }

    Ok(encodings)
}

/// Reads and discards one encoding of any type.
///
/// The parameter block is length-prefixed and self-contained, so skipping
/// the kind and the parameters skips the whole encoding.
fn consume_encoding(src: &mut &[u8]) -> Result<()> {
    use crate::io::reader::{collections::read_array, num::read_itf8};

    read_itf8(src)?;
    read_array(src)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::{encoding::codec::Integer, Encoding};

    #[test]
    fn test_read_data_series_encodings() -> Result<()> {
        let src = [
            0x0b, // map length = 11
            0x02, // entry count = 2
            b'B', b'F', 0x01, 0x01, 0x01, // BF: external, block 1
            b'T', b'C', 0x00, 0x01, 0x00, // TC: NULL (discarded)
        ];

        let encodings = read_data_series_encodings(&mut &src[..])?;

        assert_eq!(
            encodings.bam_flags,
            Some(Encoding::new(Integer::External {
                block_content_id: 1
            }))
        );
        assert!(encodings.cram_flags.is_none());

        Ok(())
    }

    #[test]
    fn test_read_data_series_encodings_with_invalid_key() {
        let src = [
            0x06, // map length
            0x01, // entry count = 1
            b'Z', b'Z', 0x01, 0x01, 0x01,
        ];

        assert!(matches!(
            read_data_series_encodings(&mut &src[..]),
            Err(Error::Malformed(_))
        ));
    }
}
