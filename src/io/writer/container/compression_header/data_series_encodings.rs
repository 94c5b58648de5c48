use std::io::Write;

use super::encoding::{write_byte_array_encoding, write_byte_encoding, write_integer_encoding};
use crate::{
    container::compression_header::{DataSeries, DataSeriesEncodings},
    io::writer::{collections::write_array, num::write_itf8},
    Result,
};

pub(super) fn write_data_series_encodings(
    writer: &mut impl Write,
    encodings: &DataSeriesEncodings,
) -> Result<()> {
    let mut buf = Vec::new();
    encode_inner(&mut buf, encodings)?;
    write_array(writer, &buf)?;
    Ok(())
}

fn encode_inner(writer: &mut Vec<u8>, encodings: &DataSeriesEncodings) -> Result<()> {
    // serialize entries first to learn the count
    let mut entries = Vec::new();
    let mut n = 0;

    macro_rules! write_entry {
        ($field:ident, $series:expr, $write_fn:ident) => {
            if let Some(encoding) = encodings.$field.as_ref() {
                write_data_series(&mut entries, $series)?;
                $write_fn(&mut entries, encoding)?;
                n += 1;
            }
        };
    }

    write_entry!(bam_flags, DataSeries::BamFlags, write_integer_encoding);
    write_entry!(cram_flags, DataSeries::CramFlags, write_integer_encoding);
    write_entry!(
        reference_sequence_ids,
        DataSeries::ReferenceSequenceIds,
        write_integer_encoding
    );
    write_entry!(read_lengths, DataSeries::ReadLengths, write_integer_encoding);
    write_entry!(
        alignment_starts,
        DataSeries::AlignmentStarts,
        write_integer_encoding
    );
    write_entry!(
        read_group_ids,
        DataSeries::ReadGroupIds,
        write_integer_encoding
    );
    write_entry!(names, DataSeries::Names, write_byte_array_encoding);
    write_entry!(mate_flags, DataSeries::MateFlags, write_integer_encoding);
    write_entry!(
        mate_reference_sequence_ids,
        DataSeries::MateReferenceSequenceIds,
        write_integer_encoding
    );
    write_entry!(
        mate_alignment_starts,
        DataSeries::MateAlignmentStarts,
        write_integer_encoding
    );
    write_entry!(
        template_lengths,
        DataSeries::TemplateLengths,
        write_integer_encoding
    );
    write_entry!(
        mate_distances,
        DataSeries::MateDistances,
        write_integer_encoding
    );
    write_entry!(tag_set_ids, DataSeries::TagSetIds, write_integer_encoding);
    write_entry!(
        feature_counts,
        DataSeries::FeatureCounts,
        write_integer_encoding
    );
    write_entry!(feature_codes, DataSeries::FeatureCodes, write_byte_encoding);
    write_entry!(
        feature_position_deltas,
        DataSeries::FeaturePositionDeltas,
        write_integer_encoding
    );
    write_entry!(
        deletion_lengths,
        DataSeries::DeletionLengths,
        write_integer_encoding
    );
    write_entry!(
        stretches_of_bases,
        DataSeries::StretchesOfBases,
        write_byte_array_encoding
    );
    write_entry!(
        stretches_of_quality_scores,
        DataSeries::StretchesOfQualityScores,
        write_byte_array_encoding
    );
    write_entry!(
        base_substitution_codes,
        DataSeries::BaseSubstitutionCodes,
        write_byte_encoding
    );
    write_entry!(
        insertion_bases,
        DataSeries::InsertionBases,
        write_byte_array_encoding
    );
    write_entry!(
        reference_skip_lengths,
        DataSeries::ReferenceSkipLengths,
        write_integer_encoding
    );
    write_entry!(
        padding_lengths,
        DataSeries::PaddingLengths,
        write_integer_encoding
    );
    write_entry!(
        hard_clip_lengths,
        DataSeries::HardClipLengths,
        write_integer_encoding
    );
    write_entry!(
        soft_clip_bases,
        DataSeries::SoftClipBases,
        write_byte_array_encoding
    );
    write_entry!(
        mapping_qualities,
        DataSeries::MappingQualities,
        write_integer_encoding
    );
    write_entry!(bases, DataSeries::Bases, write_byte_encoding);
    write_entry!(quality_scores, DataSeries::QualityScores, write_byte_encoding);

    write_itf8(writer, n)?;
    writer.extend_from_slice(&entries);

    Ok(())
}

fn write_data_series(writer: &mut Vec<u8>, data_series: DataSeries) -> Result<()> {
    let key = <[u8; 2]>::from(data_series);
    writer.extend_from_slice(&key);
    Ok(())
}
