use std::collections::{BTreeMap, HashMap};

use crate::{
    alignment::data::{Array, Value},
    container::{
        block,
        compression_header::{
            encoding::codec::{Byte, ByteArray, Integer},
            preservation_map::tag_sets,
            DataSeries, Encoding,
        },
        CompressionHeader, ReferenceSequenceContext,
    },
    io::BitWriter,
    record::{feature::substitution, Feature},
    Error, Record, Result,
};

const MISSING_REFERENCE_SEQUENCE_ID: i32 = -1;
const MISSING_READ_GROUP_ID: i32 = -1;
const MISSING_MAPPING_QUALITY: i32 = 0xff;

/// The per-data-series output buffers of a slice, keyed by block content id.
///
/// An ordered map keeps external block emission deterministic.
pub(crate) type ExternalDataWriters = BTreeMap<block::ContentId, Vec<u8>>;

/// A per-slice record encoder, the mirror of the slice record reader.
pub(crate) struct Writer<'a> {
    compression_header: &'a CompressionHeader,
    core_data_writer: &'a mut BitWriter,
    external_data_writers: &'a mut ExternalDataWriters,
    reference_sequence_context: ReferenceSequenceContext,
    prev_alignment_start: i32,
    tag_set_ids: HashMap<Vec<tag_sets::Key>, usize>,
}

impl<'a> Writer<'a> {
    pub fn new(
        compression_header: &'a CompressionHeader,
        core_data_writer: &'a mut BitWriter,
        external_data_writers: &'a mut ExternalDataWriters,
        reference_sequence_context: ReferenceSequenceContext,
    ) -> Self {
        let prev_alignment_start = match reference_sequence_context {
            ReferenceSequenceContext::Some(context) => {
                usize::from(context.alignment_start()) as i32
            }
            _ => 0,
        };

        let tag_set_ids = compression_header
            .preservation_map()
            .tag_sets()
            .iter()
            .enumerate()
            .map(|(i, keys)| (keys.clone(), i))
            .collect();

        Self {
            compression_header,
            core_data_writer,
            external_data_writers,
            reference_sequence_context,
            prev_alignment_start,
            tag_set_ids,
        }
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.write_integer(
            DataSeries::BamFlags,
            i32::from(u16::from(record.bam_flags())),
        )?;
        self.write_integer(
            DataSeries::CramFlags,
            i32::from(u8::from(record.cram_flags())),
        )?;

        self.write_reference_sequence_id(record)?;
        self.write_integer(
            DataSeries::ReadLengths,
            i32::try_from(record.read_length())
                .map_err(|_| Error::invalid_state("read length overflow"))?,
        )?;
        self.write_alignment_start(record)?;
        self.write_integer(
            DataSeries::ReadGroupIds,
            record
                .read_group_id()
                .map(|id| id as i32)
                .unwrap_or(MISSING_READ_GROUP_ID),
        )?;

        let preservation_map = self.compression_header.preservation_map();

        if preservation_map.records_have_names() {
            self.write_name(record)?;
        }

        if record.cram_flags().is_detached() {
            self.write_integer(
                DataSeries::MateFlags,
                i32::from(u8::from(record.mate_flags())),
            )?;

            if !preservation_map.records_have_names() {
                self.write_name(record)?;
            }

            self.write_integer(
                DataSeries::MateReferenceSequenceIds,
                record
                    .mate_reference_sequence_id()
                    .map(|id| id as i32)
                    .unwrap_or(MISSING_REFERENCE_SEQUENCE_ID),
            )?;

            self.write_integer(
                DataSeries::MateAlignmentStarts,
                record
                    .mate_alignment_start()
                    .map(|position| usize::from(position) as i32)
                    .unwrap_or(0),
            )?;

            self.write_integer(DataSeries::TemplateLengths, record.template_length())?;
        } else if record.cram_flags().has_mate_downstream() {
            let distance = record
                .mate_distance()
                .ok_or_else(|| Error::invalid_state("attached mate without a distance"))?;

            self.write_integer(DataSeries::MateDistances, distance as i32)?;
        }

        self.write_tags(record)?;

        if record.bam_flags().is_unmapped() {
            if !record.cram_flags().sequence_is_missing() {
                for &base in record.sequence() {
                    self.write_byte(DataSeries::Bases, base)?;
                }
            }
        } else {
            self.write_features(record)?;

            self.write_integer(
                DataSeries::MappingQualities,
                record
                    .mapping_quality()
                    .map(|mapq| i32::from(u8::from(mapq)))
                    .unwrap_or(MISSING_MAPPING_QUALITY),
            )?;
        }

        if record.cram_flags().quality_scores_are_stored_as_array() {
            if record.quality_scores().len() != record.read_length() {
                return Err(Error::invalid_state(
                    "quality score length does not match read length",
                ));
            }

            for &score in record.quality_scores() {
                self.write_byte(DataSeries::QualityScores, score)?;
            }
        }

        Ok(())
    }

    fn write_reference_sequence_id(&mut self, record: &Record) -> Result<()> {
        if matches!(
            self.reference_sequence_context,
            ReferenceSequenceContext::Many
        ) {
            self.write_integer(
                DataSeries::ReferenceSequenceIds,
                record
                    .reference_sequence_id()
                    .map(|id| id as i32)
                    .unwrap_or(MISSING_REFERENCE_SEQUENCE_ID),
            )?;
        }

        Ok(())
    }

    fn write_alignment_start(&mut self, record: &Record) -> Result<()> {
        let alignment_start = record
            .alignment_start()
            .map(|position| usize::from(position) as i32)
            .unwrap_or(0);

        let n = if self
            .compression_header
            .preservation_map()
            .alignment_starts_are_deltas()
        {
            let delta = alignment_start - self.prev_alignment_start;
            self.prev_alignment_start = alignment_start;
            delta
        } else {
            alignment_start
        };

        self.write_integer(DataSeries::AlignmentStarts, n)
    }

    fn write_name(&mut self, record: &Record) -> Result<()> {
        let name = record.name().map(|name| name.to_vec()).unwrap_or_default();
        self.write_byte_array(DataSeries::Names, &name)
    }

    fn write_tags(&mut self, record: &Record) -> Result<()> {
        let keys: Vec<tag_sets::Key> = record
            .data()
            .iter()
            .map(|(tag, value)| tag_sets::Key::new(*tag, value.ty()))
            .collect();

        let tag_set_id = self
            .tag_set_ids
            .get(&keys)
            .copied()
            .ok_or_else(|| Error::invalid_state("record tag line missing from dictionary"))?;

        self.write_integer(DataSeries::TagSetIds, tag_set_id as i32)?;

        for ((_, value), key) in record.data().iter().zip(&keys) {
            let id = key.block_content_id();

            let encoding = self
                .compression_header
                .tag_encodings()
                .get(&id)
                .ok_or_else(|| Error::invalid_state(format!("missing tag encoding: {id}")))?;

            let buf = write_value(value)?;

            encoding.encode(self.core_data_writer, self.external_data_writers, &buf)?;
        }

        Ok(())
    }

    fn write_features(&mut self, record: &Record) -> Result<()> {
        self.write_integer(DataSeries::FeatureCounts, record.features().len() as i32)?;

        let mut prev_position = 0;

        for feature in record.features() {
            self.write_byte(DataSeries::FeatureCodes, feature.code())?;

            let position = usize::from(feature.position());
            let delta = position - prev_position;
            prev_position = position;

            self.write_integer(DataSeries::FeaturePositionDeltas, delta as i32)?;

            match feature {
                Feature::Bases { bases, .. } => {
                    self.write_byte_array(DataSeries::StretchesOfBases, bases)?;
                }
                Feature::Scores { quality_scores, .. } => {
                    self.write_byte_array(
                        DataSeries::StretchesOfQualityScores,
                        quality_scores,
                    )?;
                }
                Feature::ReadBase {
                    base,
                    quality_score,
                    ..
                } => {
                    self.write_byte(DataSeries::Bases, *base)?;
                    self.write_byte(DataSeries::QualityScores, *quality_score)?;
                }
                Feature::Substitution { value, .. } => {
                    let code = match value {
                        substitution::Value::Code(code) => *code,
                        substitution::Value::Bases(reference_base, read_base) => self
                            .compression_header
                            .preservation_map()
                            .substitution_matrix()
                            .find(*reference_base, *read_base),
                    };

                    self.write_byte(DataSeries::BaseSubstitutionCodes, code)?;
                }
                Feature::Insertion { bases, .. } => {
                    self.write_byte_array(DataSeries::InsertionBases, bases)?;
                }
                Feature::Deletion { len, .. } => {
                    self.write_integer(DataSeries::DeletionLengths, *len as i32)?;
                }
                Feature::InsertBase { base, .. } => {
                    self.write_byte(DataSeries::Bases, *base)?;
                }
                Feature::QualityScore { quality_score, .. } => {
                    self.write_byte(DataSeries::QualityScores, *quality_score)?;
                }
                Feature::ReferenceSkip { len, .. } => {
                    self.write_integer(DataSeries::ReferenceSkipLengths, *len as i32)?;
                }
                Feature::SoftClip { bases, .. } => {
                    self.write_byte_array(DataSeries::SoftClipBases, bases)?;
                }
                Feature::Padding { len, .. } => {
                    self.write_integer(DataSeries::PaddingLengths, *len as i32)?;
                }
                Feature::HardClip { len, .. } => {
                    self.write_integer(DataSeries::HardClipLengths, *len as i32)?;
                }
            }
        }

        Ok(())
    }

    fn write_integer(&mut self, data_series: DataSeries, value: i32) -> Result<()> {
        let encoding = integer_encoding(self.compression_header, data_series)?;

        encoding
            .encode(self.core_data_writer, self.external_data_writers, value)
            .map_err(Error::from)
    }

    fn write_byte(&mut self, data_series: DataSeries, value: u8) -> Result<()> {
        let encoding = byte_encoding(self.compression_header, data_series)?;

        encoding
            .encode(self.core_data_writer, self.external_data_writers, value)
            .map_err(Error::from)
    }

    fn write_byte_array(&mut self, data_series: DataSeries, value: &[u8]) -> Result<()> {
        let encoding = byte_array_encoding(self.compression_header, data_series)?;

        encoding
            .encode(self.core_data_writer, self.external_data_writers, value)
            .map_err(Error::from)
    }
}

/// Serializes a tag value into its BAM-style binary form.
fn write_value(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    match value {
        Value::Character(b) => buf.push(*b),
        Value::Int8(n) => buf.push(*n as u8),
        Value::UInt8(n) => buf.push(*n),
        Value::Int16(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::UInt16(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::Int32(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::UInt32(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::Float(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::String(s) | Value::Hex(s) => {
            buf.extend_from_slice(s.as_ref());
            buf.push(0x00);
        }
        Value::Array(array) => {
            write_array_value(&mut buf, array)?;
        }
    }

    Ok(buf)
}

fn write_array_value(buf: &mut Vec<u8>, array: &Array) -> Result<()> {
    fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<()> {
        let n = u32::try_from(len).map_err(|_| Error::invalid_state("array too large"))?;
        buf.extend_from_slice(&n.to_le_bytes());
        Ok(())
    }

    match array {
        Array::Int8(values) => {
            buf.push(b'c');
            write_len(buf, values.len())?;
            buf.extend(values.iter().map(|&n| n as u8));
        }
        Array::UInt8(values) => {
            buf.push(b'C');
            write_len(buf, values.len())?;
            buf.extend_from_slice(values);
        }
        Array::Int16(values) => {
            buf.push(b's');
            write_len(buf, values.len())?;
            for n in values {
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
        Array::UInt16(values) => {
            buf.push(b'S');
            write_len(buf, values.len())?;
            for n in values {
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
        Array::Int32(values) => {
            buf.push(b'i');
            write_len(buf, values.len())?;
            for n in values {
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
        Array::UInt32(values) => {
            buf.push(b'I');
            write_len(buf, values.len())?;
            for n in values {
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
        Array::Float(values) => {
            buf.push(b'f');
            write_len(buf, values.len())?;
            for n in values {
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
    }

    Ok(())
}

fn missing_encoding(data_series: DataSeries) -> Error {
    Error::invalid_state(format!("missing data series encoding: {data_series}"))
}

fn integer_encoding(
    compression_header: &CompressionHeader,
    data_series: DataSeries,
) -> Result<&Encoding<Integer>> {
    let encodings = &compression_header.data_series_encodings;

    let encoding = match data_series {
        DataSeries::BamFlags => encodings.bam_flags.as_ref(),
        DataSeries::CramFlags => encodings.cram_flags.as_ref(),
        DataSeries::ReferenceSequenceIds => encodings.reference_sequence_ids.as_ref(),
        DataSeries::ReadLengths => encodings.read_lengths.as_ref(),
        DataSeries::AlignmentStarts => encodings.alignment_starts.as_ref(),
        DataSeries::ReadGroupIds => encodings.read_group_ids.as_ref(),
        DataSeries::MateFlags => encodings.mate_flags.as_ref(),
        DataSeries::MateReferenceSequenceIds => encodings.mate_reference_sequence_ids.as_ref(),
        DataSeries::MateAlignmentStarts => encodings.mate_alignment_starts.as_ref(),
        DataSeries::TemplateLengths => encodings.template_lengths.as_ref(),
        DataSeries::MateDistances => encodings.mate_distances.as_ref(),
        DataSeries::TagSetIds => encodings.tag_set_ids.as_ref(),
        DataSeries::FeatureCounts => encodings.feature_counts.as_ref(),
        DataSeries::FeaturePositionDeltas => encodings.feature_position_deltas.as_ref(),
        DataSeries::DeletionLengths => encodings.deletion_lengths.as_ref(),
        DataSeries::ReferenceSkipLengths => encodings.reference_skip_lengths.as_ref(),
        DataSeries::PaddingLengths => encodings.padding_lengths.as_ref(),
        DataSeries::HardClipLengths => encodings.hard_clip_lengths.as_ref(),
        DataSeries::MappingQualities => encodings.mapping_qualities.as_ref(),
        _ => None,
    };

    encoding.ok_or_else(|| missing_encoding(data_series))
}

fn byte_encoding(
    compression_header: &CompressionHeader,
    data_series: DataSeries,
) -> Result<&Encoding<Byte>> {
    let encodings = &compression_header.data_series_encodings;

    let encoding = match data_series {
        DataSeries::FeatureCodes => encodings.feature_codes.as_ref(),
        DataSeries::BaseSubstitutionCodes => encodings.base_substitution_codes.as_ref(),
        DataSeries::Bases => encodings.bases.as_ref(),
        DataSeries::QualityScores => encodings.quality_scores.as_ref(),
        _ => None,
    };

    encoding.ok_or_else(|| missing_encoding(data_series))
}

fn byte_array_encoding(
    compression_header: &CompressionHeader,
    data_series: DataSeries,
) -> Result<&Encoding<ByteArray>> {
    let encodings = &compression_header.data_series_encodings;

    let encoding = match data_series {
        DataSeries::Names => encodings.names.as_ref(),
        DataSeries::StretchesOfBases => encodings.stretches_of_bases.as_ref(),
        DataSeries::StretchesOfQualityScores => encodings.stretches_of_quality_scores.as_ref(),
        DataSeries::InsertionBases => encodings.insertion_bases.as_ref(),
        DataSeries::SoftClipBases => encodings.soft_clip_bases.as_ref(),
        _ => None,
    };

    encoding.ok_or_else(|| missing_encoding(data_series))
}
