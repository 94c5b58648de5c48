mod data;
mod external_data_readers;

pub use self::external_data_readers::ExternalDataReaders;

use bstr::BString;

use crate::{
    alignment::{
        self,
        data::{Tag, Value},
        MappingQuality,
    },
    container::{
        compression_header::{
            encoding::codec::{Byte, ByteArray, Integer},
            DataSeries, Encoding,
        },
        CompressionHeader, ReferenceSequenceContext,
    },
    io::BitReader,
    record::{feature::substitution, Feature, Flags, MateFlags},
    Error, Position, Record, Result,
};

const MISSING_REFERENCE_SEQUENCE_ID: i32 = -1;
const MISSING_READ_GROUP_ID: i32 = -1;

/// A per-slice record decoder.
///
/// Walks the data series streams in the canonical field order, one record
/// per call.
pub struct Reader<'a, 'de> {
    compression_header: &'a CompressionHeader,
    core_data_reader: &'a mut BitReader<'de>,
    external_data_readers: &'a mut ExternalDataReaders<'de>,
    reference_sequence_context: ReferenceSequenceContext,
    prev_alignment_start: i32,
    record_counter: u64,
}

impl<'a, 'de> Reader<'a, 'de> {
    pub fn new(
        compression_header: &'a CompressionHeader,
        core_data_reader: &'a mut BitReader<'de>,
        external_data_readers: &'a mut ExternalDataReaders<'de>,
        reference_sequence_context: ReferenceSequenceContext,
        record_counter: u64,
    ) -> Self {
        let prev_alignment_start = match reference_sequence_context {
            ReferenceSequenceContext::Some(context) => {
                usize::from(context.alignment_start()) as i32
            }
            _ => 0,
        };

        Self {
            compression_header,
            core_data_reader,
            external_data_readers,
            reference_sequence_context,
            prev_alignment_start,
            record_counter,
        }
    }

    pub fn read_record(&mut self) -> Result<Record> {
        let mut record = Record::default();

        record.id = self.record_counter;
        self.record_counter += 1;

        record.bam_flags =
            alignment::Flags::from(self.read_integer(DataSeries::BamFlags)? as u16);
        record.cram_flags = Flags::from(self.read_integer(DataSeries::CramFlags)? as u8);

        record.reference_sequence_id = self.read_reference_sequence_id()?;
        record.read_length = usize::try_from(self.read_integer(DataSeries::ReadLengths)?)
            .map_err(|_| Error::malformed("invalid read length"))?;
        record.alignment_start = self.read_alignment_start()?;
        record.read_group_id = self.read_read_group_id()?;

        let preservation_map = self.compression_header.preservation_map();

        if preservation_map.records_have_names() {
            record.name = self.read_name()?;
        }

        if record.cram_flags.is_detached() {
            record.mate_flags =
                MateFlags::from(self.read_integer(DataSeries::MateFlags)? as u8);

            if !preservation_map.records_have_names() {
                record.name = self.read_name()?;
            }

            record.mate_reference_sequence_id = self
                .read_integer(DataSeries::MateReferenceSequenceIds)
                .map(|n| match n {
                    MISSING_REFERENCE_SEQUENCE_ID => None,
                    _ => Some(n as usize),
                })?;

            record.mate_alignment_start = self
                .read_integer(DataSeries::MateAlignmentStarts)
                .map(|n| Position::new(n.max(0) as usize))?;

            record.template_length = self.read_integer(DataSeries::TemplateLengths)?;

            // keep the duplicated flag bits coherent
            if record.mate_flags.is_unmapped() {
                record.bam_flags.insert(alignment::Flags::MATE_UNMAPPED);
            }

            if record.mate_flags.is_on_negative_strand() {
                record
                    .bam_flags
                    .insert(alignment::Flags::MATE_REVERSE_COMPLEMENTED);
            }
        } else if record.cram_flags.has_mate_downstream() {
            record.mate_distance = self
                .read_integer(DataSeries::MateDistances)
                .map(|n| n as usize)
                .map(Some)?;
        }

        record.data = self.read_tags()?;

        if record.bam_flags.is_unmapped() {
            if !record.cram_flags.sequence_is_missing() {
                record.sequence = self.read_bases(record.read_length)?;
            }
        } else {
            record.features = self.read_features()?;

            record.mapping_quality = self
                .read_integer(DataSeries::MappingQualities)
                .map(|n| MappingQuality::new(n as u8))?;
        }

        if record.cram_flags.quality_scores_are_stored_as_array() {
            record.quality_scores = self.read_quality_scores(record.read_length)?;
        }

        Ok(record)
    }

    fn read_reference_sequence_id(&mut self) -> Result<Option<usize>> {
        match self.reference_sequence_context {
            ReferenceSequenceContext::Some(context) => {
                Ok(Some(context.reference_sequence_id()))
            }
            ReferenceSequenceContext::None => Ok(None),
            ReferenceSequenceContext::Many => self
                .read_integer(DataSeries::ReferenceSequenceIds)
                .map(|n| match n {
                    MISSING_REFERENCE_SEQUENCE_ID => None,
                    _ => Some(n as usize),
                }),
        }
    }

    fn read_alignment_start(&mut self) -> Result<Option<Position>> {
        let n = self.read_integer(DataSeries::AlignmentStarts)?;

        let alignment_start = if self
            .compression_header
            .preservation_map()
            .alignment_starts_are_deltas()
        {
            let pos = self.prev_alignment_start + n;
            self.prev_alignment_start = pos;
            pos
        } else {
            n
        };

        if alignment_start < 0 {
            return Err(Error::malformed("negative alignment start"));
        }

        Ok(Position::new(alignment_start as usize))
    }

    fn read_read_group_id(&mut self) -> Result<Option<usize>> {
        self.read_integer(DataSeries::ReadGroupIds).map(|n| match n {
            MISSING_READ_GROUP_ID => None,
            _ => Some(n as usize),
        })
    }

    fn read_name(&mut self) -> Result<Option<BString>> {
        let encoding = byte_array_encoding(self.compression_header, DataSeries::Names)?;
        let buf = encoding.decode(self.core_data_reader, self.external_data_readers)?;

        if buf.is_empty() {
            Ok(None)
        } else {
            Ok(Some(BString::from(buf)))
        }
    }

    fn read_tags(&mut self) -> Result<Vec<(Tag, Value)>> {
        let tag_set_id = usize::try_from(self.read_integer(DataSeries::TagSetIds)?)
            .map_err(|_| Error::malformed("invalid tag set ID"))?;

        let tag_sets = self.compression_header.preservation_map().tag_sets();

        let keys = tag_sets
            .get(tag_set_id)
            .ok_or_else(|| Error::malformed(format!("invalid tag set ID: {tag_set_id}")))?;

        let mut fields = Vec::with_capacity(keys.len());

        for key in keys {
            let id = key.block_content_id();

            let encoding = self
                .compression_header
                .tag_encodings()
                .get(&id)
                .ok_or_else(|| {
                    Error::malformed(format!("missing tag encoding: {id}"))
                })?;

            let buf = encoding.decode(self.core_data_reader, self.external_data_readers)?;
            let value = data::read_value(&buf, key.ty())?;

            fields.push((key.tag(), value));
        }

        Ok(fields)
    }

    fn read_features(&mut self) -> Result<Vec<Feature>> {
        let len = usize::try_from(self.read_integer(DataSeries::FeatureCounts)?)
            .map_err(|_| Error::malformed("invalid feature count"))?;

        let mut features = Vec::with_capacity(len);
        let mut prev_position = 0;

        for _ in 0..len {
            let code = self.read_byte(DataSeries::FeatureCodes)?;

            let delta = usize::try_from(self.read_integer(DataSeries::FeaturePositionDeltas)?)
                .map_err(|_| Error::malformed("invalid feature position delta"))?;

            let position = Position::new(prev_position + delta)
                .ok_or_else(|| Error::malformed("invalid feature position"))?;
            prev_position += delta;

            let feature = self.read_feature(code, position)?;
            features.push(feature);
        }

        Ok(features)
    }

    fn read_feature(&mut self, code: u8, position: Position) -> Result<Feature> {
        match code {
            b'b' => {
                let bases = self.read_byte_array(DataSeries::StretchesOfBases)?;
                Ok(Feature::Bases { position, bases })
            }
            b'q' => {
                let quality_scores =
                    self.read_byte_array(DataSeries::StretchesOfQualityScores)?;
                Ok(Feature::Scores {
                    position,
                    quality_scores,
                })
            }
            b'B' => {
                let base = self.read_byte(DataSeries::Bases)?;
                let quality_score = self.read_byte(DataSeries::QualityScores)?;
                Ok(Feature::ReadBase {
                    position,
                    base,
                    quality_score,
                })
            }
            b'X' => {
                let code = self.read_byte(DataSeries::BaseSubstitutionCodes)?;
                Ok(Feature::Substitution {
                    position,
                    value: substitution::Value::Code(code),
                })
            }
            b'I' => {
                let bases = self.read_byte_array(DataSeries::InsertionBases)?;
                Ok(Feature::Insertion { position, bases })
            }
            b'D' => {
                let len = self.read_length_value(DataSeries::DeletionLengths)?;
                Ok(Feature::Deletion { position, len })
            }
            b'i' => {
                let base = self.read_byte(DataSeries::Bases)?;
                Ok(Feature::InsertBase { position, base })
            }
            b'Q' => {
                let quality_score = self.read_byte(DataSeries::QualityScores)?;
                Ok(Feature::QualityScore {
                    position,
                    quality_score,
                })
            }
            b'N' => {
                let len = self.read_length_value(DataSeries::ReferenceSkipLengths)?;
                Ok(Feature::ReferenceSkip { position, len })
            }
            b'S' => {
                let bases = self.read_byte_array(DataSeries::SoftClipBases)?;
                Ok(Feature::SoftClip { position, bases })
            }
            b'P' => {
                let len = self.read_length_value(DataSeries::PaddingLengths)?;
                Ok(Feature::Padding { position, len })
            }
            b'H' => {
                let len = self.read_length_value(DataSeries::HardClipLengths)?;
                Ok(Feature::HardClip { position, len })
            }
            _ => Err(Error::malformed(format!(
                "invalid read feature code: {code:#04x}"
            ))),
        }
    }

    fn read_bases(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bases = Vec::with_capacity(len);

        for _ in 0..len {
            bases.push(self.read_byte(DataSeries::Bases)?);
        }

        Ok(bases)
    }

    fn read_quality_scores(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut scores = Vec::with_capacity(len);

        for _ in 0..len {
            scores.push(self.read_byte(DataSeries::QualityScores)?);
        }

        Ok(scores)
    }

    fn read_length_value(&mut self, data_series: DataSeries) -> Result<usize> {
        usize::try_from(self.read_integer(data_series)?)
            .map_err(|_| Error::malformed("invalid length value"))
    }

    fn read_integer(&mut self, data_series: DataSeries) -> Result<i32> {
        let encoding = integer_encoding(self.compression_header, data_series)?;

        encoding
            .decode(self.core_data_reader, self.external_data_readers)
            .map_err(Error::from)
    }

    fn read_byte(&mut self, data_series: DataSeries) -> Result<u8> {
        let encoding = byte_encoding(self.compression_header, data_series)?;

        encoding
            .decode(self.core_data_reader, self.external_data_readers)
            .map_err(Error::from)
    }

    fn read_byte_array(&mut self, data_series: DataSeries) -> Result<Vec<u8>> {
        let encoding = byte_array_encoding(self.compression_header, data_series)?;

        encoding
            .decode(self.core_data_reader, self.external_data_readers)
            .map_err(Error::from)
    }
}

fn missing_encoding(data_series: DataSeries) -> Error {
    Error::malformed(format!("missing data series encoding: {data_series}"))
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
