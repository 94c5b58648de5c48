//! Block content compressor selection.

use std::collections::HashMap;

use flate2::Compression;

use super::{block, compression_header::DataSeries};
use crate::codecs::{rans_4x8, Encoder};

/// A map from block content to the compressor used for that block's payload.
///
/// This chooses how each external block is byte-compressed, independently of
/// the (encoding) schema in the compression header. `None` for an entry
/// means the block is written raw.
#[derive(Clone, Debug)]
pub struct BlockContentEncoderMap {
    core_data_encoder: Option<Encoder>,
    data_series_encoders: HashMap<block::ContentId, Option<Encoder>>,
    tag_values_encoder: Option<Encoder>,
}

impl BlockContentEncoderMap {
    /// Builds the default map with the given gzip level.
    ///
    /// Defaults follow the reference encoder: rANS order-0 for `AP` and
    /// `RI`; rANS order-1 for the base, flag, and score streams (`BA`, `BF`,
    /// `CF`, `NS`, `QS`, `RG`, `RL`, `TS`); gzip for everything else,
    /// including tag value blocks.
    pub fn with_gzip_level(compression_level: Compression) -> Self {
        use DataSeries::*;

        let gzip = Some(Encoder::Gzip(compression_level));
        let rans_0 = Some(Encoder::Rans4x8(rans_4x8::Order::Zero));
        let rans_1 = Some(Encoder::Rans4x8(rans_4x8::Order::One));

        let mut data_series_encoders = HashMap::new();

        for (data_series, encoder) in [
            (AlignmentStarts, rans_0),
            (ReferenceSequenceIds, rans_0),
            (Bases, rans_1),
            (BamFlags, rans_1),
            (CramFlags, rans_1),
            (MateReferenceSequenceIds, rans_1),
            (QualityScores, rans_1),
            (ReadGroupIds, rans_1),
            (ReadLengths, rans_1),
            (TemplateLengths, rans_1),
            (BaseSubstitutionCodes, gzip),
            (DeletionLengths, gzip),
            (FeatureCodes, gzip),
            (FeatureCounts, gzip),
            (FeaturePositionDeltas, gzip),
            (HardClipLengths, gzip),
            (InsertionBases, gzip),
            (MateFlags, gzip),
            (MappingQualities, gzip),
            (MateDistances, gzip),
            (MateAlignmentStarts, gzip),
            (PaddingLengths, gzip),
            (Names, gzip),
            (ReferenceSkipLengths, gzip),
            (SoftClipBases, gzip),
            (TagSetIds, gzip),
        ] {
            data_series_encoders.insert(block::ContentId::from(data_series), encoder);
        }

        Self {
            core_data_encoder: gzip,
            data_series_encoders,
            tag_values_encoder: gzip,
        }
    }

    /// Returns the compressor for the core data block.
    pub fn core_data_encoder(&self) -> Option<&Encoder> {
        self.core_data_encoder.as_ref()
    }

    /// Returns the compressor for a data series block, or `None` if the
    /// content id is not a known data series.
    pub fn get_data_series_encoder(
        &self,
        block_content_id: block::ContentId,
    ) -> Option<Option<&Encoder>> {
        self.data_series_encoders
            .get(&block_content_id)
            .map(|encoder| encoder.as_ref())
    }

    /// Returns the compressor for tag value blocks.
    pub fn tag_values_encoder(&self) -> Option<&Encoder> {
        self.tag_values_encoder.as_ref()
    }

    pub(crate) fn set_data_series_encoder(
        &mut self,
        block_content_id: block::ContentId,
        encoder: Option<Encoder>,
    ) {
        self.data_series_encoders.insert(block_content_id, encoder);
    }

    pub(crate) fn set_core_data_encoder(&mut self, encoder: Option<Encoder>) {
        self.core_data_encoder = encoder;
    }
}

impl Default for BlockContentEncoderMap {
    fn default() -> Self {
        Self::with_gzip_level(Compression::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assignments() {
        let map = BlockContentEncoderMap::default();

        assert!(matches!(
            map.get_data_series_encoder(block::ContentId::from(DataSeries::AlignmentStarts)),
            Some(Some(Encoder::Rans4x8(rans_4x8::Order::Zero)))
        ));

        assert!(matches!(
            map.get_data_series_encoder(block::ContentId::from(DataSeries::QualityScores)),
            Some(Some(Encoder::Rans4x8(rans_4x8::Order::One)))
        ));

        assert!(matches!(
            map.get_data_series_encoder(block::ContentId::from(DataSeries::Names)),
            Some(Some(Encoder::Gzip(_)))
        ));

        // tag value blocks are not data series
        assert!(map.get_data_series_encoder(5131619).is_none());
        assert!(matches!(map.tag_values_encoder(), Some(Encoder::Gzip(_))));
    }
}
