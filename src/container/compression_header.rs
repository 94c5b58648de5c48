//! The per-container compression header.

pub(crate) mod data_series_encodings;
pub mod encoding;
pub(crate) mod preservation_map;

pub(crate) use self::{
    data_series_encodings::DataSeriesEncodings, preservation_map::PreservationMap,
};
pub use self::{data_series_encodings::DataSeries, encoding::Encoding};

use std::collections::BTreeMap;

use self::encoding::codec::ByteArray;
use super::block;

/// Per-tag encodings, keyed by the tag key's block content id.
pub(crate) type TagEncodings = BTreeMap<block::ContentId, Encoding<ByteArray>>;

/// A compression header: the per-container schema mapping each data series
/// and tag to its encoding, plus preservation settings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompressionHeader {
    pub(crate) preservation_map: PreservationMap,
    pub(crate) data_series_encodings: DataSeriesEncodings,
    pub(crate) tag_encodings: TagEncodings,
}

impl CompressionHeader {
    pub(crate) fn new(
        preservation_map: PreservationMap,
        data_series_encodings: DataSeriesEncodings,
        tag_encodings: TagEncodings,
    ) -> Self {
        Self {
            preservation_map,
            data_series_encodings,
            tag_encodings,
        }
    }

    pub(crate) fn preservation_map(&self) -> &PreservationMap {
        &self.preservation_map
    }

    pub(crate) fn data_series_encodings(&self) -> &DataSeriesEncodings {
        &self.data_series_encodings
    }

    pub(crate) fn tag_encodings(&self) -> &TagEncodings {
        &self.tag_encodings
    }
}
