use std::{error, fmt};

use crate::container::block;

/// A data series: one of the named logical fields extracted across records.
///
/// Each data series has a canonical two-letter abbreviation and a stable
/// external block content id.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataSeries {
    /// BAM bit flags (`BF`).
    BamFlags,
    /// CRAM bit flags (`CF`).
    CramFlags,
    /// Reference id (`RI`).
    ReferenceSequenceIds,
    /// Read lengths (`RL`).
    ReadLengths,
    /// In-seq positions (`AP`).
    AlignmentStarts,
    /// Read groups (`RG`).
    ReadGroupIds,
    /// Read names (`RN`).
    Names,
    /// Next mate bit flags (`MF`).
    MateFlags,
    /// Next fragment reference sequence id (`NS`).
    MateReferenceSequenceIds,
    /// Next mate alignment start (`NP`).
    MateAlignmentStarts,
    /// Template size (`TS`).
    TemplateLengths,
    /// Distance to next fragment (`NF`).
    MateDistances,
    /// Tag ids (`TL`).
    TagSetIds,
    /// Number of read features (`FN`).
    FeatureCounts,
    /// Read features codes (`FC`).
    FeatureCodes,
    /// In-read positions (`FP`).
    FeaturePositionDeltas,
    /// Deletion lengths (`DL`).
    DeletionLengths,
    /// Stretches of bases (`BB`).
    StretchesOfBases,
    /// Stretches of quality scores (`QQ`).
    StretchesOfQualityScores,
    /// Base substitution codes (`BS`).
    BaseSubstitutionCodes,
    /// Insertions (`IN`).
    InsertionBases,
    /// Reference skip length (`RS`).
    ReferenceSkipLengths,
    /// Padding (`PD`).
    PaddingLengths,
    /// Hard clip (`HC`).
    HardClipLengths,
    /// Soft clips (`SC`).
    SoftClipBases,
    /// Mapping qualities (`MQ`).
    MappingQualities,
    /// Bases (`BA`).
    Bases,
    /// Quality scores (`QS`).
    QualityScores,
    /// Legacy CRAM 1.0 tag count (`TC`); tolerated on read, never written.
    ReservedTagCounts,
    /// Legacy CRAM 1.0 tag names and types (`TN`); tolerated on read, never
    /// written.
    ReservedTagNamesAndTypes,
}

/// The data series written by the default encoding map, in canonical order.
///
/// `BB`, `QQ`, `TC`, and `TN` are excluded: the first two are read-only bulk
/// series, the last two are CRAM 1.0 leftovers.
pub(crate) const STANDARD_DATA_SERIES: &[DataSeries] = &[
    DataSeries::BamFlags,
    DataSeries::CramFlags,
    DataSeries::ReferenceSequenceIds,
    DataSeries::ReadLengths,
    DataSeries::AlignmentStarts,
    DataSeries::ReadGroupIds,
    DataSeries::Names,
    DataSeries::MateFlags,
    DataSeries::MateReferenceSequenceIds,
    DataSeries::MateAlignmentStarts,
    DataSeries::TemplateLengths,
    DataSeries::MateDistances,
    DataSeries::TagSetIds,
    DataSeries::FeatureCounts,
    DataSeries::FeatureCodes,
    DataSeries::FeaturePositionDeltas,
    DataSeries::DeletionLengths,
    DataSeries::BaseSubstitutionCodes,
    DataSeries::InsertionBases,
    DataSeries::ReferenceSkipLengths,
    DataSeries::PaddingLengths,
    DataSeries::HardClipLengths,
    DataSeries::SoftClipBases,
    DataSeries::MappingQualities,
    DataSeries::Bases,
    DataSeries::QualityScores,
];

impl TryFrom<[u8; 2]> for DataSeries {
    type Error = TryFromByteArrayError;

    fn try_from(b: [u8; 2]) -> Result<Self, Self::Error> {
        match &b {
            b"BF" => Ok(Self::BamFlags),
            b"CF" => Ok(Self::CramFlags),
            b"RI" => Ok(Self::ReferenceSequenceIds),
            b"RL" => Ok(Self::ReadLengths),
            b"AP" => Ok(Self::AlignmentStarts),
            b"RG" => Ok(Self::ReadGroupIds),
            b"RN" => Ok(Self::Names),
            b"MF" => Ok(Self::MateFlags),
            b"NS" => Ok(Self::MateReferenceSequenceIds),
            b"NP" => Ok(Self::MateAlignmentStarts),
            b"TS" => Ok(Self::TemplateLengths),
            b"NF" => Ok(Self::MateDistances),
            b"TL" => Ok(Self::TagSetIds),
            b"FN" => Ok(Self::FeatureCounts),
            b"FC" => Ok(Self::FeatureCodes),
            b"FP" => Ok(Self::FeaturePositionDeltas),
            b"DL" => Ok(Self::DeletionLengths),
            b"BB" => Ok(Self::StretchesOfBases),
            b"QQ" => Ok(Self::StretchesOfQualityScores),
            b"BS" => Ok(Self::BaseSubstitutionCodes),
            b"IN" => Ok(Self::InsertionBases),
            b"RS" => Ok(Self::ReferenceSkipLengths),
            b"PD" => Ok(Self::PaddingLengths),
            b"HC" => Ok(Self::HardClipLengths),
            b"SC" => Ok(Self::SoftClipBases),
            b"MQ" => Ok(Self::MappingQualities),
            b"BA" => Ok(Self::Bases),
            b"QS" => Ok(Self::QualityScores),
            b"TC" => Ok(Self::ReservedTagCounts),
            b"TN" => Ok(Self::ReservedTagNamesAndTypes),
            _ => Err(TryFromByteArrayError(b)),
        }
    }
}

impl From<DataSeries> for [u8; 2] {
    fn from(data_series: DataSeries) -> Self {
        match data_series {
            DataSeries::BamFlags => *b"BF",
            DataSeries::CramFlags => *b"CF",
            DataSeries::ReferenceSequenceIds => *b"RI",
            DataSeries::ReadLengths => *b"RL",
            DataSeries::AlignmentStarts => *b"AP",
            DataSeries::ReadGroupIds => *b"RG",
            DataSeries::Names => *b"RN",
            DataSeries::MateFlags => *b"MF",
            DataSeries::MateReferenceSequenceIds => *b"NS",
            DataSeries::MateAlignmentStarts => *b"NP",
            DataSeries::TemplateLengths => *b"TS",
            DataSeries::MateDistances => *b"NF",
            DataSeries::TagSetIds => *b"TL",
            DataSeries::FeatureCounts => *b"FN",
            DataSeries::FeatureCodes => *b"FC",
            DataSeries::FeaturePositionDeltas => *b"FP",
            DataSeries::DeletionLengths => *b"DL",
            DataSeries::StretchesOfBases => *b"BB",
            DataSeries::StretchesOfQualityScores => *b"QQ",
            DataSeries::BaseSubstitutionCodes => *b"BS",
            DataSeries::InsertionBases => *b"IN",
            DataSeries::ReferenceSkipLengths => *b"RS",
            DataSeries::PaddingLengths => *b"PD",
            DataSeries::HardClipLengths => *b"HC",
            DataSeries::SoftClipBases => *b"SC",
            DataSeries::MappingQualities => *b"MQ",
            DataSeries::Bases => *b"BA",
            DataSeries::QualityScores => *b"QS",
            DataSeries::ReservedTagCounts => *b"TC",
            DataSeries::ReservedTagNamesAndTypes => *b"TN",
        }
    }
}

impl From<DataSeries> for block::ContentId {
    fn from(data_series: DataSeries) -> Self {
        match data_series {
            DataSeries::BamFlags => 1,
            DataSeries::CramFlags => 2,
            DataSeries::ReferenceSequenceIds => 3,
            DataSeries::ReadLengths => 4,
            DataSeries::AlignmentStarts => 5,
            DataSeries::ReadGroupIds => 6,
            DataSeries::Names => 7,
            DataSeries::MateFlags => 8,
            DataSeries::MateReferenceSequenceIds => 9,
            DataSeries::MateAlignmentStarts => 10,
            DataSeries::TemplateLengths => 11,
            DataSeries::MateDistances => 12,
            DataSeries::TagSetIds => 13,
            DataSeries::FeatureCounts => 14,
            DataSeries::FeatureCodes => 15,
            DataSeries::FeaturePositionDeltas => 16,
            DataSeries::DeletionLengths => 17,
            DataSeries::StretchesOfBases => 18,
            DataSeries::StretchesOfQualityScores => 19,
            DataSeries::BaseSubstitutionCodes => 20,
            DataSeries::InsertionBases => 21,
            DataSeries::ReferenceSkipLengths => 22,
            DataSeries::PaddingLengths => 23,
            DataSeries::HardClipLengths => 24,
            DataSeries::SoftClipBases => 25,
            DataSeries::MappingQualities => 26,
            DataSeries::Bases => 27,
            DataSeries::QualityScores => 28,
            DataSeries::ReservedTagCounts => 29,
            DataSeries::ReservedTagNamesAndTypes => 30,
        }
    }
}

impl fmt::Display for DataSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b0, b1] = <[u8; 2]>::from(*self);
        write!(f, "{}{}", b0 as char, b1 as char)
    }
}

/// An error returned when a two-byte key is not a known data series.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TryFromByteArrayError([u8; 2]);

impl error::Error for TryFromByteArrayError {}

impl fmt::Display for TryFromByteArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid data series: {:#x?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_round_trip() {
        for &data_series in STANDARD_DATA_SERIES {
            let b = <[u8; 2]>::from(data_series);
            assert_eq!(DataSeries::try_from(b), Ok(data_series));
        }

        assert!(DataSeries::try_from(*b"ZZ").is_err());
    }

    #[test]
    fn test_content_ids() {
        assert_eq!(block::ContentId::from(DataSeries::BamFlags), 1);
        assert_eq!(block::ContentId::from(DataSeries::QualityScores), 28);
        assert_eq!(block::ContentId::from(DataSeries::ReservedTagNamesAndTypes), 30);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataSeries::BamFlags.to_string(), "BF");
        assert_eq!(DataSeries::SoftClipBases.to_string(), "SC");
    }
}
