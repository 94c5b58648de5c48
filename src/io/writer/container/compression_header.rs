mod data_series_encodings;
mod encoding;
mod preservation_map;
mod tag_encodings;

use std::io::Write;

use self::{
    data_series_encodings::write_data_series_encodings,
    preservation_map::{build_preservation_map, write_preservation_map},
    tag_encodings::{build_tag_encodings, write_tag_encodings},
};
use super::super::Options;
use crate::{
    container::{
        block,
        compression_header::{
            encoding::codec::ByteArray, DataSeries, DataSeriesEncodings, Encoding,
        },
        CompressionHeader,
    },
    record::Feature,
    Record, Result,
};

/// Builds the compression header for one container's records: preservation
/// settings from the options, the substitution matrix from observed
/// mismatches, the tag dictionary from observed tag lines, and the default
/// external encoding map.
pub(crate) fn build_compression_header(
    options: &Options,
    slices: &[Vec<Record>],
) -> CompressionHeader {
    let records = slices.iter().flatten();

    let preservation_map = build_preservation_map(options, records.clone());
    let tag_encodings = build_tag_encodings(&preservation_map.tag_sets);

    let mut data_series_encodings = DataSeriesEncodings::init();

    // base stretches only appear when bases are embedded instead of
    // reference-compressed; the BB series stays undeclared otherwise
    let uses_base_stretches = records
        .clone()
        .any(|record| {
            record
                .features()
                .iter()
                .any(|feature| matches!(feature, Feature::Bases { .. }))
        });

    if uses_base_stretches {
        data_series_encodings.stretches_of_bases = Some(Encoding::new(ByteArray::ByteArrayStop {
            stop_byte: b'\t',
            block_content_id: block::ContentId::from(DataSeries::StretchesOfBases),
        }));
    }

    CompressionHeader::new(preservation_map, data_series_encodings, tag_encodings)
}

pub(crate) fn write_compression_header<W>(
    writer: &mut W,
    compression_header: &CompressionHeader,
) -> Result<()>
where
    W: Write,
{
    write_preservation_map(writer, compression_header.preservation_map())?;
    write_data_series_encodings(writer, compression_header.data_series_encodings())?;
    write_tag_encodings(writer, compression_header.tag_encodings())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::container::compression_header::read_compression_header;
    use crate::{
        alignment::data::{Tag, Value},
        container::block::ContentType,
        io::writer::container::block::{build_block, write_block},
        record::{feature::substitution, Feature},
        Position,
    };

    #[test]
    fn test_compression_header_round_trips() -> Result<()> {
        let mut record = Record::default();
        record.data = vec![(Tag::ALIGNMENT_SCORE, Value::Int32(13))];
        record.features = vec![Feature::Substitution {
            position: Position::new(1).unwrap(),
            value: substitution::Value::Bases(
                substitution::Base::C,
                substitution::Base::T,
            ),
        }];

        let slices = vec![vec![record]];
        let options = Options::default();

        let compression_header = build_compression_header(&options, &slices);

        let mut buf = Vec::new();
        write_compression_header(&mut buf, &compression_header)?;

        let mut cache = crate::codecs::CompressorCache::new();
        let block = build_block(ContentType::CompressionHeader, 0, None, &mut cache, &buf)?;

        let mut wire = Vec::new();
        write_block(&mut wire, &block)?;

        let decoded =
            read_compression_header(&mut &wire[..], crate::file_definition::Version::V3_0)?;

        assert_eq!(&decoded, &compression_header);

        Ok(())
    }
}
