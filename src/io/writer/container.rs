pub(crate) mod block;
pub(crate) mod compression_header;
pub(crate) mod header;
pub(crate) mod slice;

use std::{collections::HashSet, io::Write};

use self::{
    block::write_block,
    compression_header::{build_compression_header, write_compression_header},
    header::write_header,
    slice::{build_slice, BuiltSlice},
};
use super::Options;
use crate::{
    codecs::CompressorCache,
    container::{
        block::{Block, CompressionMethod, ContentType},
        slice::Indexing,
        Header, ReferenceSequenceContext,
    },
    crai, Error, Record, ReferenceSource, Result,
};

/// Serializes one container: the compression header block followed by each
/// slice's blocks, preceded by the container header carrying the landmarks.
///
/// Returns the number of bytes written and the container's CRAI entries in
/// landmark order.
pub(crate) fn write_container<W>(
    writer: &mut W,
    reference_source: Option<&dyn ReferenceSource>,
    options: &Options,
    compressor_cache: &mut CompressorCache,
    record_counter: u64,
    container_byte_offset: u64,
    mut slices: Vec<Vec<Record>>,
) -> Result<(usize, Vec<crai::Entry>)>
where
    W: Write,
{
    assert!(!slices.is_empty());

    let mut compression_header = build_compression_header(options, &slices);

    let mut built_slices = Vec::with_capacity(slices.len());
    let mut slice_record_counter = record_counter;

    for records in &mut slices {
        let built = build_slice(
            reference_source,
            options,
            compressor_cache,
            slice_record_counter,
            &compression_header,
            records,
        )?;

        slice_record_counter += records.len() as u64;
        built_slices.push(built);
    }

    let reference_sequence_context = container_reference_sequence_context(&built_slices)?;

    let record_count: usize = slices.iter().map(Vec::len).sum();
    let base_count: u64 = slices
        .iter()
        .flatten()
        .map(|record| record.read_length() as u64)
        .sum();

    // prune data series that produced no blocks so the compression header
    // only declares what is present
    let used_content_ids: HashSet<_> = built_slices
        .iter()
        .flat_map(|s| s.external_blocks.iter().map(|b| b.content_id()))
        .collect();

    compression_header
        .data_series_encodings
        .retain_used_content_ids(&used_content_ids);

    let mut body = Vec::new();

    let compression_header_block =
        build_compression_header_block(&compression_header, compressor_cache)?;
    write_block(&mut body, &compression_header_block)?;

    let mut landmarks = Vec::with_capacity(built_slices.len());
    let mut slice_layouts = Vec::with_capacity(built_slices.len());

    for built in &built_slices {
        let slice_offset = body.len();
        landmarks.push(slice_offset);

        let mut header_buf = Vec::new();
        slice::write_header(&mut header_buf, &built.header)?;

        let slice_header_block = Block {
            compression_method: CompressionMethod::None,
            content_type: ContentType::SliceHeader,
            content_id: 0,
            uncompressed_size: header_buf.len(),
            src: header_buf,
        };

        write_block(&mut body, &slice_header_block)?;
        write_block(&mut body, &built.core_data_block)?;

        for block in &built.external_blocks {
            write_block(&mut body, block)?;
        }

        let slice_size = body.len() - slice_offset;

        slice_layouts.push(Indexing {
            landmark_index: slice_layouts.len(),
            byte_offset_from_compression_header_start: slice_offset as u64,
            byte_size: slice_size as u64,
        });
    }

    let header = Header {
        reference_sequence_context,
        record_count,
        record_counter,
        base_count,
        block_count: count_blocks(&built_slices),
        landmarks,
    };

    let mut header_buf = Vec::new();
    write_header(&mut header_buf, &header, body.len())?;

    writer.write_all(&header_buf)?;
    writer.write_all(&body)?;

    // derive CRAI entries now that the layout is known
    let mut entries = Vec::new();

    for ((built, indexing), records) in built_slices.iter().zip(&slice_layouts).zip(&slices) {
        let slice_entries = crai::entries_for_slice(
            built.header.reference_sequence_context(),
            records,
            container_byte_offset,
            indexing,
            options.encode_alignment_start_positions_as_deltas,
        )?;

        entries.extend(slice_entries);
    }

    Ok((header_buf.len() + body.len(), entries))
}

fn count_blocks(built_slices: &[BuiltSlice]) -> usize {
    // compression header + per slice: header + core + external blocks
    1 + built_slices
        .iter()
        .map(|s| 2 + s.external_blocks.len())
        .sum::<usize>()
}

fn container_reference_sequence_context(
    slices: &[BuiltSlice],
) -> Result<ReferenceSequenceContext> {
    let first = slices.first().expect("slices cannot be empty");
    let mut container_context = first.header.reference_sequence_context();

    for slice in slices.iter().skip(1) {
        let slice_context = slice.header.reference_sequence_context();

        container_context = match (container_context, slice_context) {
            (ReferenceSequenceContext::Some(a), ReferenceSequenceContext::Some(b))
                if a.reference_sequence_id() == b.reference_sequence_id() =>
            {
                ReferenceSequenceContext::some(
                    a.reference_sequence_id(),
                    a.alignment_start().min(b.alignment_start()),
                    a.alignment_end().max(b.alignment_end()),
                )
            }
            (ReferenceSequenceContext::None, ReferenceSequenceContext::None) => {
                ReferenceSequenceContext::None
            }
            (ReferenceSequenceContext::Many, ReferenceSequenceContext::Many) => {
                ReferenceSequenceContext::Many
            }
            _ => {
                return Err(Error::invalid_state(format!(
                    "container has mixed slice reference contexts: {container_context:?} and {slice_context:?}"
                )));
            }
        };
    }

    Ok(container_context)
}

fn build_compression_header_block(
    compression_header: &crate::container::CompressionHeader,
    compressor_cache: &mut CompressorCache,
) -> Result<Block> {
    use crate::codecs::Encoder;
    use flate2::Compression;

    let mut buf = Vec::new();
    write_compression_header(&mut buf, compression_header)?;

    let compressed = compressor_cache.compress(&Encoder::Gzip(Compression::default()), &buf)?;

    Ok(Block {
        compression_method: CompressionMethod::Gzip,
        content_type: ContentType::CompressionHeader,
        content_id: 0,
        uncompressed_size: buf.len(),
        src: compressed,
    })
}

// § 9 "End of file container" (2022-04-12): the fixed CRAM 3.0 sentinel.
pub(crate) static EOF: [u8; 38] = [
    0x0f, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0x0f, 0xe0, 0x45, 0x4f, 0x46, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x05, 0xbd, 0xd9, 0x4f, 0x00, 0x01, 0x00, 0x06, 0x06, 0x01, 0x00,
    0x01, 0x00, 0x01, 0x00, 0xee, 0x63, 0x01, 0x4b,
];

pub(crate) fn write_eof_container<W>(writer: &mut W) -> Result<()>
where
    W: Write,
{
    writer.write_all(&EOF)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn built_slice_with_context(context: ReferenceSequenceContext) -> BuiltSlice {
        let mut header = crate::container::slice::Header::default();
        header.reference_sequence_context = context;

        BuiltSlice {
            header,
            core_data_block: Block {
                compression_method: CompressionMethod::None,
                content_type: ContentType::CoreData,
                content_id: 0,
                uncompressed_size: 0,
                src: Vec::new(),
            },
            external_blocks: Vec::new(),
        }
    }

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_container_reference_sequence_context_with_single_reference() -> Result<()> {
        let slices = [
            built_slice_with_context(ReferenceSequenceContext::some(
                5,
                position(1),
                position(8),
            )),
            built_slice_with_context(ReferenceSequenceContext::some(
                5,
                position(13),
                position(21),
            )),
        ];

        assert_eq!(
            container_reference_sequence_context(&slices)?,
            ReferenceSequenceContext::some(5, position(1), position(21))
        );

        Ok(())
    }

    #[test]
    fn test_container_reference_sequence_context_with_multi_reference() -> Result<()> {
        let slices = [
            built_slice_with_context(ReferenceSequenceContext::Many),
            built_slice_with_context(ReferenceSequenceContext::Many),
        ];

        assert_eq!(
            container_reference_sequence_context(&slices)?,
            ReferenceSequenceContext::Many
        );

        Ok(())
    }

    #[test]
    fn test_container_reference_sequence_context_with_mixed_contexts() {
        let slices = [
            built_slice_with_context(ReferenceSequenceContext::some(
                0,
                position(1),
                position(4),
            )),
            built_slice_with_context(ReferenceSequenceContext::some(
                0,
                position(5),
                position(8),
            )),
            built_slice_with_context(ReferenceSequenceContext::None),
        ];

        assert!(matches!(
            container_reference_sequence_context(&slices),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_eof_container_is_38_bytes() {
        assert_eq!(EOF.len(), 38);
    }
}
