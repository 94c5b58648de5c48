mod header;
pub(crate) mod records;

use std::collections::HashMap;

pub(crate) use self::header::write_header;
use self::records::ExternalDataWriters;
use super::{super::Options, block::build_block};
use crate::{
    calculate_normalized_sequence_digest,
    codecs::CompressorCache,
    container::{
        block::{self, Block, ContentType},
        compression_header::data_series_encodings::data_series::STANDARD_DATA_SERIES,
        slice::Header,
        CompressionHeader, ReferenceSequenceContext,
    },
    io::BitWriter,
    record::Flags,
    Error, Record, ReferenceSource, Result,
};

/// Block content id used for embedded reference sequences.
///
/// This must not collide with any data series (1-30) or tag encoding
/// content id.
const EMBEDDED_REFERENCE_CONTENT_ID: block::ContentId = i32::MAX;

const CORE_DATA_BLOCK_CONTENT_ID: block::ContentId = 0;

/// A slice serialized down to its blocks, pending container layout.
pub(crate) struct BuiltSlice {
    pub(crate) header: Header,
    pub(crate) core_data_block: Block,
    pub(crate) external_blocks: Vec<Block>,
}

pub(crate) fn build_slice(
    reference_source: Option<&dyn ReferenceSource>,
    options: &Options,
    compressor_cache: &mut CompressorCache,
    record_counter: u64,
    compression_header: &CompressionHeader,
    records: &mut [Record],
) -> Result<BuiltSlice> {
    let reference_sequence_context = get_reference_sequence_context(records);

    set_mates(records);

    let (core_data_buf, external_data_bufs) =
        write_records(compression_header, reference_sequence_context, records)?;

    let (core_data_block, mut external_blocks) = build_blocks(
        options,
        compressor_cache,
        core_data_buf,
        external_data_bufs,
    )?;

    let mut block_content_ids = vec![CORE_DATA_BLOCK_CONTENT_ID];
    block_content_ids.extend(external_blocks.iter().map(|block| block.content_id()));

    let mut embedded_reference_bases_block_content_id = None;
    let mut reference_md5 = None;

    if let ReferenceSequenceContext::Some(context) = reference_sequence_context {
        let slab = reference_source
            .and_then(|source| source.reference_sequence(context.reference_sequence_id()))
            .map(|sequence| {
                let start = usize::from(context.alignment_start()) - 1;
                let end = usize::from(context.alignment_end()).min(sequence.len());
                sequence[start.min(end)..end].to_vec()
            });

        match slab {
            Some(slab) if options.embed_reference_sequences => {
                let embedded_block = build_block(
                    ContentType::ExternalData,
                    EMBEDDED_REFERENCE_CONTENT_ID,
                    options.block_content_encoder_map.tag_values_encoder(),
                    compressor_cache,
                    &slab,
                )?;

                embedded_reference_bases_block_content_id =
                    Some(EMBEDDED_REFERENCE_CONTENT_ID);
                block_content_ids.push(EMBEDDED_REFERENCE_CONTENT_ID);
                external_blocks.push(embedded_block);

                // the embedded slab is the reference; no digest is needed
            }
            Some(slab) => {
                reference_md5 = Some(calculate_normalized_sequence_digest(&slab));
            }
            None if options.reference_required && !options.embed_bases => {
                return Err(Error::invalid_state(format!(
                    "missing reference sequence: {}",
                    context.reference_sequence_id()
                )));
            }
            // written without a reference: the digest stays zero-filled
            None => {}
        }
    }

    let header = Header {
        reference_sequence_context,
        record_count: records.len(),
        record_counter,
        block_count: block_content_ids.len(),
        block_content_ids,
        embedded_reference_bases_block_content_id,
        reference_md5,
        optional_tags: Vec::new(),
    };

    Ok(BuiltSlice {
        header,
        core_data_block,
        external_blocks,
    })
}

fn get_reference_sequence_context(records: &[Record]) -> ReferenceSequenceContext {
    assert!(!records.is_empty());

    let record = &records[0];

    let mut reference_sequence_context = match (
        record.reference_sequence_id(),
        record.alignment_start(),
        record.alignment_end(),
    ) {
        (Some(id), Some(start), Some(end)) => ReferenceSequenceContext::some(id, start, end),
        _ => ReferenceSequenceContext::None,
    };

    for record in records.iter().skip(1) {
        reference_sequence_context.update(
            record.reference_sequence_id(),
            record.alignment_start(),
            record.alignment_end(),
        );
    }

    reference_sequence_context
}

/// Builds the intra-slice mate graph.
///
/// Walking backwards, each primary segmented record either links to the
/// next record of the same name (mate-downstream, with the record distance)
/// or is marked detached. Mate links never cross slice boundaries.
fn set_mates(records: &mut [Record]) {
    assert!(!records.is_empty());

    let mut indices = HashMap::new();
    let mut i = records.len() - 1;

    loop {
        let record = &mut records[i];
        let flags = record.bam_flags();

        // pairing needs a name; nameless records can only be detached
        if record.name.is_some()
            && flags.is_segmented()
            && !flags.is_secondary()
            && !flags.is_supplementary()
        {
            let name = record.name.clone();

            if let Some(j) = indices.insert(name, i) {
                let mid = i + 1;
                let (left, right) = records.split_at_mut(mid);

                let record = &mut left[i];
                let mate = &mut right[j - mid];

                record.mate_distance = Some(j - i - 1);
                record.cram_flags.insert(Flags::MATE_IS_DOWNSTREAM);
                record.next_mate_index = Some(j);
                mate.previous_mate_index = Some(i);
                mate.cram_flags.remove(Flags::IS_DETACHED);
            } else {
                record.cram_flags.insert(Flags::IS_DETACHED);
            }
        } else {
            record.cram_flags.insert(Flags::IS_DETACHED);
        }

        if i == 0 {
            break;
        }

        i -= 1;
    }
}

#[allow(clippy::type_complexity)]
fn write_records(
    compression_header: &CompressionHeader,
    reference_sequence_context: ReferenceSequenceContext,
    records: &[Record],
) -> Result<(Vec<u8>, Vec<(block::ContentId, Vec<u8>)>)> {
    let mut core_data_writer = BitWriter::default();
    let mut external_data_writers = ExternalDataWriters::new();

    for data_series in STANDARD_DATA_SERIES {
        let block_content_id = block::ContentId::from(*data_series);
        external_data_writers.insert(block_content_id, Vec::new());
    }

    // BB/QQ only exist when the header declares them (embedded bases)
    if compression_header.data_series_encodings.stretches_of_bases.is_some() {
        external_data_writers.insert(
            block::ContentId::from(crate::container::compression_header::DataSeries::StretchesOfBases),
            Vec::new(),
        );
    }

    if compression_header
        .data_series_encodings
        .stretches_of_quality_scores
        .is_some()
    {
        external_data_writers.insert(
            block::ContentId::from(
                crate::container::compression_header::DataSeries::StretchesOfQualityScores,
            ),
            Vec::new(),
        );
    }

    for block_content_id in compression_header.tag_encodings().keys() {
        external_data_writers.insert(*block_content_id, Vec::new());
    }

    let mut writer = records::Writer::new(
        compression_header,
        &mut core_data_writer,
        &mut external_data_writers,
        reference_sequence_context,
    );

    for record in records {
        writer.write_record(record)?;
    }

    Ok((
        core_data_writer.finish()?,
        external_data_writers.into_iter().collect(),
    ))
}

fn build_blocks(
    options: &Options,
    compressor_cache: &mut CompressorCache,
    core_data_buf: Vec<u8>,
    external_data_bufs: Vec<(block::ContentId, Vec<u8>)>,
) -> Result<(Block, Vec<Block>)> {
    let map = &options.block_content_encoder_map;

    let core_data_block = build_block(
        ContentType::CoreData,
        CORE_DATA_BLOCK_CONTENT_ID,
        map.core_data_encoder(),
        compressor_cache,
        &core_data_buf,
    )?;

    let external_blocks = external_data_bufs
        .into_iter()
        .filter(|(_, buf)| !buf.is_empty())
        .map(|(block_content_id, buf)| {
            // data series use their assigned encoders; anything else (tag
            // value blocks) uses the tag values encoder
            let encoder = match map.get_data_series_encoder(block_content_id) {
                Some(encoder) => encoder,
                None => map.tag_values_encoder(),
            };

            build_block(
                ContentType::ExternalData,
                block_content_id,
                encoder,
                compressor_cache,
                &buf,
            )
        })
        .collect::<Result<_>>()?;

    Ok((core_data_block, external_blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{alignment::Flags as BamFlags, Position};

    #[test]
    fn test_set_mates_links_pairs() {
        let mut r0 = Record::default();
        r0.name = Some("q1".into());
        r0.bam_flags = BamFlags::SEGMENTED;

        let mut r1 = Record::default();
        r1.name = Some("q2".into());
        r1.bam_flags = BamFlags::SEGMENTED;

        let mut r2 = Record::default();
        r2.name = Some("q1".into());
        r2.bam_flags = BamFlags::SEGMENTED;

        let mut records = vec![r0, r1, r2];
        set_mates(&mut records);

        assert!(records[0].cram_flags().has_mate_downstream());
        assert_eq!(records[0].mate_distance(), Some(1));
        assert!(!records[0].cram_flags().is_detached());

        assert!(records[1].cram_flags().is_detached());

        assert!(!records[2].cram_flags().is_detached());
        assert!(!records[2].cram_flags().has_mate_downstream());
    }

    #[test]
    fn test_set_mates_detaches_unpaired_records() {
        let mut r0 = Record::default();
        r0.name = Some("q1".into());

        let mut records = vec![r0];
        set_mates(&mut records);

        assert!(records[0].cram_flags().is_detached());
    }

    #[test]
    fn test_get_reference_sequence_context() {
        let mut r0 = Record::default();
        r0.reference_sequence_id = Some(0);
        r0.alignment_start = Position::new(5);
        r0.read_length = 4;

        let mut r1 = Record::default();
        r1.reference_sequence_id = Some(0);
        r1.alignment_start = Position::new(13);
        r1.read_length = 4;

        let records = vec![r0, r1];

        assert_eq!(
            get_reference_sequence_context(&records),
            ReferenceSequenceContext::some(
                0,
                Position::new(5).unwrap(),
                Position::new(16).unwrap()
            )
        );
    }
}
