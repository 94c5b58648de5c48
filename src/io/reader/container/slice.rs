mod header;
pub(crate) mod records;

use tracing::warn;

use self::header::read_header;
use super::block::read_block;
use crate::{
    calculate_normalized_sequence_digest,
    container::{
        block::{Block, ContentType},
        slice::{self, Indexing},
        CompressionHeader, ReferenceSequenceContext,
    },
    file_definition::Version,
    io::BitReader,
    record::resolve::{resolve_bases, resolve_quality_scores},
    Error, Record, ReferenceSource, Result, ValidationStringency,
};

/// A decoded slice: its header and its blocks, with records decoded on
/// demand.
pub struct Slice {
    header: slice::Header,
    core_data_block: Block,
    external_blocks: Vec<Block>,
    indexing: Indexing,
}

impl Slice {
    /// Returns the slice header.
    pub fn header(&self) -> &slice::Header {
        &self.header
    }

    /// Returns the slice's indexing parameters.
    pub fn indexing(&self) -> &Indexing {
        &self.indexing
    }

    /// Decodes the slice's records without touching the reference: read
    /// features are kept, bases and mates are not resolved.
    ///
    /// This is sufficient for index derivation.
    pub(crate) fn decode_records(
        &self,
        container_reference_sequence_context: ReferenceSequenceContext,
        compression_header: &CompressionHeader,
    ) -> Result<Vec<Record>> {
        let core_buf = self.core_data_block.decode()?;

        let external_bufs: Vec<(i32, Vec<u8>)> = self
            .external_blocks
            .iter()
            .map(|block| block.decode().map(|buf| (block.content_id(), buf)))
            .collect::<Result<_>>()?;

        let mut core_data_reader = BitReader::new(&core_buf);

        let mut external_data_readers = records::ExternalDataReaders::new();

        for (content_id, buf) in &external_bufs {
            external_data_readers.insert(*content_id, buf.as_slice());
        }

        // a slice's records interpret RI against its own context, not the
        // container's, except that a container-level Many forces per-record
        // reference ids
        let reference_sequence_context = match container_reference_sequence_context {
            ReferenceSequenceContext::Many => ReferenceSequenceContext::Many,
            _ => self.header.reference_sequence_context(),
        };

        let mut reader = records::Reader::new(
            compression_header,
            &mut core_data_reader,
            &mut external_data_readers,
            reference_sequence_context,
            self.header.record_counter(),
        );

        let mut records = Vec::with_capacity(self.header.record_count());

        for _ in 0..self.header.record_count() {
            let record = reader.read_record()?;
            records.push(record);
        }

        Ok(records)
    }

    /// Decodes and fully resolves the slice's records: mates are linked,
    /// bases are restored against the reference, and quality scores are
    /// materialized.
    pub fn records(
        &self,
        container_reference_sequence_context: ReferenceSequenceContext,
        compression_header: &CompressionHeader,
        reference_source: Option<&dyn ReferenceSource>,
        validation_stringency: ValidationStringency,
    ) -> Result<Vec<Record>> {
        let mut records =
            self.decode_records(container_reference_sequence_context, compression_header)?;

        resolve_mates(&mut records)?;

        let embedded_reference = self.decode_embedded_reference()?;

        if embedded_reference.is_none() {
            self.verify_reference_md5(reference_source, validation_stringency)?;
        }

        let substitution_matrix = compression_header.preservation_map().substitution_matrix();

        for record in &mut records {
            if record.bam_flags().is_unmapped() {
                continue;
            }

            let Some(alignment_start) = record.alignment_start() else {
                warn!("record appears mapped but has no valid alignment start");
                continue;
            };

            let reference_sequence = match (&embedded_reference, record.reference_sequence_id())
            {
                (Some((offset, bases)), _) => Some(EmbeddedOrExternal::Embedded(*offset, bases)),
                (None, Some(id)) => reference_source
                    .and_then(|source| source.reference_sequence(id))
                    .map(EmbeddedOrExternal::External),
                (None, None) => None,
            };

            if record.cram_flags().sequence_is_missing() {
                continue;
            }

            let bases = match &reference_sequence {
                Some(EmbeddedOrExternal::Embedded(offset, bases)) => {
                    // the embedded slab starts at the slice alignment start
                    resolve_bases_with_offset(
                        bases,
                        *offset,
                        substitution_matrix,
                        record,
                        alignment_start,
                    )?
                }
                Some(EmbeddedOrExternal::External(sequence)) => resolve_bases(
                    Some(&sequence[..]),
                    substitution_matrix,
                    record.features(),
                    alignment_start,
                    record.read_length(),
                )?,
                None => resolve_bases(
                    None,
                    substitution_matrix,
                    record.features(),
                    alignment_start,
                    record.read_length(),
                )?,
            };

            record.sequence = bases;

            if !record.cram_flags().quality_scores_are_stored_as_array() {
                let scores = resolve_quality_scores(record.features(), record.read_length());

                // a read whose scores are all the missing sentinel has no
                // quality scores at all
                record.quality_scores = if scores.iter().all(|&b| b == 0xff) {
                    Vec::new()
                } else {
                    scores
                };
            }
        }

        Ok(records)
    }

    fn decode_embedded_reference(&self) -> Result<Option<(usize, Vec<u8>)>> {
        let Some(content_id) = self.header.embedded_reference_bases_block_content_id() else {
            return Ok(None);
        };

        let block = self
            .external_blocks
            .iter()
            .find(|block| block.content_id() == content_id)
            .ok_or_else(|| {
                Error::malformed(format!(
                    "missing embedded reference block: {content_id}"
                ))
            })?;

        let offset = match self.header.reference_sequence_context() {
            ReferenceSequenceContext::Some(context) => usize::from(context.alignment_start()) - 1,
            _ => {
                return Err(Error::malformed(
                    "embedded reference in a slice without a single reference context",
                ));
            }
        };

        block.decode().map(|bases| Some((offset, bases)))
    }

    fn verify_reference_md5(
        &self,
        reference_source: Option<&dyn ReferenceSource>,
        validation_stringency: ValidationStringency,
    ) -> Result<()> {
        let ReferenceSequenceContext::Some(context) = self.header.reference_sequence_context()
        else {
            return Ok(());
        };

        let Some(expected) = self.header.reference_md5() else {
            return Ok(());
        };

        let Some(sequence) = reference_source
            .and_then(|source| source.reference_sequence(context.reference_sequence_id()))
        else {
            return Ok(());
        };

        let start = usize::from(context.alignment_start()) - 1;
        let end = usize::from(context.alignment_end()).min(sequence.len());
        let actual = calculate_normalized_sequence_digest(&sequence[start.min(end)..end]);

        if actual != expected {
            match validation_stringency {
                ValidationStringency::Strict => {
                    return Err(Error::ReferenceMismatch { expected, actual });
                }
                ValidationStringency::Lenient => {
                    warn!(
                        "reference sequence {} checksum mismatch; continuing with the supplied reference",
                        context.reference_sequence_id()
                    );
                }
                ValidationStringency::Silent => {}
            }
        }

        Ok(())
    }
}

enum EmbeddedOrExternal<'a> {
    // (0-based offset of the slab within the reference, slab bases)
    Embedded(usize, &'a [u8]),
    External(std::sync::Arc<[u8]>),
}

fn resolve_bases_with_offset(
    slab: &[u8],
    offset: usize,
    substitution_matrix: &crate::container::compression_header::preservation_map::SubstitutionMatrix,
    record: &Record,
    alignment_start: crate::Position,
) -> Result<Vec<u8>> {
    // shift the record into slab coordinates
    let start = usize::from(alignment_start)
        .checked_sub(offset)
        .and_then(crate::Position::new)
        .ok_or_else(|| Error::malformed("record starts before the embedded reference slab"))?;

    resolve_bases(
        Some(slab),
        substitution_matrix,
        record.features(),
        start,
        record.read_length(),
    )
}

/// Reads a slice: its header block and its subsequent core/external blocks.
pub(crate) fn read_slice(
    src: &mut &[u8],
    version: Version,
    landmark_index: usize,
    byte_offset_from_compression_header_start: u64,
    byte_size: u64,
) -> Result<Slice> {
    let header = read_header(src, version)?;

    let core_data_block = read_block(src, version).and_then(|block| {
        if block.content_type() == ContentType::CoreData {
            Ok(block)
        } else {
            Err(Error::malformed(format!(
                "invalid block content type: expected CoreData, got {:?}",
                block.content_type()
            )))
        }
    })?;

    // the core block is counted in block_count
    let external_block_count = header.block_count().saturating_sub(1);

    let mut external_blocks = Vec::with_capacity(external_block_count);

    for _ in 0..external_block_count {
        let block = read_block(src, version)?;
        external_blocks.push(block);
    }

    Ok(Slice {
        header,
        core_data_block,
        external_blocks,
        indexing: Indexing {
            landmark_index,
            byte_offset_from_compression_header_start,
            byte_size,
        },
    })
}

/// Links mate pairs within a slice.
///
/// Records flagged mate-downstream point at their mate by record distance;
/// chains are walked, next/previous links are recorded as indices, mate
/// fields are filled in from the linked records, and template lengths are
/// computed from the outermost coordinates.
pub(crate) fn resolve_mates(records: &mut [Record]) -> Result<()> {
    let mut mate_indices: Vec<Option<usize>> = vec![None; records.len()];

    for (i, record) in records.iter().enumerate() {
        if record.cram_flags().has_mate_downstream() {
            let distance = record.mate_distance().ok_or_else(|| {
                Error::malformed("mate-downstream record without a mate distance")
            })?;

            let j = i + distance + 1;

            if j >= records.len() {
                return Err(Error::malformed("mate distance points past the slice"));
            }

            mate_indices[i] = Some(j);
        }
    }

    for i in 0..records.len() {
        if mate_indices[i].is_none() || records[i].previous_mate_index.is_some() {
            continue;
        }

        // walk the chain from its head
        let mut j = i;

        while let Some(k) = mate_indices[j] {
            set_next_mate(records, j, k);
            j = k;
        }

        // the last record's mate is the chain head
        let (head, tail) = (i, j);

        if head != tail {
            set_mate_fields(records, tail, head);
        }

        set_template_lengths(records, head, tail);
    }

    Ok(())
}

fn set_next_mate(records: &mut [Record], i: usize, j: usize) {
    records[i].next_mate_index = Some(j);
    records[j].previous_mate_index = Some(i);

    set_mate_fields(records, i, j);
}

/// Copies mate coordinates of `records[j]` into `records[i]`'s mate fields
/// and synchronizes the duplicated flag bits.
fn set_mate_fields(records: &mut [Record], i: usize, j: usize) {
    use crate::{alignment::Flags as BamFlags, record::MateFlags};

    let (mate_reference_sequence_id, mate_alignment_start, mate_bam_flags) = {
        let mate = &records[j];
        (
            mate.reference_sequence_id(),
            mate.alignment_start(),
            mate.bam_flags(),
        )
    };

    let record = &mut records[i];

    record.mate_reference_sequence_id = mate_reference_sequence_id;
    record.mate_alignment_start = mate_alignment_start;

    record.mate_flags = MateFlags::default();

    if mate_bam_flags.is_unmapped() {
        record.mate_flags.insert(MateFlags::IS_UNMAPPED);
        record.bam_flags.insert(BamFlags::MATE_UNMAPPED);
    }

    if mate_bam_flags.is_reverse_complemented() {
        record.mate_flags.insert(MateFlags::ON_NEGATIVE_STRAND);
        record.bam_flags.insert(BamFlags::MATE_REVERSE_COMPLEMENTED);
    }
}

/// Computes template lengths for a resolved pair from the outermost
/// coordinates: positive for the leftmost segment, negative for the
/// rightmost.
fn set_template_lengths(records: &mut [Record], head: usize, tail: usize) {
    if head == tail {
        return;
    }

    let (start_head, end_head) = (records[head].alignment_start(), records[head].alignment_end());
    let (start_tail, end_tail) = (records[tail].alignment_start(), records[tail].alignment_end());

    let (Some(start_head), Some(end_head), Some(start_tail), Some(end_tail)) =
        (start_head, end_head, start_tail, end_tail)
    else {
        return;
    };

    let start = start_head.min(start_tail);
    let end = end_head.max(end_tail);

    let len = (usize::from(end) - usize::from(start) + 1) as i32;

    if start_head <= start_tail {
        records[head].template_length = len;
        records[tail].template_length = -len;
    } else {
        records[head].template_length = -len;
        records[tail].template_length = len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::Flags, Position};

    #[test]
    fn test_resolve_mates() -> Result<()> {
        let mut records = vec![Record::default(), Record::default(), Record::default()];

        records[0].cram_flags = Flags::MATE_IS_DOWNSTREAM;
        records[0].mate_distance = Some(0);
        records[0].reference_sequence_id = Some(0);
        records[0].alignment_start = Position::new(5);
        records[0].read_length = 4;

        records[1].reference_sequence_id = Some(0);
        records[1].alignment_start = Position::new(21);
        records[1].read_length = 4;

        records[2].reference_sequence_id = Some(0);
        records[2].alignment_start = Position::new(1);
        records[2].read_length = 4;

        resolve_mates(&mut records)?;

        assert_eq!(records[0].next_mate_index, Some(1));
        assert_eq!(records[1].previous_mate_index, Some(0));

        assert_eq!(records[0].mate_alignment_start(), Position::new(21));
        assert_eq!(records[1].mate_alignment_start(), Position::new(5));

        // outermost span: [5, 24] => 20
        assert_eq!(records[0].template_length(), 20);
        assert_eq!(records[1].template_length(), -20);

        assert_eq!(records[2].next_mate_index, None);
        assert_eq!(records[2].template_length(), 0);

        Ok(())
    }

    #[test]
    fn test_resolve_mates_with_invalid_distance() {
        let mut records = vec![Record::default()];
        records[0].cram_flags = Flags::MATE_IS_DOWNSTREAM;
        records[0].mate_distance = Some(5);

        assert!(matches!(
            resolve_mates(&mut records),
            Err(Error::Malformed(_))
        ));
    }
}
