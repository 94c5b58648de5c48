//! The CRAM writer.

mod builder;
pub(crate) mod collections;
pub mod container;
mod header;
pub(crate) mod num;
pub(crate) mod options;

pub use self::{builder::Builder, options::Options};

use std::{io::Write, sync::Arc};

use self::{
    container::{write_container, write_eof_container},
    header::{write_file_definition, write_file_header},
};
use crate::{
    codecs::CompressorCache,
    container::ReferenceSequenceContext,
    crai,
    record::convert::ConvertOptions,
    alignment::record::RecordBuf,
    Error, Record, ReferenceSource, Result,
};

/// A CRAM writer.
///
/// Records accumulate into slices and containers following the encoding
/// strategy: a slice closes when it reaches `records_per_slice` or its
/// reference context changes (small single-reference runs coalesce into
/// multi-reference slices instead); a container closes when it reaches
/// `slices_per_container` or an incompatible slice arrives.
///
/// [`Self::finish`] flushes buffered records and writes the EOF container;
/// it must be called before dropping the writer on the happy path. Dropping
/// an unfinished writer still attempts to terminate the stream.
pub struct Writer<W: Write> {
    inner: W,
    reference_source: Option<Arc<dyn ReferenceSource>>,
    options: Options,
    compressor_cache: CompressorCache,
    // the open slice and the closed slices of the open container
    current_slice: Vec<Record>,
    current_slice_context: ReferenceSequenceContext,
    slices: Vec<Vec<Record>>,
    container_context: ReferenceSequenceContext,
    record_counter: u64,
    // absolute byte offset of the next container
    position: u64,
    index_entries: Vec<crai::Entry>,
    finished: bool,
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Creates a writer with default options and no reference source.
    pub fn new(inner: W) -> Self {
        Builder::default().build_from_writer(inner)
    }

    pub(crate) fn with(
        inner: W,
        reference_source: Option<Arc<dyn ReferenceSource>>,
        options: Options,
    ) -> Self {
        Self {
            inner,
            reference_source,
            options,
            compressor_cache: CompressorCache::new(),
            current_slice: Vec::new(),
            current_slice_context: ReferenceSequenceContext::default(),
            slices: Vec::new(),
            container_context: ReferenceSequenceContext::default(),
            record_counter: 0,
            position: 0,
            index_entries: Vec::new(),
            finished: false,
        }
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Writes the file definition.
    ///
    /// This must be the first write of a stream.
    pub fn write_file_definition(&mut self) -> Result<()> {
        let n = write_file_definition(&mut self.inner)?;
        self.position += n as u64;
        Ok(())
    }

    /// Writes the header container carrying the raw SAM header text.
    ///
    /// Space is reserved after the text so the header can be rewritten in
    /// place without repacking the stream.
    pub fn write_file_header(&mut self, sam_header: &[u8]) -> Result<()> {
        let n = write_file_header(&mut self.inner, sam_header)?;
        self.position += n as u64;
        Ok(())
    }

    /// Writes an alignment record.
    pub fn write_record(&mut self, record: &RecordBuf) -> Result<()> {
        if self.finished {
            return Err(Error::invalid_state("writer is finished"));
        }

        let reference_sequence = match record.reference_sequence_id {
            Some(id) if !self.options.embed_bases => {
                let sequence = self
                    .reference_source
                    .as_ref()
                    .and_then(|source| source.reference_sequence(id));

                if sequence.is_none() && self.options.reference_required {
                    return Err(Error::invalid_state(format!(
                        "missing reference sequence: {id}"
                    )));
                }

                sequence
            }
            _ => None,
        };

        let convert_options = ConvertOptions {
            embed_bases: self.options.embed_bases,
        };

        let mut cram_record = Record::try_from_alignment_record(
            record,
            reference_sequence.as_deref(),
            convert_options,
        )?;

        if !self.options.preserve_read_names {
            cram_record.name = None;
        }

        cram_record.id = self.record_counter + (self.buffered_record_count() as u64);

        self.add_record(cram_record)
    }

    /// Flushes buffered records and terminates the stream with the EOF
    /// container.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        self.close_slice()?;
        self.flush_container()?;

        write_eof_container(&mut self.inner)?;
        self.finished = true;

        Ok(())
    }

    /// Returns the CRAI entries of the containers written so far, in
    /// landmark order.
    ///
    /// Entries for buffered records appear once their container flushes.
    /// Sort the collected entries to obtain CRAI order.
    pub fn index_entries(&self) -> &[crai::Entry] {
        &self.index_entries
    }

    fn buffered_record_count(&self) -> usize {
        self.current_slice.len() + self.slices.iter().map(Vec::len).sum::<usize>()
    }

    fn add_record(&mut self, record: Record) -> Result<()> {
        if !self.current_slice.is_empty() {
            let slice_is_full = self.current_slice.len() >= self.options.records_per_slice;

            if slice_is_full || !self.record_fits_current_slice(&record) {
                self.close_slice()?;
            }
        }

        self.current_slice_context.update(
            record.reference_sequence_id(),
            record.alignment_start(),
            record.alignment_end(),
        );

        self.current_slice.push(record);

        Ok(())
    }

    /// Returns whether adding `record` keeps the open slice's reference
    /// context valid.
    ///
    /// A context change is tolerated (degrading the slice to
    /// multi-reference) while the slice is still below the
    /// single-reference minimum.
    fn record_fits_current_slice(&self, record: &Record) -> bool {
        let mut context = self.current_slice_context;

        context.update(
            record.reference_sequence_id(),
            record.alignment_start(),
            record.alignment_end(),
        );

        match (self.current_slice_context, context) {
            // unchanged kind: same single reference, still unmapped, or
            // already multi-reference
            (ReferenceSequenceContext::Some(_), ReferenceSequenceContext::Some(_)) => true,
            (ReferenceSequenceContext::None, ReferenceSequenceContext::None) => true,
            (ReferenceSequenceContext::Many, _) => true,
            // a reference switch: coalesce short single-reference runs into
            // a multi-reference slice, otherwise start a new slice
            (ReferenceSequenceContext::Some(_), ReferenceSequenceContext::Many) => {
                self.current_slice.len() < self.options.min_single_reference_records
            }
            _ => false,
        }
    }

    fn close_slice(&mut self) -> Result<()> {
        if self.current_slice.is_empty() {
            return Ok(());
        }

        let slice_context = self.current_slice_context;
        let records = std::mem::take(&mut self.current_slice);
        self.current_slice_context = ReferenceSequenceContext::default();

        if !self.slices.is_empty()
            && (!container_accepts(self.container_context, slice_context)
                || self.slices.len() >= self.options.slices_per_container)
        {
            self.flush_container()?;
        }

        if self.slices.is_empty() {
            self.container_context = slice_context;
        } else {
            self.container_context = merge_contexts(self.container_context, slice_context);
        }

        self.slices.push(records);

        if self.slices.len() >= self.options.slices_per_container {
            self.flush_container()?;
        }

        Ok(())
    }

    fn flush_container(&mut self) -> Result<()> {
        if self.slices.is_empty() {
            return Ok(());
        }

        let slices = std::mem::take(&mut self.slices);
        let record_count: usize = slices.iter().map(Vec::len).sum();

        let container_byte_offset = self.position;

        let (n, entries) = write_container(
            &mut self.inner,
            self.reference_source.as_deref(),
            &self.options,
            &mut self.compressor_cache,
            self.record_counter,
            container_byte_offset,
            slices,
        )?;

        self.position += n as u64;
        self.record_counter += record_count as u64;
        self.index_entries.extend(entries);
        self.container_context = ReferenceSequenceContext::default();

        Ok(())
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.finish();
        }
    }
}

/// Returns whether a container holding slices of context `container` may
/// also hold a slice of context `slice`.
///
/// Containers hold slices of one kind: a single shared reference, all
/// multi-reference, or all unmapped.
fn container_accepts(
    container: ReferenceSequenceContext,
    slice: ReferenceSequenceContext,
) -> bool {
    match (container, slice) {
        (ReferenceSequenceContext::Some(a), ReferenceSequenceContext::Some(b)) => {
            a.reference_sequence_id() == b.reference_sequence_id()
        }
        (ReferenceSequenceContext::None, ReferenceSequenceContext::None) => true,
        (ReferenceSequenceContext::Many, ReferenceSequenceContext::Many) => true,
        _ => false,
    }
}

fn merge_contexts(
    container: ReferenceSequenceContext,
    slice: ReferenceSequenceContext,
) -> ReferenceSequenceContext {
    match (container, slice) {
        (ReferenceSequenceContext::Some(a), ReferenceSequenceContext::Some(b)) => {
            ReferenceSequenceContext::some(
                a.reference_sequence_id(),
                a.alignment_start().min(b.alignment_start()),
                a.alignment_end().max(b.alignment_end()),
            )
        }
        _ => container,
    }
}
