use std::{io::Write, sync::Arc};

use super::{Options, Writer};
use crate::{container::BlockContentEncoderMap, EncodingStrategy, ReferenceSource, Result};

/// A CRAM writer builder.
#[derive(Default)]
pub struct Builder {
    reference_source: Option<Arc<dyn ReferenceSource>>,
    options: Options,
}

impl Builder {
    /// Sets the reference source used to reference-compress read bases.
    pub fn set_reference_source<S>(mut self, reference_source: S) -> Self
    where
        S: ReferenceSource + 'static,
    {
        self.reference_source = Some(Arc::new(reference_source));
        self
    }

    /// Sets whether to preserve read names.
    ///
    /// If `false`, read names are discarded. The default is `true`.
    pub fn preserve_read_names(mut self, value: bool) -> Self {
        self.options.preserve_read_names = value;
        self
    }

    /// Sets whether to encode alignment start positions as deltas.
    ///
    /// This requires coordinate-sorted input. The default is `true`.
    pub fn encode_alignment_start_positions_as_deltas(mut self, value: bool) -> Self {
        self.options.encode_alignment_start_positions_as_deltas = value;
        self
    }

    /// Sets the block content-encoder map.
    pub fn set_block_content_encoder_map(mut self, map: BlockContentEncoderMap) -> Self {
        self.options.block_content_encoder_map = map;
        self
    }

    /// Sets the number of records per slice.
    ///
    /// The default is 10000.
    ///
    /// # Panics
    ///
    /// Panics if `records_per_slice` is 0.
    pub fn set_records_per_slice(mut self, records_per_slice: usize) -> Self {
        assert!(records_per_slice > 0, "records_per_slice must be > 0");
        self.options.records_per_slice = records_per_slice;
        self
    }

    /// Sets the number of slices per container.
    ///
    /// The default is 1.
    ///
    /// # Panics
    ///
    /// Panics if `slices_per_container` is 0.
    pub fn set_slices_per_container(mut self, slices_per_container: usize) -> Self {
        assert!(slices_per_container > 0, "slices_per_container must be > 0");
        self.options.slices_per_container = slices_per_container;
        self
    }

    /// Sets the single-reference run length below which a reference switch
    /// coalesces records into a multi-reference slice instead of closing the
    /// slice.
    pub fn set_min_single_reference_records(mut self, n: usize) -> Self {
        self.options.min_single_reference_records = n;
        self
    }

    /// Sets whether to embed reference subsequences in slices.
    ///
    /// When enabled, the covered reference slab is stored in the CRAM file
    /// itself, removing the need for an external reference on read. The
    /// default is `false`.
    pub fn embed_reference_sequences(mut self, value: bool) -> Self {
        self.options.embed_reference_sequences = value;
        self
    }

    /// Sets whether to store mapped read bases verbatim instead of
    /// substitution-coding them against the reference.
    ///
    /// The default is `false`.
    pub fn embed_bases(mut self, value: bool) -> Self {
        self.options.embed_bases = value;
        self
    }

    /// Sets whether an external reference sequence is required.
    ///
    /// When `false`, mapped reads without an available reference fall back
    /// to verbatim base storage. The default is `true`.
    pub fn set_reference_required(mut self, reference_required: bool) -> Self {
        self.options.reference_required = reference_required;
        self
    }

    /// Applies a JSON-persisted encoding strategy.
    pub fn set_encoding_strategy(mut self, strategy: &EncodingStrategy) -> Result<Self> {
        self.options = strategy.to_options()?;
        Ok(self)
    }

    /// Builds a CRAM writer from a writer.
    pub fn build_from_writer<W>(self, inner: W) -> Writer<W>
    where
        W: Write,
    {
        Writer::with(inner, self.reference_source, self.options)
    }
}
