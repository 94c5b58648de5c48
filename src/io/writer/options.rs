use crate::container::BlockContentEncoderMap;

pub(crate) const DEFAULT_RECORDS_PER_SLICE: usize = 10_000;
pub(crate) const DEFAULT_SLICES_PER_CONTAINER: usize = 1;

// single-reference runs shorter than this coalesce into a multi-reference
// slice instead of closing the slice
pub(crate) const DEFAULT_MIN_SINGLE_REFERENCE_RECORDS: usize = 1000;

#[derive(Clone, Debug)]
pub struct Options {
    pub preserve_read_names: bool,
    pub encode_alignment_start_positions_as_deltas: bool,
    pub block_content_encoder_map: BlockContentEncoderMap,
    pub records_per_slice: usize,
    pub slices_per_container: usize,
    pub min_single_reference_records: usize,
    pub embed_reference_sequences: bool,
    pub embed_bases: bool,
    pub reference_required: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            preserve_read_names: true,
            encode_alignment_start_positions_as_deltas: true,
            block_content_encoder_map: BlockContentEncoderMap::default(),
            records_per_slice: DEFAULT_RECORDS_PER_SLICE,
            slices_per_container: DEFAULT_SLICES_PER_CONTAINER,
            min_single_reference_records: DEFAULT_MIN_SINGLE_REFERENCE_RECORDS,
            embed_reference_sequences: false,
            embed_bases: false,
            reference_required: true,
        }
    }
}
