use crate::container::{block, ReferenceSequenceContext};

/// A slice header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Header {
    pub(crate) reference_sequence_context: ReferenceSequenceContext,
    pub(crate) record_count: usize,
    pub(crate) record_counter: u64,
    pub(crate) block_count: usize,
    pub(crate) block_content_ids: Vec<block::ContentId>,
    pub(crate) embedded_reference_bases_block_content_id: Option<block::ContentId>,
    /// The MD5 of the reference slab covered by this slice; `None` when
    /// multi-reference, unmapped, or written without a reference.
    pub(crate) reference_md5: Option<[u8; 16]>,
    pub(crate) optional_tags: Vec<u8>,
}

impl Header {
    /// Returns the reference sequence context.
    pub fn reference_sequence_context(&self) -> ReferenceSequenceContext {
        self.reference_sequence_context
    }

    /// Returns the number of records in the slice.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Returns the global counter of the slice's first record.
    pub fn record_counter(&self) -> u64 {
        self.record_counter
    }

    /// Returns the number of blocks in the slice.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the content ids of the slice's blocks.
    pub fn block_content_ids(&self) -> &[block::ContentId] {
        &self.block_content_ids
    }

    /// Returns the content id of the embedded reference bases block, if any.
    pub fn embedded_reference_bases_block_content_id(&self) -> Option<block::ContentId> {
        self.embedded_reference_bases_block_content_id
    }

    /// Returns the MD5 digest of the covered reference slab, if recorded.
    pub fn reference_md5(&self) -> Option<[u8; 16]> {
        self.reference_md5
    }
}
