use std::{collections::HashMap, sync::Arc};

use crate::{calculate_normalized_sequence_digest, Position};

/// A provider of reference sequence bases, keyed by reference sequence id.
///
/// The codec consumes this interface; it never loads references itself.
/// Implementations are expected to be cheap to query repeatedly, caching
/// internally if the backing store is not.
pub trait ReferenceSource {
    /// Returns the bases of the reference sequence with the given id, or
    /// `None` if the source does not know it.
    fn reference_sequence(&self, reference_sequence_id: usize) -> Option<Arc<[u8]>>;

    /// Returns the normalized MD5 digest of the reference slab
    /// `[start, start + span)`.
    fn reference_md5(
        &self,
        reference_sequence_id: usize,
        start: Position,
        span: usize,
    ) -> Option<[u8; 16]> {
        self.reference_sequence(reference_sequence_id)
            .map(|sequence| {
                let i = start.get() - 1;
                let end = (i + span).min(sequence.len());
                calculate_normalized_sequence_digest(&sequence[i.min(end)..end])
            })
    }
}

/// A [`ReferenceSource`] backed by in-memory sequences.
#[derive(Clone, Debug, Default)]
pub struct InMemoryReferenceSource {
    sequences: HashMap<usize, Arc<[u8]>>,
}

impl InMemoryReferenceSource {
    /// Adds a reference sequence under the given id.
    pub fn insert<S>(&mut self, reference_sequence_id: usize, sequence: S)
    where
        S: Into<Arc<[u8]>>,
    {
        self.sequences.insert(reference_sequence_id, sequence.into());
    }
}

impl ReferenceSource for InMemoryReferenceSource {
    fn reference_sequence(&self, reference_sequence_id: usize) -> Option<Arc<[u8]>> {
        self.sequences.get(&reference_sequence_id).cloned()
    }
}

impl<const N: usize> From<[Vec<u8>; N]> for InMemoryReferenceSource {
    fn from(sequences: [Vec<u8>; N]) -> Self {
        let mut source = Self::default();

        for (i, sequence) in sequences.into_iter().enumerate() {
            source.insert(i, sequence);
        }

        source
    }
}
