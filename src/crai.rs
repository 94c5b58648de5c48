//! The CRAI index: one entry per slice-reference-context, mapping reference
//! intervals to container and slice byte offsets.

pub mod io;

use std::cmp::Ordering;

use crate::{
    container::{
        slice::{alignment_spans, Indexing},
        ReferenceSequenceContext,
    },
    Error, Position, Record, Result,
};

/// A CRAI index: entries in the CRAI total order.
pub type Index = Vec<Entry>;

/// A CRAI entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    reference_sequence_id: Option<usize>,
    alignment_start: Option<Position>,
    alignment_span: usize,
    container_offset: u64,
    slice_offset: u64,
    slice_size: u64,
}

impl Entry {
    /// Creates an entry for a placed interval.
    pub fn new(
        reference_sequence_id: usize,
        alignment_start: Option<Position>,
        alignment_span: usize,
        container_offset: u64,
        slice_offset: u64,
        slice_size: u64,
    ) -> Self {
        Self {
            reference_sequence_id: Some(reference_sequence_id),
            alignment_start,
            alignment_span,
            container_offset,
            slice_offset,
            slice_size,
        }
    }

    /// Creates an entry for unmapped-unplaced records.
    pub fn unplaced(container_offset: u64, slice_offset: u64, slice_size: u64) -> Self {
        Self {
            reference_sequence_id: None,
            alignment_start: None,
            alignment_span: 0,
            container_offset,
            slice_offset,
            slice_size,
        }
    }

    /// Returns the reference sequence id, or `None` for unmapped-unplaced
    /// entries.
    pub fn reference_sequence_id(&self) -> Option<usize> {
        self.reference_sequence_id
    }

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> Option<Position> {
        self.alignment_start
    }

    /// Returns the alignment span.
    pub fn alignment_span(&self) -> usize {
        self.alignment_span
    }

    /// Returns the absolute byte offset of the container.
    pub fn container_offset(&self) -> u64 {
        self.container_offset
    }

    /// Returns the byte offset of the slice from the start of the
    /// compression header block.
    pub fn slice_offset(&self) -> u64 {
        self.slice_offset
    }

    /// Returns the byte size of the slice's blocks.
    pub fn slice_size(&self) -> u64 {
        self.slice_size
    }

    /// Returns whether this entry's interval overlaps `other`'s.
    ///
    /// Entries on different references, zero-span entries, and
    /// unmapped-unplaced entries (including against themselves) never
    /// intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        let (Some(a), Some(b)) = (self.reference_sequence_id, other.reference_sequence_id)
        else {
            return false;
        };

        if a != b || self.alignment_span == 0 || other.alignment_span == 0 {
            return false;
        }

        let (Some(self_start), Some(other_start)) = (self.alignment_start, other.alignment_start)
        else {
            return false;
        };

        let self_start = usize::from(self_start);
        let self_end = self_start + self.alignment_span;
        let other_start = usize::from(other_start);
        let other_end = other_start + other.alignment_span;

        self_start < other_end && other_start < self_end
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// The CRAI total order: reference sequence id ascending with
    /// unmapped-unplaced last; placed entries by alignment start, container
    /// offset, then slice offset; unmapped entries by container offset then
    /// slice offset.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.reference_sequence_id, other.reference_sequence_id) {
            (Some(a), Some(b)) => a
                .cmp(&b)
                .then_with(|| {
                    let a = self.alignment_start.map(usize::from).unwrap_or(0);
                    let b = other.alignment_start.map(usize::from).unwrap_or(0);
                    a.cmp(&b)
                })
                .then_with(|| self.container_offset.cmp(&other.container_offset))
                .then_with(|| self.slice_offset.cmp(&other.slice_offset)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .container_offset
                .cmp(&other.container_offset)
                .then_with(|| self.slice_offset.cmp(&other.slice_offset)),
        }
    }
}

/// Derives the CRAI entries of one slice.
///
/// Single-reference slices yield one entry; multi-reference slices expand
/// into one entry per distinct reference present, through the
/// alignment-span pass (which requires coordinate-sorted records); unmapped
/// slices yield one unplaced entry.
pub(crate) fn entries_for_slice(
    reference_sequence_context: ReferenceSequenceContext,
    records: &[Record],
    container_offset: u64,
    indexing: &Indexing,
    coordinate_sorted: bool,
) -> Result<Vec<Entry>> {
    let slice_offset = indexing.byte_offset_from_compression_header_start();
    let slice_size = indexing.byte_size();

    match reference_sequence_context {
        ReferenceSequenceContext::Some(context) => Ok(vec![Entry::new(
            context.reference_sequence_id(),
            Some(context.alignment_start()),
            context.alignment_span(),
            container_offset,
            slice_offset,
            slice_size,
        )]),
        ReferenceSequenceContext::None => Ok(vec![Entry::unplaced(
            container_offset,
            slice_offset,
            slice_size,
        )]),
        ReferenceSequenceContext::Many => {
            let spans = alignment_spans(records, coordinate_sorted)?;

            let mut entries = Vec::with_capacity(spans.len());

            for (reference_sequence_id, span) in &spans {
                let entry = match reference_sequence_id {
                    Some(id) => Entry::new(
                        *id,
                        span.alignment_start(),
                        span.alignment_span(),
                        container_offset,
                        slice_offset,
                        slice_size,
                    ),
                    None => Entry::unplaced(container_offset, slice_offset, slice_size),
                };

                entries.push(entry);
            }

            Ok(entries)
        }
    }
}

/// Guards multi-reference construction: a CRAI entry can never carry the
/// multi-reference sentinel; expand the slice into per-reference entries
/// first.
pub fn entry_from_context(
    reference_sequence_context: ReferenceSequenceContext,
    container_offset: u64,
    slice_offset: u64,
    slice_size: u64,
) -> Result<Entry> {
    match reference_sequence_context {
        ReferenceSequenceContext::Some(context) => Ok(Entry::new(
            context.reference_sequence_id(),
            Some(context.alignment_start()),
            context.alignment_span(),
            container_offset,
            slice_offset,
            slice_size,
        )),
        ReferenceSequenceContext::None => Ok(Entry::unplaced(
            container_offset,
            slice_offset,
            slice_size,
        )),
        ReferenceSequenceContext::Many => Err(Error::invalid_state(
            "cannot build a CRAI entry from a multi-reference context",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        reference_sequence_id: Option<usize>,
        alignment_start: usize,
        alignment_span: usize,
        container_offset: u64,
        slice_offset: u64,
    ) -> Entry {
        Entry {
            reference_sequence_id,
            alignment_start: Position::new(alignment_start),
            alignment_span,
            container_offset,
            slice_offset,
            slice_size: 100,
        }
    }

    #[test]
    fn test_sort_order() {
        let e1 = entry(Some(1), 3, 100, 100, 100);
        let e2 = entry(Some(1), 2, 100, 120, 200);
        let e3 = entry(Some(1), 4, 100, 90, 100);
        let e4 = entry(Some(1), 2, 100, 90, 50);
        let e5 = entry(Some(1), 4, 100, 90, 80);

        let mut entries = vec![e1.clone(), e2.clone(), e3.clone(), e4.clone(), e5.clone()];
        entries.sort();

        assert_eq!(entries, [e4, e2, e1, e5, e3]);
    }

    #[test]
    fn test_sort_order_places_unmapped_last() {
        let placed = entry(Some(3), 1, 10, 50, 0);
        let unplaced_a = entry(None, 0, 0, 10, 0);
        let unplaced_b = entry(None, 0, 0, 90, 0);

        let mut entries = vec![unplaced_b.clone(), placed.clone(), unplaced_a.clone()];
        entries.sort();

        assert_eq!(entries, [placed, unplaced_a, unplaced_b]);
    }

    #[test]
    fn test_intersects() {
        assert!(entry(Some(1), 1, 10, 0, 0).intersects(&entry(Some(1), 5, 10, 0, 0)));
        assert!(!entry(Some(1), 1, 10, 0, 0).intersects(&entry(Some(2), 1, 10, 0, 0)));
        assert!(!entry(Some(1), 1, 0, 0, 0).intersects(&entry(Some(1), 1, 0, 0, 0)));

        let unplaced = entry(None, 0, 0, 0, 0);
        assert!(!unplaced.intersects(&unplaced));
        assert!(!unplaced.intersects(&entry(Some(1), 1, 10, 0, 0)));
    }

    #[test]
    fn test_entry_from_multi_reference_context_fails() {
        assert!(matches!(
            entry_from_context(ReferenceSequenceContext::Many, 0, 0, 0),
            Err(Error::InvalidState(_))
        ));
    }
}
