use std::collections::BTreeMap;

use crate::{Error, Position, Record, Result};

/// The interval and record counts a batch of records covers on one
/// reference.
///
/// This is the per-reference expansion of a multi-reference slice, used to
/// derive index entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlignmentSpan {
    alignment_start: Option<Position>,
    alignment_span: usize,
    mapped_record_count: usize,
    unmapped_record_count: usize,
}

impl AlignmentSpan {
    /// The span of unmapped-unplaced records.
    pub const UNPLACED: Self = Self {
        alignment_start: None,
        alignment_span: 0,
        mapped_record_count: 0,
        unmapped_record_count: 0,
    };

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> Option<Position> {
        self.alignment_start
    }

    /// Returns the alignment span.
    pub fn alignment_span(&self) -> usize {
        self.alignment_span
    }

    /// Returns the number of mapped records.
    pub fn mapped_record_count(&self) -> usize {
        self.mapped_record_count
    }

    /// Returns the number of unmapped records.
    pub fn unmapped_record_count(&self) -> usize {
        self.unmapped_record_count
    }
}

/// Computes, for each reference sequence present in `records`, the interval
/// and counts its records cover. Unmapped-unplaced records aggregate under
/// the `None` key.
///
/// The pass assumes coordinate-sorted input; invoking it on
/// non-coordinate-sorted data is an error.
pub fn alignment_spans(
    records: &[Record],
    coordinate_sorted: bool,
) -> Result<BTreeMap<Option<usize>, AlignmentSpan>> {
    if !coordinate_sorted {
        return Err(Error::invalid_state(
            "multi-reference alignment spans require coordinate-sorted records",
        ));
    }

    // per reference: (start, end, mapped, unmapped)
    let mut intervals: BTreeMap<usize, (Position, Position, usize, usize)> = BTreeMap::new();
    let mut has_unplaced = false;

    for record in records {
        let (id, start, end) = match (
            record.reference_sequence_id(),
            record.alignment_start(),
            record.alignment_end(),
        ) {
            (Some(id), Some(start), Some(end)) => (id, start, end),
            _ => {
                has_unplaced = true;
                continue;
            }
        };

        let entry = intervals.entry(id).or_insert((start, end, 0, 0));
        entry.0 = entry.0.min(start);
        entry.1 = entry.1.max(end);

        if record.bam_flags().is_unmapped() {
            entry.3 += 1;
        } else {
            entry.2 += 1;
        }
    }

    let mut spans: BTreeMap<Option<usize>, AlignmentSpan> = intervals
        .into_iter()
        .map(|(id, (start, end, mapped, unmapped))| {
            (
                Some(id),
                AlignmentSpan {
                    alignment_start: Some(start),
                    alignment_span: usize::from(end) - usize::from(start) + 1,
                    mapped_record_count: mapped,
                    unmapped_record_count: unmapped,
                },
            )
        })
        .collect();

    if has_unplaced {
        spans.insert(None, AlignmentSpan::UNPLACED);
    }

    Ok(spans)
}
