use std::cmp;

use crate::{Error, Position, Result};

// § 8.1: reference_sequence_id is -1 for unmapped-unplaced data and -2 for
// multi-reference data.
const UNMAPPED: i32 = -1;
const MULTI_REFERENCE: i32 = -2;

/// The reference context of a slice or container.
///
/// `Some` carries a single reference sequence and the interval its records
/// cover; `None` is unmapped-unplaced data; `Many` is multi-reference data.
/// Only `Some` carries a valid alignment start and span.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReferenceSequenceContext {
    /// A single reference sequence.
    Some(ReferenceSequenceContextInner),
    /// Unmapped-unplaced.
    #[default]
    None,
    /// Multiple reference sequences.
    Many,
}

/// The single-reference payload of a [`ReferenceSequenceContext`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReferenceSequenceContextInner {
    reference_sequence_id: usize,
    alignment_start: Position,
    alignment_end: Position,
}

impl ReferenceSequenceContextInner {
    /// Returns the reference sequence id.
    pub fn reference_sequence_id(&self) -> usize {
        self.reference_sequence_id
    }

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> Position {
        self.alignment_start
    }

    /// Returns the 1-based inclusive alignment end.
    pub fn alignment_end(&self) -> Position {
        self.alignment_end
    }

    /// Returns the alignment span.
    pub fn alignment_span(&self) -> usize {
        self.alignment_end.get() - self.alignment_start.get() + 1
    }
}

impl ReferenceSequenceContext {
    /// Creates a single-reference context.
    pub fn some(
        reference_sequence_id: usize,
        alignment_start: Position,
        alignment_end: Position,
    ) -> Self {
        Self::Some(ReferenceSequenceContextInner {
            reference_sequence_id,
            alignment_start,
            alignment_end,
        })
    }

    /// Widens the context to also cover the given record coordinates.
    ///
    /// A placed record on the same reference extends the interval; anything
    /// else degrades the context to `Many`.
    pub fn update(
        &mut self,
        reference_sequence_id: Option<usize>,
        alignment_start: Option<Position>,
        alignment_end: Option<Position>,
    ) {
        *self = match (*self, reference_sequence_id, alignment_start, alignment_end) {
            (Self::Some(inner), Some(id), Some(start), Some(end))
                if inner.reference_sequence_id == id =>
            {
                Self::some(
                    id,
                    cmp::min(inner.alignment_start, start),
                    cmp::max(inner.alignment_end, end),
                )
            }
            (Self::None, None, ..) => Self::None,
            _ => Self::Many,
        };
    }
}

impl TryFrom<(i32, i64, i64)> for ReferenceSequenceContext {
    type Error = Error;

    fn try_from(
        (reference_sequence_id, alignment_start, alignment_span): (i32, i64, i64),
    ) -> Result<Self> {
        match reference_sequence_id {
            UNMAPPED => Ok(Self::None),
            MULTI_REFERENCE => Ok(Self::Many),
            n if n >= 0 => {
                let id = usize::try_from(n)
                    .map_err(|_| Error::malformed("invalid reference sequence ID"))?;

                let start = usize::try_from(alignment_start)
                    .ok()
                    .and_then(Position::new)
                    .ok_or_else(|| Error::malformed("invalid alignment start"))?;

                let span = usize::try_from(alignment_span)
                    .map_err(|_| Error::malformed("invalid alignment span"))?;

                let end = start
                    .checked_add(span.checked_sub(1).ok_or_else(|| {
                        Error::malformed("invalid alignment span")
                    })?)
                    .ok_or_else(|| Error::malformed("alignment end overflow"))?;

                Ok(Self::some(id, start, end))
            }
            _ => Err(Error::malformed(format!(
                "invalid reference sequence ID: {reference_sequence_id}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_update() {
        let mut context = ReferenceSequenceContext::some(0, position(8), position(13));
        context.update(Some(0), Some(position(2)), Some(position(21)));
        assert_eq!(
            context,
            ReferenceSequenceContext::some(0, position(2), position(21))
        );

        let mut context = ReferenceSequenceContext::some(0, position(8), position(13));
        context.update(Some(1), Some(position(2)), Some(position(21)));
        assert_eq!(context, ReferenceSequenceContext::Many);

        let mut context = ReferenceSequenceContext::some(0, position(8), position(13));
        context.update(None, None, None);
        assert_eq!(context, ReferenceSequenceContext::Many);

        let mut context = ReferenceSequenceContext::None;
        context.update(None, None, None);
        assert_eq!(context, ReferenceSequenceContext::None);

        let mut context = ReferenceSequenceContext::None;
        context.update(Some(0), Some(position(1)), Some(position(4)));
        assert_eq!(context, ReferenceSequenceContext::Many);
    }

    #[test]
    fn test_try_from_wire_fields() -> Result<()> {
        assert_eq!(
            ReferenceSequenceContext::try_from((2, 3, 5))?,
            ReferenceSequenceContext::some(2, position(3), position(7))
        );

        assert_eq!(
            ReferenceSequenceContext::try_from((-1, 0, 0))?,
            ReferenceSequenceContext::None
        );

        assert_eq!(
            ReferenceSequenceContext::try_from((-2, 0, 0))?,
            ReferenceSequenceContext::Many
        );

        assert!(ReferenceSequenceContext::try_from((-3, 0, 0)).is_err());
        assert!(ReferenceSequenceContext::try_from((0, 0, 1)).is_err());
        assert!(ReferenceSequenceContext::try_from((0, 1, 0)).is_err());

        Ok(())
    }
}
