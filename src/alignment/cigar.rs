//! CIGAR operations.

pub mod op;

pub use self::op::{Kind, Op};

use std::fmt;

/// A CIGAR: the ordered list of operations describing how a read aligns to
/// the reference.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cigar(Vec<Op>);

impl Cigar {
    /// Returns whether there are any operations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the operations.
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.0.iter()
    }

    /// Returns the number of read bases the operations cover.
    pub fn read_length(&self) -> usize {
        self.0
            .iter()
            .filter(|op| op.kind().consumes_read())
            .map(|op| op.len())
            .sum()
    }

    /// Returns the number of reference bases the operations cover.
    pub fn alignment_span(&self) -> usize {
        self.0
            .iter()
            .filter(|op| op.kind().consumes_reference())
            .map(|op| op.len())
            .sum()
    }

    pub(crate) fn push(&mut self, op: Op) {
        // coalesce adjacent operations of the same kind
        if let Some(last) = self.0.last_mut() {
            if last.kind() == op.kind() {
                *last = Op::new(op.kind(), last.len() + op.len());
                return;
            }
        }

        self.0.push(op);
    }
}

impl AsRef<[Op]> for Cigar {
    fn as_ref(&self) -> &[Op] {
        &self.0
    }
}

impl Extend<Op> for Cigar {
    fn extend<T: IntoIterator<Item = Op>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<Op> for Cigar {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Op>> for Cigar {
    fn from(ops: Vec<Op>) -> Self {
        Self(ops)
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("*");
        }

        for op in &self.0 {
            write!(f, "{}{}", op.len(), char::from(op.kind()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_length_and_alignment_span() {
        let cigar: Cigar = [
            Op::new(Kind::SoftClip, 2),
            Op::new(Kind::Match, 5),
            Op::new(Kind::Deletion, 3),
            Op::new(Kind::Insertion, 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(cigar.read_length(), 8);
        assert_eq!(cigar.alignment_span(), 8);
    }

    #[test]
    fn test_push_coalesces() {
        let mut cigar = Cigar::default();
        cigar.push(Op::new(Kind::Match, 2));
        cigar.push(Op::new(Kind::Match, 3));
        cigar.push(Op::new(Kind::Deletion, 1));

        assert_eq!(
            cigar.as_ref(),
            [Op::new(Kind::Match, 5), Op::new(Kind::Deletion, 1)]
        );
    }

    #[test]
    fn test_display() {
        let cigar: Cigar = [Op::new(Kind::Match, 4), Op::new(Kind::SoftClip, 2)]
            .into_iter()
            .collect();

        assert_eq!(cigar.to_string(), "4M2S");
        assert_eq!(Cigar::default().to_string(), "*");
    }
}
