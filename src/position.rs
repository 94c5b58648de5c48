use std::{fmt, num::NonZeroUsize};

/// A 1-based position.
///
/// Alignment starts, alignment ends, and in-read feature positions are all
/// 1-based; 0 is reserved as the "no position" sentinel on the wire and maps
/// to `Option::<Position>::None` in memory.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position(NonZeroUsize);

impl Position {
    /// The minimum position (1).
    pub const MIN: Self = match NonZeroUsize::new(1) {
        Some(n) => Self(n),
        None => unreachable!(),
    };

    /// Creates a position if `n` is nonzero.
    pub const fn new(n: usize) -> Option<Self> {
        match NonZeroUsize::new(n) {
            Some(m) => Some(Self(m)),
            None => None,
        }
    }

    /// Returns the position as a `usize`.
    pub const fn get(&self) -> usize {
        self.0.get()
    }

    /// Adds an offset, returning `None` on overflow.
    pub fn checked_add(self, other: usize) -> Option<Self> {
        self.0.checked_add(other).map(Self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Position> for usize {
    fn from(position: Position) -> Self {
        position.0.get()
    }
}

impl TryFrom<usize> for Position {
    type Error = TryFromIntError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n).ok_or(TryFromIntError)
    }
}

/// An error returned when a position is constructed from 0.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TryFromIntError;

impl fmt::Display for TryFromIntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid value: positions are 1-based")
    }
}

impl std::error::Error for TryFromIntError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert_eq!(Position::new(0), None);
        assert_eq!(Position::new(1), Some(Position::MIN));
    }

    #[test]
    fn test_checked_add() {
        let position = Position::try_from(8).unwrap();
        assert_eq!(position.checked_add(5), Position::new(13));
        assert_eq!(position.checked_add(usize::MAX), None);
    }
}
