//! The base substitution matrix.

use std::{error, fmt};

/// A reference/read base in the CRAM substitution alphabet.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Base {
    #[default]
    A,
    C,
    G,
    T,
    N,
}

impl Base {
    pub(crate) const ALL: [Self; 5] = [Self::A, Self::C, Self::G, Self::T, Self::N];

    fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::C => 1,
            Self::G => 2,
            Self::T => 3,
            Self::N => 4,
        }
    }

    /// Returns the four bases other than `self`, in alphabet order.
    fn others(self) -> [Self; 4] {
        let mut others = [Self::A; 4];
        let mut i = 0;

        for base in Self::ALL {
            if base != self {
                others[i] = base;
                i += 1;
            }
        }

        others
    }
}

impl TryFrom<u8> for Base {
    type Error = TryFromByteError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b.to_ascii_uppercase() {
            b'A' => Ok(Self::A),
            b'C' => Ok(Self::C),
            b'G' => Ok(Self::G),
            b'T' => Ok(Self::T),
            b'N' => Ok(Self::N),
            _ => Err(TryFromByteError(b)),
        }
    }
}

impl From<Base> for u8 {
    fn from(base: Base) -> Self {
        match base {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
            Base::N => b'N',
        }
    }
}

/// An error returned when a byte is not a substitution alphabet base.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TryFromByteError(u8);

impl error::Error for TryFromByteError {}

impl fmt::Display for TryFromByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid substitution base: {:#04x}", self.0)
    }
}

/// The 5x4 substitution matrix: for each reference base, the four possible
/// substitute bases ranked by frequency.
///
/// `substitutions[ref][code]` is the read base for a substitution code;
/// [`Self::find`] inverts the lookup. The matrix serializes to 5 bytes, one
/// per reference base, packing each substitute's code into 2 bits at the
/// substitute's position in alphabet order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubstitutionMatrix {
    substitutions: [[Base; 4]; 5],
}

impl SubstitutionMatrix {
    /// Returns the read base for a (reference base, code) pair.
    pub fn get(&self, reference_base: Base, code: u8) -> Base {
        self.substitutions[reference_base.index()][usize::from(code & 0x03)]
    }

    /// Returns the code for a (reference base, read base) pair.
    ///
    /// The read base must differ from the reference base; equal bases are
    /// never substitutions.
    pub fn find(&self, reference_base: Base, read_base: Base) -> u8 {
        self.substitutions[reference_base.index()]
            .iter()
            .position(|&base| base == read_base)
            .map(|i| i as u8)
            .expect("substitute base missing from matrix row")
    }

    /// Builds a matrix ranking substitutes by observed frequency.
    ///
    /// `frequencies[ref][read]` counts observed substitutions by alphabet
    /// index. Ties and unobserved substitutions fall back to alphabet order.
    pub(crate) fn from_frequencies(frequencies: [[u64; 5]; 5]) -> Self {
        let mut substitutions = [[Base::A; 4]; 5];

        for reference_base in Base::ALL {
            let i = reference_base.index();

            let mut substitutes = reference_base.others();

            // sort descending by frequency; alphabet order breaks ties
            substitutes.sort_by_key(|base| std::cmp::Reverse(frequencies[i][base.index()]));

            substitutions[i] = substitutes;
        }

        Self { substitutions }
    }
}

impl Default for SubstitutionMatrix {
    fn default() -> Self {
        Self::from_frequencies([[0; 5]; 5])
    }
}

impl TryFrom<[u8; 5]> for SubstitutionMatrix {
    type Error = TryFromByteError;

    fn try_from(buf: [u8; 5]) -> Result<Self, Self::Error> {
        let mut substitutions = [[Base::A; 4]; 5];

        for (i, (&b, reference_base)) in buf.iter().zip(Base::ALL).enumerate() {
            for (j, substitute) in reference_base.others().into_iter().enumerate() {
                let code = (b >> ((3 - j) * 2)) & 0x03;
                substitutions[i][usize::from(code)] = substitute;
            }
        }

        Ok(Self { substitutions })
    }
}

impl From<&SubstitutionMatrix> for [u8; 5] {
    fn from(matrix: &SubstitutionMatrix) -> Self {
        let mut buf = [0; 5];

        for (b, reference_base) in buf.iter_mut().zip(Base::ALL) {
            for (j, substitute) in reference_base.others().into_iter().enumerate() {
                let code = matrix.find(reference_base, substitute);
                *b |= code << ((3 - j) * 2);
            }
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codes_follow_alphabet_order() {
        let matrix = SubstitutionMatrix::default();

        assert_eq!(matrix.get(Base::A, 0), Base::C);
        assert_eq!(matrix.get(Base::A, 1), Base::G);
        assert_eq!(matrix.get(Base::A, 2), Base::T);
        assert_eq!(matrix.get(Base::A, 3), Base::N);

        assert_eq!(matrix.get(Base::T, 0), Base::A);
        assert_eq!(matrix.get(Base::T, 3), Base::N);
    }

    #[test]
    fn test_bidirectional_lookup_round_trips() {
        let mut frequencies = [[0u64; 5]; 5];
        frequencies[Base::C.index()][Base::T.index()] = 100;
        frequencies[Base::C.index()][Base::A.index()] = 50;

        let matrix = SubstitutionMatrix::from_frequencies(frequencies);

        for reference_base in Base::ALL {
            for read_base in Base::ALL {
                if read_base == reference_base {
                    continue;
                }

                let code = matrix.find(reference_base, read_base);
                assert_eq!(matrix.get(reference_base, code), read_base);
            }
        }
    }

    #[test]
    fn test_frequencies_rank_substitutes() {
        let mut frequencies = [[0u64; 5]; 5];
        frequencies[Base::C.index()][Base::T.index()] = 100;
        frequencies[Base::C.index()][Base::A.index()] = 50;

        let matrix = SubstitutionMatrix::from_frequencies(frequencies);

        assert_eq!(matrix.get(Base::C, 0), Base::T);
        assert_eq!(matrix.get(Base::C, 1), Base::A);
        assert_eq!(matrix.get(Base::C, 2), Base::G);
        assert_eq!(matrix.get(Base::C, 3), Base::N);
    }

    #[test]
    fn test_serialization_round_trips() {
        let mut frequencies = [[0u64; 5]; 5];
        frequencies[Base::A.index()][Base::T.index()] = 5;
        frequencies[Base::G.index()][Base::C.index()] = 7;
        frequencies[Base::N.index()][Base::A.index()] = 2;

        let matrix = SubstitutionMatrix::from_frequencies(frequencies);

        let buf = <[u8; 5]>::from(&matrix);
        let decoded = SubstitutionMatrix::try_from(buf).unwrap();

        assert_eq!(decoded, matrix);
    }

    #[test]
    fn test_default_wire_form() {
        // alphabet-ordered ranks: each row packs codes 0, 1, 2, 3
        let buf = <[u8; 5]>::from(&SubstitutionMatrix::default());
        assert_eq!(buf, [0x1b; 5]);
    }
}
