/// An encoding kind, identified on the wire by a stable id byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// No data (0).
    Null,
    /// An external block (1).
    External,
    /// Golomb coding (2).
    Golomb,
    /// Canonical Huffman coding (3).
    Huffman,
    /// A length-prefixed byte array (4).
    ByteArrayLength,
    /// A sentinel-terminated byte array (5).
    ByteArrayStop,
    /// Fixed-width binary with offset (6).
    Beta,
    /// Subexponential coding (7).
    Subexp,
    /// Golomb-Rice coding (8).
    GolombRice,
    /// Elias gamma coding (9).
    Gamma,
}
