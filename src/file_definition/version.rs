use std::{cmp::Ordering, fmt};

use crate::{Error, Result};

/// A CRAM file definition version.
///
/// This is also called the format number.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    /// CRAM 2.0
    pub const V2_0: Self = Self::new(2, 0);

    /// CRAM 2.1
    pub const V2_1: Self = Self::new(2, 1);

    /// CRAM 3.0
    pub const V3_0: Self = Self::new(3, 0);

    /// CRAM 3.1
    pub const V3_1: Self = Self::new(3, 1);

    /// Creates a file definition version.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Returns the major version.
    pub fn major(&self) -> u8 {
        self.major
    }

    /// Returns the minor version.
    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Returns `true` if this version carries CRC32 checksums on container
    /// headers and blocks (>= 3.0).
    pub fn has_crc32(&self) -> bool {
        *self >= Self::V3_0
    }

    /// Validates that the version is supported for reading.
    ///
    /// 3.x is the native version. 2.x is accepted for reading; it differs
    /// only in the absence of checksums and in the width of the slice header
    /// record counter.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::V2_0 | Self::V2_1 | Self::V3_0 | Self::V3_1 => Ok(()),
            _ => Err(Error::UnsupportedVersion(*self)),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::V3_0
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
