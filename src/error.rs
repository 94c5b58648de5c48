//! Errors and validation stringency.

use std::io;

use crate::file_definition::Version;

/// A convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while reading or writing CRAM.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying byte stream failed. Fatal for the stream.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// Structural corruption: bad magic, bad varint, wrong block content
    /// type, checksum mismatch. Fatal for the container; the stream may be
    /// resumable at the next container boundary given a container-aligned
    /// index.
    #[error("malformed CRAM stream: {0}")]
    Malformed(String),

    /// The file definition declares a version this crate does not read.
    #[error("unsupported CRAM version: {0}")]
    UnsupportedVersion(Version),

    /// A compression header declares an encoding or a block declares a
    /// compression method this crate does not implement.
    #[error("unsupported encoding for {context}: id {id}")]
    UnsupportedEncoding {
        /// The data series, tag, or block the encoding was declared for.
        context: String,
        /// The declared encoding or method id.
        id: i32,
    },

    /// Programmer error: an operation was invoked on a value in the wrong
    /// state, e.g. multi-reference alignment spans requested for
    /// non-coordinate-sorted records, a container built from slices with
    /// mixed reference contexts, or index entries requested from an
    /// unindexed slice.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The MD5 of the supplied reference slab does not match the digest
    /// recorded in the slice header. Raised only under
    /// [`ValidationStringency::Strict`].
    #[error("reference sequence checksum mismatch: expected {}, got {}", hex(.expected), hex(.actual))]
    ReferenceMismatch {
        /// The digest recorded in the slice header.
        expected: [u8; 16],
        /// The digest of the supplied reference slab.
        actual: [u8; 16],
    },

    /// A per-record anomaly, e.g. a read feature position outside
    /// `[1, read_length]`.
    #[error("record validation: {0}")]
    RecordValidation(String),
}

impl Error {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::Malformed(msg.into())
    }

    pub(crate) fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }
}

fn hex(digest: &[u8; 16]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// How strictly decoded data is validated against external inputs.
///
/// This currently governs reference MD5 verification: `Strict` fails with
/// [`Error::ReferenceMismatch`], `Lenient` logs a warning and continues with
/// the supplied reference, and `Silent` continues without logging.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValidationStringency {
    /// Fail on mismatches.
    #[default]
    Strict,
    /// Log and continue.
    Lenient,
    /// Continue without logging.
    Silent,
}
