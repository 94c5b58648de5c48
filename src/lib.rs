//! **hts-cram** handles the reading and writing of the CRAM 3.x container
//! format.
//!
//! CRAM stores aligned sequencing reads reference-compressed: a container
//! holds a compression header (the per-container encoding schema) and one or
//! more slices, each slice holding a batch of records that share a reference
//! context. Record fields are split into per-data-series streams, routed
//! through configurable codecs into a core bitstream and external byte
//! blocks, and block-compressed.
//!
//! The crate exposes a [`io::Reader`]/[`io::Writer`] pair for whole-stream
//! I/O, the container/slice/block data model under [`container`], the
//! logical record model under [`record`], and CRAI/BAI index entry
//! derivation under [`crai`] and [`bai`].

pub mod alignment;
pub mod bai;
pub mod codecs;
pub mod container;
pub mod crai;
mod encoding_strategy;
pub mod error;
pub mod file_definition;
pub mod fs;
mod huffman;
pub mod io;
mod position;
pub mod record;
mod reference;

pub use self::{
    encoding_strategy::EncodingStrategy,
    error::{Error, Result, ValidationStringency},
    file_definition::FileDefinition,
    position::Position,
    record::Record,
    reference::{InMemoryReferenceSource, ReferenceSource},
};

use md5::{Digest, Md5};

/// Calculates the normalized digest of a sequence, i.e., the MD5 checksum of
/// the uppercased printable bases.
///
/// This is the digest stored in slice headers and compared against supplied
/// references on read.
pub fn calculate_normalized_sequence_digest(sequence: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();

    for &b in sequence {
        // § 10 "Reference sequences": bases are uppercased and characters
        // outside of '!'..='~' are stripped before hashing.
        if b.is_ascii_graphic() {
            hasher.update([b.to_ascii_uppercase()]);
        }
    }

    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_normalized_sequence_digest() {
        assert_eq!(
            calculate_normalized_sequence_digest(b"ACGTA"),
            [
                0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f,
                0xf2, 0x7e, 0xf7
            ]
        );

        assert_eq!(
            calculate_normalized_sequence_digest(b"acgta"),
            calculate_normalized_sequence_digest(b"ACGTA")
        );

        // whitespace is stripped before hashing
        assert_eq!(
            calculate_normalized_sequence_digest(b"AC GT\nA"),
            calculate_normalized_sequence_digest(b"ACGTA")
        );
    }
}
