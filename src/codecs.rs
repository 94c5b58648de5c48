//! Block compression codecs.

pub(crate) mod bzip2;
pub(crate) mod cache;
pub(crate) mod gzip;
pub(crate) mod lzma;
pub mod rans_4x8;

pub use self::cache::CompressorCache;

use flate2::Compression;

/// A block content encoder.
#[derive(Clone, Copy, Debug)]
pub enum Encoder {
    /// gzip, with a compression level.
    Gzip(Compression),
    /// bzip2, with a compression level.
    Bzip2(::bzip2::Compression),
    /// LZMA, with a preset level.
    Lzma(u32),
    /// rANS 4x8, with a context order.
    Rans4x8(rans_4x8::Order),
}
