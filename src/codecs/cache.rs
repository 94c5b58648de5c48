use std::{cell::RefCell, collections::HashMap, io, rc::Rc};

use flate2::Compression;

use super::{bzip2, gzip, lzma, rans_4x8, Encoder};
use crate::container::block::CompressionMethod;

/// A cache of reusable compressor instances, keyed by `(method, argument)`.
///
/// Most compressors here are cheap, but the rANS engine allocates a 256 KiB
/// frequency table, so a single engine is shared between the order-0 and
/// order-1 entries. The cache is append-only and owned by one writer stream;
/// it is not shared across threads.
pub struct CompressorCache {
    compressors: HashMap<(CompressionMethod, i32), ExternalCompressor>,
    shared_rans: Option<Rc<RefCell<rans_4x8::Rans>>>,
}

pub(crate) enum ExternalCompressor {
    Raw,
    Gzip(Compression),
    Bzip2(::bzip2::Compression),
    Lzma(u32),
    Rans4x8(rans_4x8::Order, Rc<RefCell<rans_4x8::Rans>>),
}

impl ExternalCompressor {
    pub(crate) fn compress(&self, src: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Raw => Ok(src.to_vec()),
            Self::Gzip(compression_level) => gzip::encode(*compression_level, src),
            Self::Bzip2(compression_level) => bzip2::encode(*compression_level, src),
            Self::Lzma(compression_level) => lzma::encode(*compression_level, src),
            Self::Rans4x8(order, rans) => rans.borrow_mut().compress(*order, src),
        }
    }
}

impl CompressorCache {
    pub fn new() -> Self {
        Self {
            compressors: HashMap::new(),
            shared_rans: None,
        }
    }

    /// Compresses `src` with the compressor for the given encoder, creating
    /// and caching the compressor on first use.
    pub fn compress(&mut self, encoder: &Encoder, src: &[u8]) -> io::Result<Vec<u8>> {
        self.get(encoder).compress(src)
    }

    fn get(&mut self, encoder: &Encoder) -> &ExternalCompressor {
        let key = cache_key(encoder);

        if !self.compressors.contains_key(&key) {
            let compressor = match encoder {
                Encoder::Gzip(compression_level) => ExternalCompressor::Gzip(*compression_level),
                Encoder::Bzip2(compression_level) => ExternalCompressor::Bzip2(*compression_level),
                Encoder::Lzma(compression_level) => ExternalCompressor::Lzma(*compression_level),
                Encoder::Rans4x8(order) => {
                    let rans = self
                        .shared_rans
                        .get_or_insert_with(|| Rc::new(RefCell::new(rans_4x8::Rans::new())))
                        .clone();

                    ExternalCompressor::Rans4x8(*order, rans)
                }
            };

            self.compressors.insert(key, compressor);
        }

        &self.compressors[&key]
    }
}

impl Default for CompressorCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(encoder: &Encoder) -> (CompressionMethod, i32) {
    match encoder {
        Encoder::Gzip(compression_level) => {
            (CompressionMethod::Gzip, compression_level.level() as i32)
        }
        Encoder::Bzip2(compression_level) => {
            (CompressionMethod::Bzip2, compression_level.level() as i32)
        }
        Encoder::Lzma(compression_level) => (CompressionMethod::Lzma, *compression_level as i32),
        Encoder::Rans4x8(order) => (CompressionMethod::Rans4x8, i32::from(u8::from(*order))),
    }
}
