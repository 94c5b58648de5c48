//! Blocks: the unit of on-wire I/O within a container.

mod compression_method;
mod content_type;

pub use self::{compression_method::CompressionMethod, content_type::ContentType};

use crate::{codecs, Error, Result};

/// An external or core block content id.
pub type ContentId = i32;

/// A block: typed, optionally compressed bytes.
///
/// `src` holds the compressed payload as it appears on the wire;
/// [`Self::decode`] recovers the original bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub(crate) compression_method: CompressionMethod,
    pub(crate) content_type: ContentType,
    pub(crate) content_id: ContentId,
    pub(crate) uncompressed_size: usize,
    pub(crate) src: Vec<u8>,
}

impl Block {
    /// Returns the compression method.
    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    /// Returns the content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns the content id.
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// Decompresses the block payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let mut dst = Vec::with_capacity(self.uncompressed_size);

        match self.compression_method {
            CompressionMethod::None => {
                if self.src.len() != self.uncompressed_size {
                    return Err(Error::malformed(format!(
                        "raw block size mismatch: compressed {} != uncompressed {}",
                        self.src.len(),
                        self.uncompressed_size
                    )));
                }

                dst.extend_from_slice(&self.src);
            }
            CompressionMethod::Gzip => codecs::gzip::decode(&self.src, &mut dst)?,
            CompressionMethod::Bzip2 => codecs::bzip2::decode(&self.src, &mut dst)?,
            CompressionMethod::Lzma => codecs::lzma::decode(&self.src, &mut dst)?,
            CompressionMethod::Rans4x8 => {
                dst = codecs::rans_4x8::decode(&mut &self.src[..])?;
            }
        }

        if dst.len() != self.uncompressed_size {
            return Err(Error::malformed(format!(
                "block size mismatch: expected {} bytes, decoded {}",
                self.uncompressed_size,
                dst.len()
            )));
        }

        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_raw() -> Result<()> {
        let block = Block {
            compression_method: CompressionMethod::None,
            content_type: ContentType::ExternalData,
            content_id: 1,
            uncompressed_size: 4,
            src: b"ndls".to_vec(),
        };

        assert_eq!(block.decode()?, b"ndls");

        Ok(())
    }

    #[test]
    fn test_decode_raw_with_size_mismatch() {
        let block = Block {
            compression_method: CompressionMethod::None,
            content_type: ContentType::ExternalData,
            content_id: 1,
            uncompressed_size: 8,
            src: b"ndls".to_vec(),
        };

        assert!(matches!(block.decode(), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_decode_gzip() -> Result<()> {
        let data = b"ACGTACGT";
        let src = codecs::gzip::encode(flate2::Compression::default(), data)?;

        let block = Block {
            compression_method: CompressionMethod::Gzip,
            content_type: ContentType::ExternalData,
            content_id: 1,
            uncompressed_size: data.len(),
            src,
        };

        assert_eq!(block.decode()?, data);

        Ok(())
    }
}
