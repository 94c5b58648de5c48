use std::io::Read;

use flate2::CrcReader;

use crate::{
    container::block::{Block, CompressionMethod, ContentType},
    file_definition::Version,
    io::reader::num::{read_itf8, read_itf8_as, read_u32_le, read_u8},
    Error, Result,
};

/// Reads a block, verifying its trailing CRC32 over the wire bytes.
pub(crate) fn read_block(src: &mut &[u8], version: Version) -> Result<Block> {
    let mut crc_reader = CrcReader::new(&mut *src);
    let block = read_block_inner(&mut crc_reader, version)?;

    if version.has_crc32() {
        let actual_crc32 = crc_reader.crc().sum();
        let expected_crc32 = read_u32_le(crc_reader.get_mut())?;

        if actual_crc32 != expected_crc32 {
            return Err(Error::malformed(format!(
                "block checksum mismatch: expected {expected_crc32:08x}, got {actual_crc32:08x}"
            )));
        }
    }

    *src = *crc_reader.get_ref();

    Ok(block)
}

/// Reads a block, requiring a specific content type.
pub(crate) fn read_block_as(
    src: &mut &[u8],
    content_type: ContentType,
    version: Version,
) -> Result<Block> {
    let block = read_block(src, version)?;

    if block.content_type() != content_type {
        return Err(Error::malformed(format!(
            "invalid block content type: expected {:?}, got {:?}",
            content_type,
            block.content_type()
        )));
    }

    Ok(block)
}

fn read_block_inner<R>(reader: &mut R, _version: Version) -> Result<Block>
where
    R: Read,
{
    let compression_method = read_compression_method(reader)?;
    let content_type = read_content_type(reader)?;
    let content_id = read_itf8(reader)?;

    let compressed_size: usize = read_itf8_as(reader)?;
    let uncompressed_size: usize = read_itf8_as(reader)?;

    let mut src = vec![0; compressed_size];
    reader.read_exact(&mut src).map_err(Error::from)?;

    Ok(Block {
        compression_method,
        content_type,
        content_id,
        uncompressed_size,
        src,
    })
}

fn read_compression_method<R>(reader: &mut R) -> Result<CompressionMethod>
where
    R: Read,
{
    match read_u8(reader)? {
        0 => Ok(CompressionMethod::None),
        1 => Ok(CompressionMethod::Gzip),
        2 => Ok(CompressionMethod::Bzip2),
        3 => Ok(CompressionMethod::Lzma),
        4 => Ok(CompressionMethod::Rans4x8),
        // CRAM 3.1 codecs
        n @ 5..=8 => Err(Error::UnsupportedEncoding {
            context: String::from("block compression method"),
            id: i32::from(n),
        }),
        n => Err(Error::malformed(format!(
            "invalid block compression method: {n}"
        ))),
    }
}

fn read_content_type<R>(reader: &mut R) -> Result<ContentType>
where
    R: Read,
{
    match read_u8(reader)? {
        0 => Ok(ContentType::FileHeader),
        1 => Ok(ContentType::CompressionHeader),
        2 => Ok(ContentType::SliceHeader),
        3 => Ok(ContentType::Reserved),
        4 => Ok(ContentType::ExternalData),
        5 => Ok(ContentType::CoreData),
        n => Err(Error::malformed(format!(
            "invalid block content type: {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_block() -> Result<()> {
        let src = [
            0x00, // compression method = none
            0x04, // content type = external data
            0x01, // content ID = 1
            0x04, // compressed size = 4
            0x04, // uncompressed size = 4
            b'n', b'd', b'l', b's', // data
            0xd7, 0x12, 0x46, 0x3e, // CRC32
        ];

        let mut reader = &src[..];
        let block = read_block(&mut reader, Version::V3_0)?;

        assert_eq!(block.compression_method(), CompressionMethod::None);
        assert_eq!(block.content_type(), ContentType::ExternalData);
        assert_eq!(block.content_id(), 1);
        assert_eq!(block.decode()?, b"ndls");
        assert!(reader.is_empty());

        Ok(())
    }

    #[test]
    fn test_read_block_with_checksum_mismatch() {
        let src = [
            0x00, 0x04, 0x01, 0x04, 0x04, b'n', b'd', b'l', b's', // block
            0x00, 0x00, 0x00, 0x00, // CRC32 (invalid)
        ];

        assert!(matches!(
            read_block(&mut &src[..], Version::V3_0),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_read_block_with_unsupported_method() {
        let src = [
            0x05, // compression method = rANS Nx16 (CRAM 3.1)
            0x04, 0x01, 0x00, 0x00,
        ];

        assert!(matches!(
            read_block(&mut &src[..], Version::V3_0),
            Err(Error::UnsupportedEncoding { id: 5, .. })
        ));
    }

    #[test]
    fn test_read_block_as_with_wrong_content_type() {
        let body = [
            0x00, // compression method = none
            0x04, // content type = external data
            0x01, // content ID = 1
            0x00, // compressed size = 0
            0x00, // uncompressed size = 0
        ];

        let mut crc = flate2::Crc::new();
        crc.update(&body);

        let mut src = body.to_vec();
        src.extend_from_slice(&crc.sum().to_le_bytes());

        assert!(matches!(
            read_block_as(&mut &src[..], ContentType::SliceHeader, Version::V3_0),
            Err(Error::Malformed(_))
        ));
    }
}
