use std::io::Write;

use flate2::CrcWriter;

use crate::{
    container::block::{Block, CompressionMethod, ContentType},
    file_definition::MAGIC_NUMBER,
    io::writer::{
        container::block::{block_size, write_block},
        container::header::write_header_raw,
        num::write_i32_le,
    },
    Error, Result,
};

/// Writes the file definition, returning the number of bytes written.
pub(super) fn write_file_definition<W>(writer: &mut W) -> Result<usize>
where
    W: Write,
{
    writer.write_all(&MAGIC_NUMBER)?;

    // CRAM 3.0
    writer.write_all(&[0x03, 0x00])?;

    let file_id = [0; 20];
    writer.write_all(&file_id)?;

    Ok(MAGIC_NUMBER.len() + 2 + file_id.len())
}

/// Writes the header container, returning the number of bytes written.
///
/// The `FILE_HEADER` block payload is the text length (i32 LE) followed by
/// the text and reserved zero padding (half the text length again) for
/// in-place rewrites.
pub(super) fn write_file_header<W>(writer: &mut W, sam_header: &[u8]) -> Result<usize>
where
    W: Write,
{
    let text_len =
        i32::try_from(sam_header.len()).map_err(|_| Error::invalid_state("header too large"))?;

    let mut payload = Vec::with_capacity(4 + sam_header.len() + sam_header.len() / 2);
    write_i32_le(&mut payload, text_len)?;
    payload.extend_from_slice(sam_header);
    payload.resize(payload.len() + sam_header.len() / 2, 0);

    let block = Block {
        compression_method: CompressionMethod::None,
        content_type: ContentType::FileHeader,
        content_id: 0,
        uncompressed_size: payload.len(),
        src: payload,
    };

    let container_len = block_size(&block)?;

    let mut header_buf = Vec::new();
    {
        let mut crc_writer = CrcWriter::new(&mut header_buf);
        write_header_raw(
            &mut crc_writer,
            container_len,
            crate::container::ReferenceSequenceContext::None,
            0,
            0,
            0,
            1,
            &[],
        )?;
        let crc32 = crc_writer.crc().sum();
        let buf = crc_writer.into_inner();
        buf.extend_from_slice(&crc32.to_le_bytes());
    }

    writer.write_all(&header_buf)?;

    let mut block_buf = Vec::new();
    write_block(&mut block_buf, &block)?;
    writer.write_all(&block_buf)?;

    Ok(header_buf.len() + block_buf.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_definition() -> Result<()> {
        let mut buf = Vec::new();
        let n = write_file_definition(&mut buf)?;

        assert_eq!(n, 26);
        assert_eq!(&buf[0..4], b"CRAM");
        assert_eq!(&buf[4..6], &[0x03, 0x00]);
        assert!(buf[6..].iter().all(|&b| b == 0));

        Ok(())
    }

    #[test]
    fn test_write_file_header_reserves_space() -> Result<()> {
        let sam_header = b"@HD\tVN:1.6\n";

        let mut buf = Vec::new();
        let n = write_file_header(&mut buf, sam_header)?;

        assert_eq!(n, buf.len());

        // the block payload must carry the text length, the text, and the
        // reserved padding
        let needle = sam_header;
        assert!(buf.windows(needle.len()).any(|w| w == needle));

        Ok(())
    }
}
