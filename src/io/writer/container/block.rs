use std::{io::Write, mem};

use flate2::CrcWriter;

use crate::{
    codecs::{CompressorCache, Encoder},
    container::block::{Block, CompressionMethod, ContentId, ContentType},
    io::writer::num::{itf8_size_of, write_itf8, write_u32_le, write_u8},
    Error, Result,
};

/// Compresses `src` into a block using the given encoder, or stores it raw
/// when no encoder is given.
pub(crate) fn build_block(
    content_type: ContentType,
    content_id: ContentId,
    encoder: Option<&Encoder>,
    compressor_cache: &mut CompressorCache,
    src: &[u8],
) -> Result<Block> {
    let (compression_method, buf) = match encoder {
        None => (CompressionMethod::None, src.to_vec()),
        Some(encoder) => {
            let method = match encoder {
                Encoder::Gzip(_) => CompressionMethod::Gzip,
                Encoder::Bzip2(_) => CompressionMethod::Bzip2,
                Encoder::Lzma(_) => CompressionMethod::Lzma,
                Encoder::Rans4x8(_) => CompressionMethod::Rans4x8,
            };

            (method, compressor_cache.compress(encoder, src)?)
        }
    };

    Ok(Block {
        compression_method,
        content_type,
        content_id,
        uncompressed_size: src.len(),
        src: buf,
    })
}

/// Returns the on-wire size of a block, including the trailing CRC32.
pub(crate) fn block_size(block: &Block) -> Result<usize> {
    let compressed_size = i32::try_from(block.src.len())
        .map_err(|_| Error::invalid_state("block too large"))?;
    let uncompressed_size = i32::try_from(block.uncompressed_size)
        .map_err(|_| Error::invalid_state("block too large"))?;

    Ok(mem::size_of::<u8>() // method
        + mem::size_of::<u8>() // content type
        + itf8_size_of(block.content_id)
        + itf8_size_of(compressed_size)
        + itf8_size_of(uncompressed_size)
        + block.src.len()
        + mem::size_of::<u32>()) // CRC32
}

/// Writes a block with its trailing CRC32 over the wire bytes.
pub(crate) fn write_block<W>(writer: &mut W, block: &Block) -> Result<()>
where
    W: Write,
{
    let mut crc_writer = CrcWriter::new(writer);
    write_block_body(&mut crc_writer, block)?;

    let crc32 = crc_writer.crc().sum();
    write_u32_le(crc_writer.get_mut(), crc32)?;

    Ok(())
}

fn write_block_body<W>(writer: &mut W, block: &Block) -> Result<()>
where
    W: Write,
{
    write_compression_method(writer, block.compression_method)?;
    write_content_type(writer, block.content_type)?;
    write_itf8(writer, block.content_id)?;

    write_size(writer, block.src.len())?; // compressed size
    write_size(writer, block.uncompressed_size)?;

    writer.write_all(&block.src)?;

    Ok(())
}

fn write_size<W>(writer: &mut W, size: usize) -> Result<()>
where
    W: Write,
{
    let n = i32::try_from(size).map_err(|_| Error::invalid_state("block too large"))?;
    write_itf8(writer, n)?;
    Ok(())
}

fn write_compression_method<W>(writer: &mut W, method: CompressionMethod) -> Result<()>
where
    W: Write,
{
    let n = match method {
        CompressionMethod::None => 0,
        CompressionMethod::Gzip => 1,
        CompressionMethod::Bzip2 => 2,
        CompressionMethod::Lzma => 3,
        CompressionMethod::Rans4x8 => 4,
    };

    write_u8(writer, n)?;
    Ok(())
}

fn write_content_type<W>(writer: &mut W, content_type: ContentType) -> Result<()>
where
    W: Write,
{
    let n = match content_type {
        ContentType::FileHeader => 0,
        ContentType::CompressionHeader => 1,
        ContentType::SliceHeader => 2,
        ContentType::Reserved => 3,
        ContentType::ExternalData => 4,
        ContentType::CoreData => 5,
    };

    write_u8(writer, n)?;
    Ok(())
}
