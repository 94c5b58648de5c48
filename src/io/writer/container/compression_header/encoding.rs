use std::io::Write;

use crate::{
    container::{
        block,
        compression_header::{
            encoding::{
                codec::{Byte, ByteArray, Integer},
                Kind,
            },
            Encoding,
        },
    },
    io::writer::num::{write_itf8, write_u8},
    Error, Result,
};

pub(super) fn write_byte_encoding<W>(writer: &mut W, encoding: &Encoding<Byte>) -> Result<()>
where
    W: Write,
{
    match encoding.get() {
        Byte::Null => write_null_codec(writer),
        Byte::External { block_content_id } => write_external_codec(writer, *block_content_id),
        Byte::Huffman {
            alphabet, bit_lens, ..
        } => write_huffman_codec(writer, alphabet, bit_lens),
    }
}

pub(super) fn write_integer_encoding<W>(
    writer: &mut W,
    encoding: &Encoding<Integer>,
) -> Result<()>
where
    W: Write,
{
    match encoding.get() {
        Integer::Null => write_null_codec(writer),
        Integer::External { block_content_id } => {
            write_external_codec(writer, *block_content_id)
        }
        Integer::Golomb { offset, m } => write_two_arg_codec(writer, Kind::Golomb, *offset, *m),
        Integer::Huffman {
            alphabet, bit_lens, ..
        } => write_huffman_codec(writer, alphabet, bit_lens),
        Integer::Beta { offset, len } => {
            let len = i32::try_from(*len)
                .map_err(|_| Error::invalid_state("beta codec bit length overflow"))?;
            write_two_arg_codec(writer, Kind::Beta, *offset, len)
        }
        Integer::Subexp { offset, k } => write_two_arg_codec(writer, Kind::Subexp, *offset, *k),
        Integer::GolombRice { offset, log2_m } => {
            write_two_arg_codec(writer, Kind::GolombRice, *offset, *log2_m)
        }
        Integer::Gamma { offset } => {
            let mut args = Vec::new();
            write_itf8(&mut args, *offset)?;

            write_kind(writer, Kind::Gamma)?;
            write_args(writer, &args)
        }
    }
}

pub(super) fn write_byte_array_encoding<W>(
    writer: &mut W,
    encoding: &Encoding<ByteArray>,
) -> Result<()>
where
    W: Write,
{
    match encoding.get() {
        ByteArray::Null => write_null_codec(writer),
        ByteArray::ByteArrayLength {
            len_encoding,
            value_encoding,
        } => {
            let mut args = Vec::new();

            write_integer_encoding(&mut args, len_encoding)?;
            write_byte_encoding(&mut args, value_encoding)?;

            write_kind(writer, Kind::ByteArrayLength)?;
            write_args(writer, &args)
        }
        ByteArray::ByteArrayStop {
            stop_byte,
            block_content_id,
        } => {
            let mut args = Vec::new();
            write_u8(&mut args, *stop_byte)?;
            write_itf8(&mut args, *block_content_id)?;

            write_kind(writer, Kind::ByteArrayStop)?;
            write_args(writer, &args)
        }
    }
}

fn write_kind<W>(writer: &mut W, kind: Kind) -> Result<()>
where
    W: Write,
{
    let n = match kind {
        Kind::Null => 0,
        Kind::External => 1,
        Kind::Golomb => 2,
        Kind::Huffman => 3,
        Kind::ByteArrayLength => 4,
        Kind::ByteArrayStop => 5,
        Kind::Beta => 6,
        Kind::Subexp => 7,
        Kind::GolombRice => 8,
        Kind::Gamma => 9,
    };

    write_itf8(writer, n)?;
    Ok(())
}

fn write_args<W>(writer: &mut W, buf: &[u8]) -> Result<()>
where
    W: Write,
{
    let len = i32::try_from(buf.len())
        .map_err(|_| Error::invalid_state("encoding parameters too large"))?;

    write_itf8(writer, len)?;
    writer.write_all(buf)?;

    Ok(())
}

fn write_null_codec<W>(writer: &mut W) -> Result<()>
where
    W: Write,
{
    write_kind(writer, Kind::Null)?;
    write_args(writer, &[])
}

fn write_external_codec<W>(writer: &mut W, block_content_id: block::ContentId) -> Result<()>
where
    W: Write,
{
    let mut args = Vec::new();
    write_itf8(&mut args, block_content_id)?;

    write_kind(writer, Kind::External)?;
    write_args(writer, &args)
}

fn write_two_arg_codec<W>(writer: &mut W, kind: Kind, a: i32, b: i32) -> Result<()>
where
    W: Write,
{
    let mut args = Vec::new();
    write_itf8(&mut args, a)?;
    write_itf8(&mut args, b)?;

    write_kind(writer, kind)?;
    write_args(writer, &args)
}

fn write_huffman_codec<W>(writer: &mut W, alphabet: &[i32], bit_lens: &[u32]) -> Result<()>
where
    W: Write,
{
    let mut args = Vec::new();

    let alphabet_len = i32::try_from(alphabet.len())
        .map_err(|_| Error::invalid_state("alphabet too large"))?;
    write_itf8(&mut args, alphabet_len)?;

    for &symbol in alphabet {
        write_itf8(&mut args, symbol)?;
    }

    let bit_lens_len = i32::try_from(bit_lens.len())
        .map_err(|_| Error::invalid_state("alphabet too large"))?;
    write_itf8(&mut args, bit_lens_len)?;

    for &len in bit_lens {
        let len =
            i32::try_from(len).map_err(|_| Error::invalid_state("bit length overflow"))?;
        write_itf8(&mut args, len)?;
    }

    write_kind(writer, Kind::Huffman)?;
    write_args(writer, &args)
}
