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
    io::reader::{
        collections::read_array,
        num::{read_itf8, read_itf8_as},
    },
    Error, Result,
};

pub(super) fn read_byte_encoding(src: &mut &[u8], context: &str) -> Result<Encoding<Byte>> {
    match read_kind(src, context)? {
        Kind::Null => {
            read_args(src)?;
            Ok(Encoding::new(Byte::Null))
        }
        Kind::External => {
            let block_content_id = read_external_codec(src)?;
            Ok(Encoding::new(Byte::External { block_content_id }))
        }
        Kind::Huffman => {
            let (alphabet, bit_lens) = read_huffman_codec(src)?;
            Ok(Encoding::new(Byte::huffman(alphabet, bit_lens)))
        }
        kind => Err(Error::malformed(format!(
            "invalid codec for {context} (byte): {kind:?}"
        ))),
    }
}

pub(super) fn read_integer_encoding(
    src: &mut &[u8],
    context: &str,
) -> Result<Encoding<Integer>> {
    match read_kind(src, context)? {
        Kind::Null => {
            read_args(src)?;
            Ok(Encoding::new(Integer::Null))
        }
        Kind::External => {
            let block_content_id = read_external_codec(src)?;
            Ok(Encoding::new(Integer::External { block_content_id }))
        }
        Kind::Golomb => {
            let (offset, m) = read_two_arg_codec(src)?;
            Ok(Encoding::new(Integer::Golomb { offset, m }))
        }
        Kind::Huffman => {
            let (alphabet, bit_lens) = read_huffman_codec(src)?;
            Ok(Encoding::new(Integer::huffman(alphabet, bit_lens)))
        }
        Kind::Beta => {
            let (offset, len) = read_two_arg_codec(src)?;

            let len = u32::try_from(len)
                .map_err(|_| Error::malformed("invalid beta codec bit length"))?;

            Ok(Encoding::new(Integer::Beta { offset, len }))
        }
        Kind::Subexp => {
            let (offset, k) = read_two_arg_codec(src)?;
            Ok(Encoding::new(Integer::Subexp { offset, k }))
        }
        Kind::GolombRice => {
            let (offset, log2_m) = read_two_arg_codec(src)?;
            Ok(Encoding::new(Integer::GolombRice { offset, log2_m }))
        }
        Kind::Gamma => {
            let offset = read_one_arg_codec(src)?;
            Ok(Encoding::new(Integer::Gamma { offset }))
        }
        kind => Err(Error::malformed(format!(
            "invalid codec for {context} (integer): {kind:?}"
        ))),
    }
}

pub(super) fn read_byte_array_encoding(
    src: &mut &[u8],
    context: &str,
) -> Result<Encoding<ByteArray>> {
    match read_kind(src, context)? {
        Kind::Null => {
            read_args(src)?;
            Ok(Encoding::new(ByteArray::Null))
        }
        Kind::ByteArrayLength => {
            let mut args = read_args(src)?;

            let len_encoding = read_integer_encoding(&mut args, context)?;
            let value_encoding = read_byte_encoding(&mut args, context)?;

            Ok(Encoding::new(ByteArray::ByteArrayLength {
                len_encoding,
                value_encoding,
            }))
        }
        Kind::ByteArrayStop => {
            let args = read_args(src)?;

            let (stop_byte, mut args) = args
                .split_first()
                .ok_or_else(|| Error::malformed("missing byte array stop byte"))?;

            let block_content_id = read_itf8(&mut args)?;

            Ok(Encoding::new(ByteArray::ByteArrayStop {
                stop_byte: *stop_byte,
                block_content_id,
            }))
        }
        kind => Err(Error::malformed(format!(
            "invalid codec for {context} (byte array): {kind:?}"
        ))),
    }
}

fn read_kind(src: &mut &[u8], context: &str) -> Result<Kind> {
    let n = read_itf8(src)?;

    match n {
        0 => Ok(Kind::Null),
        1 => Ok(Kind::External),
        2 => Ok(Kind::Golomb),
        3 => Ok(Kind::Huffman),
        4 => Ok(Kind::ByteArrayLength),
        5 => Ok(Kind::ByteArrayStop),
        6 => Ok(Kind::Beta),
        7 => Ok(Kind::Subexp),
        8 => Ok(Kind::GolombRice),
        9 => Ok(Kind::Gamma),
        _ => Err(Error::UnsupportedEncoding {
            context: context.into(),
            id: n,
        }),
    }
}

/// Reads an encoding's length-prefixed parameter block.
fn read_args<'a>(src: &mut &'a [u8]) -> Result<&'a [u8]> {
    read_array(src).map_err(Error::from)
}

fn read_external_codec(src: &mut &[u8]) -> Result<block::ContentId> {
    let mut args = read_args(src)?;
    let block_content_id = read_itf8(&mut args)?;
    Ok(block_content_id)
}

fn read_one_arg_codec(src: &mut &[u8]) -> Result<i32> {
    let mut args = read_args(src)?;
    let arg = read_itf8(&mut args)?;
    Ok(arg)
}

fn read_two_arg_codec(src: &mut &[u8]) -> Result<(i32, i32)> {
    let mut args = read_args(src)?;

    let a = read_itf8(&mut args)?;
    let b = read_itf8(&mut args)?;

    Ok((a, b))
}

fn read_huffman_codec(src: &mut &[u8]) -> Result<(Vec<i32>, Vec<u32>)> {
    let mut args = read_args(src)?;

    let alphabet_len: usize = read_itf8_as(&mut args)?;

    let alphabet = (0..alphabet_len)
        .map(|_| read_itf8(&mut args))
        .collect::<std::io::Result<_>>()?;

    let bit_lens_len: usize = read_itf8_as(&mut args)?;

    let bit_lens = (0..bit_lens_len)
        .map(|_| read_itf8_as::<_, u32>(&mut args))
        .collect::<std::io::Result<_>>()?;

    Ok((alphabet, bit_lens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_kind() -> Result<()> {
        assert_eq!(read_kind(&mut &[0x00][..], "BF")?, Kind::Null);
        assert_eq!(read_kind(&mut &[0x01][..], "BF")?, Kind::External);
        assert_eq!(read_kind(&mut &[0x03][..], "BF")?, Kind::Huffman);
        assert_eq!(read_kind(&mut &[0x09][..], "BF")?, Kind::Gamma);

        assert!(matches!(
            read_kind(&mut &[0x0a][..], "BF"),
            Err(Error::UnsupportedEncoding { id: 10, .. })
        ));

        Ok(())
    }

    #[test]
    fn test_read_integer_encoding_external() -> Result<()> {
        let src = [
            0x01, // external encoding ID
            0x01, // args.len
            0x05, // block content ID
        ];

        let encoding = read_integer_encoding(&mut &src[..], "RL")?;

        assert_eq!(
            encoding,
            Encoding::new(Integer::External {
                block_content_id: 5
            })
        );

        Ok(())
    }

    #[test]
    fn test_read_integer_encoding_huffman() -> Result<()> {
        let src = [
            0x03, // Huffman encoding ID
            0x04, // args.len
            0x01, // alphabet.len
            0x41, // 'A'
            0x01, // bit_lens.len
            0x00, // 0
        ];

        let encoding = read_integer_encoding(&mut &src[..], "RL")?;
        assert_eq!(encoding, Encoding::new(Integer::huffman(vec![0x41], vec![0])));

        Ok(())
    }

    #[test]
    fn test_read_byte_array_encoding_stop() -> Result<()> {
        let src = [
            0x05, // byte array stop encoding ID
            0x02, // args.len
            0x09, // stop byte = '\t'
            0x07, // block content ID
        ];

        let encoding = read_byte_array_encoding(&mut &src[..], "RN")?;

        assert_eq!(
            encoding,
            Encoding::new(ByteArray::ByteArrayStop {
                stop_byte: b'\t',
                block_content_id: 7,
            })
        );

        Ok(())
    }

    #[test]
    fn test_read_byte_array_encoding_length() -> Result<()> {
        let src = [
            0x04, // byte array length encoding ID
            0x06, // args.len
            0x01, // external encoding ID
            0x01, // args.len
            0x0d, // block content ID = 13
            0x01, // external encoding ID
            0x01, // args.len
            0x15, // block content ID = 21
        ];

        let encoding = read_byte_array_encoding(&mut &src[..], "tag")?;

        assert_eq!(
            encoding,
            Encoding::new(ByteArray::ByteArrayLength {
                len_encoding: Encoding::new(Integer::External {
                    block_content_id: 13
                }),
                value_encoding: Encoding::new(Byte::External {
                    block_content_id: 21
                }),
            })
        );

        Ok(())
    }

    #[test]
    fn test_read_integer_encoding_with_unsupported_kind() {
        // a byte array codec is not a valid integer codec
        let src = [
            0x05, // byte array stop encoding ID
            0x02, 0x00, 0x01,
        ];

        assert!(matches!(
            read_integer_encoding(&mut &src[..], "RL"),
            Err(Error::Malformed(_))
        ));
    }
}
