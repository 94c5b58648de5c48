use std::io;

use crate::{
    container::{
        block,
        compression_header::encoding::{
            missing_external_block_error, null_codec_error, Decode, Encode,
        },
    },
    huffman::{CanonicalHuffmanDecoder, CanonicalHuffmanEncoder},
    io::{
        reader::container::slice::records::ExternalDataReaders,
        writer::container::slice::records::ExternalDataWriters,
        BitReader, BitWriter,
    },
};

/// A codec for single byte values.
#[derive(Clone, Debug)]
pub enum Byte {
    /// No data.
    Null,
    /// Bytes from an external block.
    External {
        /// The content id of the backing block.
        block_content_id: block::ContentId,
    },
    /// Canonical Huffman codes in the core bitstream.
    Huffman {
        /// The symbol alphabet.
        alphabet: Vec<i32>,
        /// The per-symbol code lengths.
        bit_lens: Vec<u32>,
        decoder: CanonicalHuffmanDecoder,
        encoder: CanonicalHuffmanEncoder,
    },
}

impl Byte {
    pub fn huffman(alphabet: Vec<i32>, bit_lens: Vec<u32>) -> Self {
        let decoder = CanonicalHuffmanDecoder::new(&alphabet, &bit_lens);
        let encoder = CanonicalHuffmanEncoder::new(&alphabet, &bit_lens);

        Self::Huffman {
            alphabet,
            bit_lens,
            decoder,
            encoder,
        }
    }
}

impl PartialEq for Byte {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (
                Self::External {
                    block_content_id: a,
                },
                Self::External {
                    block_content_id: b,
                },
            ) => a == b,
            (
                Self::Huffman {
                    alphabet: a1,
                    bit_lens: a2,
                    ..
                },
                Self::Huffman {
                    alphabet: b1,
                    bit_lens: b2,
                    ..
                },
            ) => a1 == b1 && a2 == b2,
            _ => false,
        }
    }
}

impl Eq for Byte {}

impl<'de> Decode<'de> for Byte {
    type Value = u8;

    fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<Self::Value> {
        match self {
            Self::Null => Err(null_codec_error()),
            Self::External { block_content_id } => {
                let src = external_data_readers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block_error(*block_content_id))?;

                let (b, rest) = src
                    .split_first()
                    .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;

                *src = rest;

                Ok(*b)
            }
            Self::Huffman {
                alphabet, decoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(alphabet[0] as u8)
                } else {
                    decoder.decode(core_data_reader).map(|n| n as u8)
                }
            }
        }
    }
}

impl Encode<'_> for Byte {
    type Value = u8;

    fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: Self::Value,
    ) -> io::Result<()> {
        match self {
            Self::Null => Err(null_codec_error()),
            Self::External { block_content_id } => {
                let dst = external_data_writers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block_error(*block_content_id))?;

                dst.push(value);

                Ok(())
            }
            Self::Huffman {
                alphabet, encoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(())
                } else {
                    encoder.encode(core_data_writer, i32::from(value))
                }
            }
        }
    }
}
