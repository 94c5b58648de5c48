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
        reader::num::read_itf8,
        writer::container::slice::records::ExternalDataWriters,
        writer::num::write_itf8,
        BitReader, BitWriter,
    },
};

/// A codec for integer values.
#[derive(Clone, Debug)]
pub enum Integer {
    /// No data.
    Null,
    /// ITF8 integers from an external block.
    External {
        /// The content id of the backing block.
        block_content_id: block::ContentId,
    },
    /// Golomb codes in the core bitstream.
    Golomb {
        /// The value offset.
        offset: i32,
        /// The Golomb parameter.
        m: i32,
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
    /// Fixed-width binary in the core bitstream.
    Beta {
        /// The value offset.
        offset: i32,
        /// The bit width.
        len: u32,
    },
    /// Subexponential codes in the core bitstream.
    Subexp {
        /// The value offset.
        offset: i32,
        /// The subexponential parameter.
        k: i32,
    },
    /// Golomb-Rice codes in the core bitstream.
    GolombRice {
        /// The value offset.
        offset: i32,
        /// log2 of the Golomb parameter.
        log2_m: i32,
    },
    /// Elias gamma codes in the core bitstream.
    Gamma {
        /// The value offset.
        offset: i32,
    },
}

impl Integer {
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

impl PartialEq for Integer {
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
            (Self::Golomb { offset: a1, m: a2 }, Self::Golomb { offset: b1, m: b2 }) => {
                a1 == b1 && a2 == b2
            }
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
            (
                Self::Beta {
                    offset: a1,
                    len: a2,
                },
                Self::Beta {
                    offset: b1,
                    len: b2,
                },
            ) => a1 == b1 && a2 == b2,
            (Self::Subexp { offset: a1, k: a2 }, Self::Subexp { offset: b1, k: b2 }) => {
                a1 == b1 && a2 == b2
            }
            (
                Self::GolombRice {
                    offset: a1,
                    log2_m: a2,
                },
                Self::GolombRice {
                    offset: b1,
                    log2_m: b2,
                },
            ) => a1 == b1 && a2 == b2,
            (Self::Gamma { offset: a }, Self::Gamma { offset: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Integer {}

impl<'de> Decode<'de> for Integer {
    type Value = i32;

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

                read_itf8(src)
            }
            Self::Huffman {
                alphabet, decoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(alphabet[0])
                } else {
                    decoder.decode(core_data_reader)
                }
            }
            Self::Beta { offset, len } => {
                core_data_reader.read_i32(*len).map(|n| n - offset)
            }
            Self::Gamma { offset } => {
                let mut n = 0;

                while core_data_reader.read_bit()? == 0 {
                    n += 1;
                }

                let m = core_data_reader.read_i32(n)?;
                let x = (1 << n) + m;

                Ok(x - offset)
            }
            Self::Golomb { offset, m } => {
                if *m <= 0 {
                    return Err(invalid_parameter("Golomb", "m", *m));
                }

                let mut q = 0i32;

                while core_data_reader.read_bit()? == 0 {
                    q += 1;
                }

                let b = 32 - (*m - 1).leading_zeros();

                let value = if b == 0 {
                    q
                } else {
                    let r = core_data_reader.read_i32(b - 1)?;
                    let threshold = (1i32 << b) - m;

                    if r < threshold {
                        q * m + r
                    } else {
                        let r = (r << 1) | core_data_reader.read_i32(1)?;
                        q * m + r - threshold
                    }
                };

                Ok(value - offset)
            }
            Self::GolombRice { offset, log2_m } => {
                if !(0..32).contains(log2_m) {
                    return Err(invalid_parameter("Golomb-Rice", "log2_m", *log2_m));
                }

                let log2_m = *log2_m as u32;

                let mut q = 0i32;

                while core_data_reader.read_bit()? == 0 {
                    q += 1;
                }

                let r = core_data_reader.read_i32(log2_m)?;
                let value = (q << log2_m) | r;

                Ok(value - offset)
            }
            Self::Subexp { offset, k } => {
                if !(0..32).contains(k) {
                    return Err(invalid_parameter("subexponential", "k", *k));
                }

                let k = *k as u32;
                let mut u = 0u32;

                while core_data_reader.read_bit()? == 1 {
                    u += 1;
                }

                // u == 0 encodes k raw bits; u >= 1 encodes b = k + u - 1
                // bits with an implicit leading one.
                let value = if u == 0 {
                    core_data_reader.read_i32(k)?
                } else {
                    let b = k + u - 1;

                    if b >= 32 {
                        return Err(invalid_parameter("subexponential", "b", b as i32));
                    }

                    (1 << b) | core_data_reader.read_i32(b)?
                };

                Ok(value - offset)
            }
        }
    }
}

impl Encode<'_> for Integer {
    type Value = i32;

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

                write_itf8(dst, value)
            }
            Self::Huffman {
                alphabet, encoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(())
                } else {
                    encoder.encode(core_data_writer, value)
                }
            }
            Self::Beta { offset, len } => {
                core_data_writer.write_u32((value + offset) as u32, *len as usize)
            }
            Self::Gamma { offset } => {
                let x = value + offset;

                if x < 1 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("gamma encoding requires x >= 1, got {x}"),
                    ));
                }

                let n = 31 - (x as u32).leading_zeros();

                for _ in 0..n {
                    core_data_writer.write_u32(0, 1)?;
                }

                core_data_writer.write_u32(1, 1)?;

                let m = x - (1 << n);
                core_data_writer.write_u32(m as u32, n as usize)
            }
            Self::Golomb { offset, m } => {
                if *m <= 0 {
                    return Err(invalid_parameter("Golomb", "m", *m));
                }

                let n = value + offset;

                if n < 0 {
                    return Err(negative_value_error("Golomb", n));
                }

                let q = n / m;
                let r = n % m;

                // q in unary: q zeros then a one
                for _ in 0..q {
                    core_data_writer.write_u32(0, 1)?;
                }
                core_data_writer.write_u32(1, 1)?;

                let b = 32 - (*m - 1).leading_zeros();

                if b > 0 {
                    let threshold = (1i32 << b) - m;

                    if r < threshold {
                        core_data_writer.write_u32(r as u32, (b - 1) as usize)?;
                    } else {
                        core_data_writer.write_u32((r + threshold) as u32, b as usize)?;
                    }
                }

                Ok(())
            }
            Self::GolombRice { offset, log2_m } => {
                if !(0..32).contains(log2_m) {
                    return Err(invalid_parameter("Golomb-Rice", "log2_m", *log2_m));
                }

                let n = value + offset;

                if n < 0 {
                    return Err(negative_value_error("Golomb-Rice", n));
                }

                let log2_m = *log2_m as u32;
                let q = n >> log2_m;
                let r = n & ((1 << log2_m) - 1);

                for _ in 0..q {
                    core_data_writer.write_u32(0, 1)?;
                }
                core_data_writer.write_u32(1, 1)?;

                core_data_writer.write_u32(r as u32, log2_m as usize)
            }
            Self::Subexp { offset, k } => {
                if !(0..32).contains(k) {
                    return Err(invalid_parameter("subexponential", "k", *k));
                }

                let n = value + offset;

                if n < 0 {
                    return Err(negative_value_error("subexponential", n));
                }

                let k = *k as u32;

                // values below 2^k take a 0 bit and k raw bits; a value with
                // top bit b >= k takes (b - k + 1) ones, a zero, then b bits
                // with the leading one stripped.
                let (u, bits, base) = if n < (1 << k) {
                    (0u32, k, 0i32)
                } else {
                    let b = 31 - (n as u32).leading_zeros();
                    (b - k + 1, b, 1i32 << b)
                };

                for _ in 0..u {
                    core_data_writer.write_u32(1, 1)?;
                }
                core_data_writer.write_u32(0, 1)?;

                core_data_writer.write_u32((n - base) as u32, bits as usize)
            }
        }
    }
}

fn invalid_parameter(codec: &str, name: &str, value: i32) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("invalid {codec} parameter: {name}={value}"),
    )
}

fn negative_value_error(codec: &str, n: i32) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{codec} encoding requires a non-negative value after offset: got {n}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::Encoding;

    fn decode_with_core_data(encoding: &Encoding<Integer>, core_data: &[u8]) -> io::Result<i32> {
        let mut core_data_reader = BitReader::new(core_data);
        let mut external_data_readers = ExternalDataReaders::new();
        encoding.decode(&mut core_data_reader, &mut external_data_readers)
    }

    #[test]
    fn test_decode_external() -> io::Result<()> {
        let core_data = [];
        let mut core_data_reader = BitReader::new(&core_data[..]);

        let external_data = [0x0d];
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(1, &external_data[..]);

        let encoding = Encoding::new(Integer::External {
            block_content_id: 1,
        });

        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            13
        );

        Ok(())
    }

    #[test]
    fn test_decode_huffman() -> io::Result<()> {
        let encoding = Encoding::new(Integer::huffman(vec![0x4e], vec![0]));
        assert_eq!(decode_with_core_data(&encoding, &[0b10000000])?, 0x4e);
        Ok(())
    }

    #[test]
    fn test_decode_beta() -> io::Result<()> {
        // 3 bits of 0b100 = 4, offset 1 -> 3
        let encoding = Encoding::new(Integer::Beta { offset: 1, len: 3 });
        assert_eq!(decode_with_core_data(&encoding, &[0b10000000])?, 3);
        Ok(())
    }

    #[test]
    fn test_decode_gamma() -> io::Result<()> {
        // 000 1 101 0 => n=3, m=0b101=5, x=8+5=13, offset 5 -> 8
        let encoding = Encoding::new(Integer::Gamma { offset: 5 });
        assert_eq!(decode_with_core_data(&encoding, &[0b00011010])?, 8);
        Ok(())
    }

    #[test]
    fn test_decode_golomb() -> io::Result<()> {
        // m=5: b=3, threshold=3; bits 00 1 01 => q=2, r=1 < 3 => 2*5+1=11
        let encoding = Encoding::new(Integer::Golomb { offset: 0, m: 5 });
        assert_eq!(decode_with_core_data(&encoding, &[0b00101000])?, 11);

        let encoding = Encoding::new(Integer::Golomb { offset: 10, m: 5 });
        assert_eq!(decode_with_core_data(&encoding, &[0b00101000])?, 1);

        // bits 1 11 0 => q=0, r=3 >= threshold(3), r=(3<<1)|0=6 => 6-3=3
        let encoding = Encoding::new(Integer::Golomb { offset: 0, m: 5 });
        assert_eq!(decode_with_core_data(&encoding, &[0b11100000])?, 3);

        Ok(())
    }

    #[test]
    fn test_decode_golomb_rice() -> io::Result<()> {
        // log2_m=3: bits 00 1 101 => q=2, r=5 => (2<<3)|5 = 21
        let encoding = Encoding::new(Integer::GolombRice {
            offset: 0,
            log2_m: 3,
        });
        assert_eq!(decode_with_core_data(&encoding, &[0b00110100])?, 21);

        Ok(())
    }

    #[test]
    fn test_decode_subexp() -> io::Result<()> {
        // k=2: bits 0 11 => u=0, value=3
        let encoding = Encoding::new(Integer::Subexp { offset: 0, k: 2 });
        assert_eq!(decode_with_core_data(&encoding, &[0b01100000])?, 3);

        // k=2: bits 1 0 00 => u=1, b=2, value=0b100=4
        let encoding = Encoding::new(Integer::Subexp { offset: 0, k: 2 });
        assert_eq!(decode_with_core_data(&encoding, &[0b10000000])?, 4);

        // k=2: bits 11 0 101 => u=2, b=3, value=0b1101=13
        let encoding = Encoding::new(Integer::Subexp { offset: 0, k: 2 });
        assert_eq!(decode_with_core_data(&encoding, &[0b11010100])?, 13);

        Ok(())
    }

    #[test]
    fn test_round_trip_core_codecs() -> io::Result<()> {
        let codecs = [
            Integer::Beta {
                offset: 0,
                len: 10,
            },
            Integer::Gamma { offset: 1 },
            Integer::Golomb { offset: 0, m: 5 },
            Integer::Golomb { offset: 0, m: 1 },
            Integer::GolombRice {
                offset: 0,
                log2_m: 3,
            },
            Integer::GolombRice {
                offset: 0,
                log2_m: 0,
            },
            Integer::Subexp { offset: 0, k: 2 },
            Integer::Subexp { offset: 0, k: 0 },
            Integer::huffman(vec![0, 1, 2, 3, 500], vec![1, 2, 3, 4, 4]),
        ];

        let values = [0, 1, 2, 3, 500];

        for codec in &codecs {
            let encoding = Encoding::new(codec.clone());

            let mut core_data_writer = BitWriter::default();
            let mut external_data_writers = ExternalDataWriters::new();

            for &value in &values {
                encoding.encode(&mut core_data_writer, &mut external_data_writers, value)?;
            }

            let core_data = core_data_writer.finish()?;
            let mut core_data_reader = BitReader::new(&core_data[..]);
            let mut external_data_readers = ExternalDataReaders::new();

            for &expected in &values {
                let actual =
                    encoding.decode(&mut core_data_reader, &mut external_data_readers)?;
                assert_eq!(actual, expected, "codec: {codec:?}");
            }
        }

        Ok(())
    }
}
