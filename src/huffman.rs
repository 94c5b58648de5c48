use std::{collections::HashMap, io};

use crate::io::{BitReader, BitWriter};

/// A canonical Huffman decoder.
///
/// Codes are assigned canonically from `(alphabet, bit_lens)`: symbols are
/// ordered by (bit length, symbol value) and given consecutive codes,
/// left-shifted at each bit-length increase. Decoding walks the bit-length
/// levels, comparing the accumulated code against each level's first code.
#[derive(Clone, Debug)]
pub struct CanonicalHuffmanDecoder {
    // (bit_len, first_code, symbols at this bit length in canonical order)
    levels: Vec<(u32, i32, Vec<i32>)>,
}

impl CanonicalHuffmanDecoder {
    pub fn new(alphabet: &[i32], bit_lens: &[u32]) -> Self {
        let mut levels: Vec<(u32, i32, Vec<i32>)> = Vec::new();

        for (symbol, code, bit_len) in assign_canonical_codes(alphabet, bit_lens) {
            match levels.last_mut() {
                Some((len, _, symbols)) if *len == bit_len => symbols.push(symbol),
                _ => levels.push((bit_len, code, vec![symbol])),
            }
        }

        Self { levels }
    }

    pub fn decode(&self, reader: &mut BitReader<'_>) -> io::Result<i32> {
        let mut code = 0;
        let mut code_len = 0;

        for (bit_len, first_code, symbols) in &self.levels {
            code = (code << (bit_len - code_len)) | reader.read_i32(bit_len - code_len)?;
            code_len = *bit_len;

            let offset = code - first_code;

            if (0..symbols.len() as i32).contains(&offset) {
                return Ok(symbols[offset as usize]);
            }
        }

        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid Huffman code",
        ))
    }
}

/// A canonical Huffman encoder over the same code assignment as
/// [`CanonicalHuffmanDecoder`].
#[derive(Clone, Debug)]
pub struct CanonicalHuffmanEncoder {
    codes: HashMap<i32, (i32, u32)>,
}

impl CanonicalHuffmanEncoder {
    pub fn new(alphabet: &[i32], bit_lens: &[u32]) -> Self {
        let codes = assign_canonical_codes(alphabet, bit_lens)
            .map(|(symbol, code, bit_len)| (symbol, (code, bit_len)))
            .collect();

        Self { codes }
    }

    pub fn encode(&self, writer: &mut BitWriter, value: i32) -> io::Result<()> {
        let (code, bit_len) = self.codes.get(&value).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("symbol not in alphabet: {value}"),
            )
        })?;

        writer.write_u32(code as u32, bit_len as usize)
    }
}

fn assign_canonical_codes<'a>(
    alphabet: &'a [i32],
    bit_lens: &'a [u32],
) -> impl Iterator<Item = (i32, i32, u32)> + 'a {
    let mut pairs: Vec<_> = alphabet.iter().copied().zip(bit_lens.iter().copied()).collect();
    pairs.sort_unstable_by_key(|&(symbol, bit_len)| (bit_len, symbol));

    let mut code = 0;
    let mut prev_bit_len = pairs.first().map(|&(_, bit_len)| bit_len).unwrap_or(0);

    pairs.into_iter().map(move |(symbol, bit_len)| {
        if bit_len > prev_bit_len {
            code <<= bit_len - prev_bit_len;
            prev_bit_len = bit_len;
        }

        let assigned = (symbol, code, bit_len);
        code += 1;
        assigned
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_canonical_codes() {
        let symbols = [65, 66, 67, 68, 69, 70];
        let bit_lens = [1, 3, 3, 3, 4, 4];

        let codes: Vec<_> = assign_canonical_codes(&symbols, &bit_lens).collect();

        assert_eq!(
            codes,
            [
                (65, 0b0, 1),
                (66, 0b100, 3),
                (67, 0b101, 3),
                (68, 0b110, 3),
                (69, 0b1110, 4),
                (70, 0b1111, 4),
            ]
        );
    }

    #[test]
    fn test_decode() -> io::Result<()> {
        let symbols = [0x4e, 0x44, 0x4c];
        let bit_lens = [1, 2, 2];
        let decoder = CanonicalHuffmanDecoder::new(&symbols, &bit_lens);

        let data = [0b01011000];
        let mut reader = BitReader::new(&data[..]);

        assert_eq!(decoder.decode(&mut reader)?, 0x4e);
        assert_eq!(decoder.decode(&mut reader)?, 0x44);
        assert_eq!(decoder.decode(&mut reader)?, 0x4c);
        assert_eq!(decoder.decode(&mut reader)?, 0x4e);

        Ok(())
    }

    #[test]
    fn test_encode() -> io::Result<()> {
        let symbols = [0x4e, 0x44, 0x4c];
        let bit_lens = [1, 2, 2];
        let encoder = CanonicalHuffmanEncoder::new(&symbols, &bit_lens);

        let mut writer = BitWriter::default();
        encoder.encode(&mut writer, 0x4e)?;
        encoder.encode(&mut writer, 0x44)?;
        encoder.encode(&mut writer, 0x4c)?;
        encoder.encode(&mut writer, 0x4e)?;

        let data = writer.finish()?;
        assert_eq!(data, [0b01011000]);

        Ok(())
    }

    #[test]
    fn test_round_trip() -> io::Result<()> {
        let symbols = [65, 66, 67, 68, 69, 70];
        let bit_lens = [1, 3, 3, 3, 4, 4];

        let encoder = CanonicalHuffmanEncoder::new(&symbols, &bit_lens);
        let decoder = CanonicalHuffmanDecoder::new(&symbols, &bit_lens);

        let values = [65, 66, 67, 68, 69, 70, 65, 65];

        let mut writer = BitWriter::default();
        for &value in &values {
            encoder.encode(&mut writer, value)?;
        }
        let data = writer.finish()?;

        let mut reader = BitReader::new(&data);
        for &expected in &values {
            assert_eq!(decoder.decode(&mut reader)?, expected);
        }

        Ok(())
    }

    #[test]
    fn test_decode_with_invalid_code() {
        let symbols = [1, 2];
        let bit_lens = [2, 2];
        let decoder = CanonicalHuffmanDecoder::new(&symbols, &bit_lens);

        // 0b11 is not an assigned code
        let data = [0b11000000];
        let mut reader = BitReader::new(&data[..]);

        assert!(decoder.decode(&mut reader).is_err());
    }
}
