use std::io::{self, Read, Write};

use bzip2::{read::BzDecoder, write::BzEncoder, Compression};

pub fn encode(compression_level: Compression, src: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(Vec::new(), compression_level);
    encoder.write_all(src)?;
    encoder.finish()
}

pub fn decode(src: &[u8], dst: &mut Vec<u8>) -> io::Result<()> {
    let mut decoder = BzDecoder::new(src);
    decoder.read_to_end(dst)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> io::Result<()> {
        let data = b"ACGTACGT";

        let compressed = encode(Compression::default(), data)?;

        let mut decompressed = Vec::new();
        decode(&compressed, &mut decompressed)?;

        assert_eq!(decompressed, data);

        Ok(())
    }
}
