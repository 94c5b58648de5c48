use std::io::Read;

use super::{container::block::read_block_as, num::read_i32_le};
use crate::{
    container::block::ContentType,
    file_definition::{Version, MAGIC_NUMBER},
    Error, FileDefinition, Result,
};

pub(super) fn read_file_definition<R>(reader: &mut R) -> Result<FileDefinition>
where
    R: Read,
{
    let mut magic = [0; 4];
    reader.read_exact(&mut magic)?;

    if magic != MAGIC_NUMBER {
        return Err(Error::malformed("invalid CRAM magic number"));
    }

    let mut version = [0; 2];
    reader.read_exact(&mut version)?;

    let version = Version::new(version[0], version[1]);
    version.validate()?;

    let mut file_id = [0; 20];
    reader.read_exact(&mut file_id)?;

    Ok(FileDefinition::new(version, file_id))
}

/// Reads the header container, returning the SAM header text.
///
/// The header container holds one `FILE_HEADER` block whose payload is the
/// text length (i32 LE) followed by the text, possibly padded with reserved
/// space for in-place rewrites.
pub(super) fn read_file_header<R>(reader: &mut R, version: Version) -> Result<Vec<u8>>
where
    R: Read,
{
    use super::container::header::read_header;

    let mut header = crate::container::Header::default();
    let len = read_header(reader, &mut header, version)?;

    if len == 0 {
        return Err(Error::malformed("missing header container"));
    }

    let mut src = vec![0; len];
    reader.read_exact(&mut src)?;

    let mut src = &src[..];
    let block = read_block_as(&mut src, ContentType::FileHeader, version)?;
    let buf = block.decode()?;

    let mut buf = &buf[..];
    let text_len = read_i32_le(&mut buf)
        .map_err(Error::from)
        .and_then(|n| {
            usize::try_from(n).map_err(|_| Error::malformed("invalid header text length"))
        })?;

    let text = buf
        .get(..text_len)
        .ok_or_else(|| Error::malformed("header text length out of bounds"))?;

    Ok(text.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_definition() -> Result<()> {
        let mut src = Vec::new();
        src.extend_from_slice(b"CRAM");
        src.extend_from_slice(&[0x03, 0x00]);
        src.extend_from_slice(&[0x00; 20]);

        let file_definition = read_file_definition(&mut &src[..])?;

        assert_eq!(file_definition.version(), Version::V3_0);
        assert_eq!(file_definition.file_id(), &[0; 20]);

        Ok(())
    }

    #[test]
    fn test_read_file_definition_with_invalid_magic() {
        let src = b"BAM\x01\x03\x00";

        assert!(matches!(
            read_file_definition(&mut &src[..]),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_read_file_definition_with_unsupported_version() {
        let mut src = Vec::new();
        src.extend_from_slice(b"CRAM");
        src.extend_from_slice(&[0x05, 0x00]);
        src.extend_from_slice(&[0x00; 20]);

        assert!(matches!(
            read_file_definition(&mut &src[..]),
            Err(Error::UnsupportedVersion(_))
        ));
    }
}
