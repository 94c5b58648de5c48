use std::io;

use super::num::read_itf8_as;

/// Reads an ITF8-length-prefixed byte array.
pub(super) fn read_array<'a>(src: &mut &'a [u8]) -> io::Result<&'a [u8]> {
    let len: usize = read_itf8_as(src)?;

    if len > src.len() {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
    }

    let (buf, rest) = src.split_at(len);
    *src = rest;

    Ok(buf)
}

/// Reads an ITF8-length-prefixed map, returning its body and entry count.
pub(super) fn read_map<'a>(src: &mut &'a [u8]) -> io::Result<(&'a [u8], usize)> {
    let mut buf = read_array(src)?;
    let len = read_itf8_as(&mut buf)?;
    Ok((buf, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_array() -> io::Result<()> {
        let mut src = &[0x03, 0x01, 0x02, 0x03, 0xff][..];
        assert_eq!(read_array(&mut src)?, [0x01, 0x02, 0x03]);
        assert_eq!(src, [0xff]);
        Ok(())
    }

    #[test]
    fn test_read_array_with_truncated_body() {
        let mut src = &[0x03, 0x01][..];
        assert!(matches!(
            read_array(&mut src),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn test_read_map() -> io::Result<()> {
        let mut src = &[0x03, 0x02, 0x0d, 0x15][..];
        let (buf, len) = read_map(&mut src)?;
        assert_eq!(buf, [0x0d, 0x15]);
        assert_eq!(len, 2);
        Ok(())
    }
}
