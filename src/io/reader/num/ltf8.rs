use std::io::{self, Read};

use super::read_u8;

/// Reads an LTF8 integer, the 64-bit analog of ITF8 (1-9 bytes).
pub fn read_ltf8<R>(reader: &mut R) -> io::Result<i64>
where
    R: Read,
{
    let b0 = read_u8(reader).map(i64::from)?;

    let n = if b0 & 0x80 == 0 {
        b0
    } else if b0 & 0x40 == 0 {
        let b1 = read_u8(reader).map(i64::from)?;
        (b0 & 0x7f) << 8 | b1
    } else if b0 & 0x20 == 0 {
        read_trailing(reader, 2).map(|n| (b0 & 0x3f) << 16 | n)?
    } else if b0 & 0x10 == 0 {
        read_trailing(reader, 3).map(|n| (b0 & 0x1f) << 24 | n)?
    } else if b0 & 0x08 == 0 {
        read_trailing(reader, 4).map(|n| (b0 & 0x0f) << 32 | n)?
    } else if b0 & 0x04 == 0 {
        read_trailing(reader, 5).map(|n| (b0 & 0x07) << 40 | n)?
    } else if b0 & 0x02 == 0 {
        read_trailing(reader, 6).map(|n| (b0 & 0x03) << 48 | n)?
    } else if b0 & 0x01 == 0 {
        read_trailing(reader, 7)?
    } else {
        read_trailing(reader, 8)?
    };

    Ok(n)
}

/// Reads an LTF8 integer, converting to type `N`.
pub fn read_ltf8_as<R, N>(reader: &mut R) -> io::Result<N>
where
    R: Read,
    N: TryFrom<i64>,
    <N as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    read_ltf8(reader).and_then(|n| {
        n.try_into()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

fn read_trailing<R>(reader: &mut R, len: usize) -> io::Result<i64>
where
    R: Read,
{
    let mut n = 0;

    for _ in 0..len {
        let b = read_u8(reader).map(i64::from)?;
        n = n << 8 | b;
    }

    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ltf8() -> io::Result<()> {
        fn t(mut data: &[u8], expected: i64) -> io::Result<()> {
            assert_eq!(read_ltf8(&mut data)?, expected);
            Ok(())
        }

        t(&[0x00], 0)?;
        t(&[0x55], 85)?;
        t(&[0x80, 0xaa], 170)?;
        t(&[0xc0, 0x55, 0xaa], 21930)?;
        t(&[0xe0, 0x55, 0xaa, 0xcc], 5614284)?;
        t(&[0xf0, 0x55, 0xaa, 0xcc, 0x33], 1437256755)?;
        t(&[0xf8, 0x55, 0xaa, 0xcc, 0x33, 0xe3], 367937729507)?;
        t(&[0xfc, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x1c], 94192058753820)?;
        t(
            &[0xfe, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x1c, 0xf0],
            24113167040978160,
        )?;
        t(
            &[0xff, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x1c, 0xf0, 0x0f],
            6172970762490408975,
        )?;
        t(
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            -1,
        )?;

        Ok(())
    }

    #[test]
    fn test_read_ltf8_with_truncated_stream() {
        let data = [0xff, 0x55, 0xaa];
        assert!(matches!(
            read_ltf8(&mut &data[..]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }
}
