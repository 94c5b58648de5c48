use std::io::{self, Write};

/// Writes an LTF8 integer.
pub fn write_ltf8<W>(writer: &mut W, value: i64) -> io::Result<()>
where
    W: Write,
{
    if value >> (8 - 1) == 0 {
        writer.write_all(&[value as u8])
    } else if value >> (16 - 2) == 0 {
        let buf = [(value >> 8 | 0x80) as u8, value as u8];
        writer.write_all(&buf)
    } else if value >> (24 - 3) == 0 {
        let buf = [(value >> 16 | 0xc0) as u8, (value >> 8) as u8, value as u8];
        writer.write_all(&buf)
    } else if value >> (32 - 4) == 0 {
        let buf = [
            (value >> 24 | 0xe0) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ];
        writer.write_all(&buf)
    } else if value >> (40 - 5) == 0 {
        let buf = [
            (value >> 32 | 0xf0) as u8,
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ];
        writer.write_all(&buf)
    } else if value >> (48 - 6) == 0 {
        let buf = [
            (value >> 40 | 0xf8) as u8,
            (value >> 32) as u8,
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ];
        writer.write_all(&buf)
    } else if value >> (56 - 7) == 0 {
        let buf = [
            (value >> 48 | 0xfc) as u8,
            (value >> 40) as u8,
            (value >> 32) as u8,
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ];
        writer.write_all(&buf)
    } else if value >> (64 - 8) == 0 {
        let buf = [
            0xfe,
            (value >> 48) as u8,
            (value >> 40) as u8,
            (value >> 32) as u8,
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ];
        writer.write_all(&buf)
    } else {
        let buf = [
            0xff,
            (value >> 56) as u8,
            (value >> 48) as u8,
            (value >> 40) as u8,
            (value >> 32) as u8,
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ];
        writer.write_all(&buf)
    }
}
