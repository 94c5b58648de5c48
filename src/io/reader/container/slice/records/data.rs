use std::{io, mem};

use bstr::BString;

use crate::alignment::data::{Array, Type, Value};

/// Parses a tag value from its BAM-style binary form.
///
/// The buffer holds exactly one value; the type comes from the tag-id
/// dictionary entry.
pub(super) fn read_value(src: &[u8], ty: Type) -> io::Result<Value> {
    match ty {
        Type::Character => read_u8(src).map(Value::Character),
        Type::Int8 => read_u8(src).map(|n| Value::Int8(n as i8)),
        Type::UInt8 => read_u8(src).map(Value::UInt8),
        Type::Int16 => read_u16_le(src).map(|n| Value::Int16(n as i16)),
        Type::UInt16 => read_u16_le(src).map(Value::UInt16),
        Type::Int32 => read_u32_le(src).map(|n| Value::Int32(n as i32)),
        Type::UInt32 => read_u32_le(src).map(Value::UInt32),
        Type::Float => read_f32_le(src).map(Value::Float),
        Type::String => read_string(src).map(Value::String),
        Type::Hex => read_string(src).map(Value::Hex),
        Type::Array => read_array(src),
    }
}

fn read_u8(src: &[u8]) -> io::Result<u8> {
    src.first()
        .copied()
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
}

fn read_u16_le(src: &[u8]) -> io::Result<u16> {
    src.split_first_chunk()
        .map(|(buf, _)| u16::from_le_bytes(*buf))
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
}

fn read_u32_le(src: &[u8]) -> io::Result<u32> {
    src.split_first_chunk()
        .map(|(buf, _)| u32::from_le_bytes(*buf))
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
}

fn read_f32_le(src: &[u8]) -> io::Result<f32> {
    src.split_first_chunk()
        .map(|(buf, _)| f32::from_le_bytes(*buf))
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
}

fn read_string(src: &[u8]) -> io::Result<BString> {
    const NUL: u8 = 0x00;

    src.strip_suffix(&[NUL])
        .map(BString::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing NUL terminator"))
}

fn read_array(src: &[u8]) -> io::Result<Value> {
    let (subtype, src) = src
        .split_first()
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;

    let (len, data) = src
        .split_first_chunk::<4>()
        .map(|(buf, rest)| (u32::from_le_bytes(*buf) as usize, rest))
        .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;

    let element_size = match subtype {
        b'c' | b'C' => 1,
        b's' | b'S' => mem::size_of::<i16>(),
        b'i' | b'I' | b'f' => mem::size_of::<i32>(),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid array subtype: {subtype:#04x}"),
            ));
        }
    };

    let expected = len
        .checked_mul(element_size)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "array length overflow"))?;

    if data.len() < expected {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
    }

    let data = &data[..expected];

    let array = match subtype {
        b'c' => Array::Int8(data.iter().map(|&b| b as i8).collect()),
        b'C' => Array::UInt8(data.to_vec()),
        b's' => Array::Int16(
            data.chunks_exact(2)
                .map(|buf| i16::from_le_bytes([buf[0], buf[1]]))
                .collect(),
        ),
        b'S' => Array::UInt16(
            data.chunks_exact(2)
                .map(|buf| u16::from_le_bytes([buf[0], buf[1]]))
                .collect(),
        ),
        b'i' => Array::Int32(
            data.chunks_exact(4)
                .map(|buf| i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
                .collect(),
        ),
        b'I' => Array::UInt32(
            data.chunks_exact(4)
                .map(|buf| u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
                .collect(),
        ),
        b'f' => Array::Float(
            data.chunks_exact(4)
                .map(|buf| f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
                .collect(),
        ),
        _ => unreachable!(),
    };

    Ok(Value::Array(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_value() -> io::Result<()> {
        assert_eq!(read_value(&[b'n'], Type::Character)?, Value::Character(b'n'));
        assert_eq!(read_value(&[0xf8], Type::Int8)?, Value::Int8(-8));
        assert_eq!(read_value(&[0x08], Type::UInt8)?, Value::UInt8(8));
        assert_eq!(
            read_value(&[0x55, 0xaa], Type::UInt16)?,
            Value::UInt16(0xaa55)
        );
        assert_eq!(
            read_value(&[0x0d, 0x00, 0x00, 0x00], Type::Int32)?,
            Value::Int32(13)
        );
        assert_eq!(
            read_value(b"read1\x00", Type::String)?,
            Value::String("read1".into())
        );

        Ok(())
    }

    #[test]
    fn test_read_value_with_missing_nul() {
        assert!(read_value(b"read1", Type::String).is_err());
    }

    #[test]
    fn test_read_array() -> io::Result<()> {
        let src = [
            b'i', // subtype
            0x02, 0x00, 0x00, 0x00, // length = 2
            0x0d, 0x00, 0x00, 0x00, // 13
            0xf3, 0xff, 0xff, 0xff, // -13
        ];

        assert_eq!(
            read_value(&src, Type::Array)?,
            Value::Array(Array::Int32(vec![13, -13]))
        );

        Ok(())
    }
}
