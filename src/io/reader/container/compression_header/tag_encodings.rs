use super::encoding::read_byte_array_encoding;
use crate::{
    container::compression_header::TagEncodings,
    io::reader::{collections::read_map, num::read_itf8},
    Result,
};

pub(super) fn read_tag_encodings(src: &mut &[u8]) -> Result<TagEncodings> {
    let (mut buf, len) = read_map(src)?;

    let mut tag_encodings = TagEncodings::new();

    for _ in 0..len {
        let block_content_id = read_itf8(&mut buf)?;
        let encoding = read_byte_array_encoding(&mut buf, &format!("tag {block_content_id}"))?;
        tag_encodings.insert(block_content_id, encoding);
    }

    Ok(tag_encodings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::{
        encoding::codec::{Byte, ByteArray, Integer},
        Encoding,
    };

    #[test]
    fn test_read_tag_encodings() -> Result<()> {
        let src = [
            0x0d, // map length = 13
            0x01, // entry count = 1
            0xe0, 0x4e, 0x4d, 0x63, // block content ID = 5131619 (NM:c)
            0x04, // byte array length encoding ID
            0x06, // args.len
            0x01, 0x01, 0x0d, // len: external, block 13
            0x01, 0x01, 0x15, // value: external, block 21
        ];

        let tag_encodings = read_tag_encodings(&mut &src[..])?;

        assert_eq!(
            tag_encodings.get(&5131619),
            Some(&Encoding::new(ByteArray::ByteArrayLength {
                len_encoding: Encoding::new(Integer::External {
                    block_content_id: 13
                }),
                value_encoding: Encoding::new(Byte::External {
                    block_content_id: 21
                }),
            }))
        );

        Ok(())
    }
}
