use std::io::Write;

use super::encoding::write_byte_array_encoding;
use crate::{
    container::compression_header::{
        encoding::codec::{Byte, ByteArray, Integer},
        Encoding, TagEncodings,
    },
    container::compression_header::preservation_map::TagSets,
    io::writer::{collections::write_array, num::write_itf8},
    Result,
};

/// Builds the default tag encoding for every key in the dictionary: a
/// length-prefixed byte array with both the lengths and the values in the
/// key's own external block.
pub(super) fn build_tag_encodings(tag_sets: &TagSets) -> TagEncodings {
    let mut tag_encodings = TagEncodings::new();

    for keys in tag_sets {
        for key in keys {
            let block_content_id = key.block_content_id();

            tag_encodings
                .entry(block_content_id)
                .or_insert_with(|| {
                    Encoding::new(ByteArray::ByteArrayLength {
                        len_encoding: Encoding::new(Integer::External { block_content_id }),
                        value_encoding: Encoding::new(Byte::External { block_content_id }),
                    })
                });
        }
    }

    tag_encodings
}

pub(super) fn write_tag_encodings(
    writer: &mut impl Write,
    tag_encodings: &TagEncodings,
) -> Result<()> {
    let mut buf = Vec::new();

    let len = i32::try_from(tag_encodings.len())
        .map_err(|_| crate::Error::invalid_state("too many tag encodings"))?;
    write_itf8(&mut buf, len)?;

    for (block_content_id, encoding) in tag_encodings {
        write_itf8(&mut buf, *block_content_id)?;
        write_byte_array_encoding(&mut buf, encoding)?;
    }

    write_array(writer, &buf)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alignment::data::{Tag, Type},
        container::compression_header::preservation_map::tag_sets,
    };

    #[test]
    fn test_build_tag_encodings() {
        let tag_sets: TagSets = vec![
            vec![tag_sets::Key::new(Tag::new(b'N', b'M'), Type::Int8)],
            vec![
                tag_sets::Key::new(Tag::new(b'N', b'M'), Type::Int8),
                tag_sets::Key::new(Tag::new(b'C', b'O'), Type::String),
            ],
        ];

        let tag_encodings = build_tag_encodings(&tag_sets);

        // NM:c appears in two sets but gets one encoding
        assert_eq!(tag_encodings.len(), 2);
        assert!(tag_encodings.contains_key(&5131619));
        assert!(tag_encodings.contains_key(&4411226));
    }
}
