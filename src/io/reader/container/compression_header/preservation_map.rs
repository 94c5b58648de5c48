use std::io;

use crate::{
    alignment::data::{Tag, Type},
    container::compression_header::preservation_map::{
        tag_sets, Key, PreservationMap, SubstitutionMatrix, TagSets,
    },
    io::reader::collections::read_map,
    Error, Result,
};

pub(super) fn read_preservation_map(src: &mut &[u8]) -> Result<PreservationMap> {
    let (mut buf, len) = read_map(src)?;

    let mut map = PreservationMap::default();

    for _ in 0..len {
        let key = read_key(&mut buf)?;

        match key {
            Key::RecordsHaveNames => map.records_have_names = read_bool(&mut buf)?,
            Key::AlignmentStartsAreDeltas => {
                map.alignment_starts_are_deltas = read_bool(&mut buf)?;
            }
            Key::ExternalReferenceSequenceIsRequired => {
                map.external_reference_sequence_is_required = read_bool(&mut buf)?;
            }
            Key::SubstitutionMatrix => {
                map.substitution_matrix = read_substitution_matrix(&mut buf)?;
            }
            Key::TagSets => map.tag_sets = read_tag_sets(&mut buf)?,
        }
    }

    Ok(map)
}

fn read_key(src: &mut &[u8]) -> Result<Key> {
    let (buf, rest) = src
        .split_first_chunk::<2>()
        .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))?;

    *src = rest;

    Key::try_from(*buf).map_err(|e| Error::malformed(e.to_string()))
}

fn read_bool(src: &mut &[u8]) -> Result<bool> {
    let (b, rest) = src
        .split_first()
        .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))?;

    *src = rest;

    match b {
        0x00 => Ok(false),
        0x01 => Ok(true),
        _ => Err(Error::malformed(format!(
            "invalid preservation map boolean: {b:#04x}"
        ))),
    }
}

fn read_substitution_matrix(src: &mut &[u8]) -> Result<SubstitutionMatrix> {
    let (buf, rest) = src
        .split_first_chunk::<5>()
        .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))?;

    *src = rest;

    SubstitutionMatrix::try_from(*buf).map_err(|e| Error::malformed(e.to_string()))
}

/// Reads the tag-id dictionary (`TD`): an ITF8-length-prefixed buffer of
/// NUL-separated entries, each a run of 3-byte (tag, tag, type) keys.
fn read_tag_sets(src: &mut &[u8]) -> Result<TagSets> {
    use crate::io::reader::collections::read_array;

    let buf = read_array(src)?;

    if buf.is_empty() {
        return Ok(TagSets::new());
    }

    // each entry is NUL-terminated; an entry may be empty (the no-tags set)
    let buf = buf.strip_suffix(&[0x00]).unwrap_or(buf);

    let mut tag_sets = TagSets::new();

    for entry in buf.split(|&b| b == 0x00) {
        if entry.len() % 3 != 0 {
            return Err(Error::malformed("invalid tag set entry length"));
        }

        let mut keys = Vec::with_capacity(entry.len() / 3);

        for chunk in entry.chunks_exact(3) {
            let tag = Tag::new(chunk[0], chunk[1]);

            let ty = Type::try_from(chunk[2])
                .map_err(|b| Error::malformed(format!("invalid tag value type: {b:#04x}")))?;

            keys.push(tag_sets::Key::new(tag, ty));
        }

        tag_sets.push(keys);
    }

    Ok(tag_sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_preservation_map() -> Result<()> {
        let src = [
            0x18, // map length = 24
            0x05, // entry count = 5
            b'R', b'N', 0x00, // records have names = false
            b'A', b'P', 0x01, // alignment starts are deltas = true
            b'R', b'R', 0x01, // external reference required = true
            b'S', b'M', 0x1b, 0x1b, 0x1b, 0x1b, 0x1b, // substitution matrix
            b'T', b'D', 0x04, b'N', b'M', b'c', 0x00, // tag sets = [[NM:c]]
        ];

        let map = read_preservation_map(&mut &src[..])?;

        assert!(!map.records_have_names());
        assert!(map.alignment_starts_are_deltas());
        assert!(map.external_reference_sequence_is_required());
        assert_eq!(map.substitution_matrix(), &SubstitutionMatrix::default());
        assert_eq!(
            map.tag_sets(),
            &vec![vec![tag_sets::Key::new(Tag::new(b'N', b'M'), Type::Int8)]]
        );

        Ok(())
    }

    #[test]
    fn test_read_preservation_map_with_empty_tag_set() -> Result<()> {
        let src = [
            0x04, // map length
            0x01, // entry count = 1
            b'T', b'D', 0x00, // tag sets = []
        ];

        let map = read_preservation_map(&mut &src[..])?;
        assert!(map.tag_sets().is_empty());

        Ok(())
    }

    #[test]
    fn test_read_preservation_map_with_invalid_key() {
        let src = [
            0x03, // map length
            0x01, // entry count = 1
            b'Z', b'Z', 0x00,
        ];

        assert!(matches!(
            read_preservation_map(&mut &src[..]),
            Err(Error::Malformed(_))
        ));
    }
}
