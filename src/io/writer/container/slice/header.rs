use std::io::Write;

use crate::{
    container::{slice::Header, ReferenceSequenceContext},
    io::writer::num::{write_itf8, write_ltf8},
    Error, Result,
};

const UNMAPPED: i32 = -1;
const MULTI_REFERENCE: i32 = -2;
const MISSING_EMBEDDED_REFERENCE: i32 = -1;

pub(crate) fn write_header<W>(writer: &mut W, header: &Header) -> Result<()>
where
    W: Write,
{
    let (reference_sequence_id, alignment_start, alignment_span) =
        match header.reference_sequence_context() {
            ReferenceSequenceContext::Some(context) => (
                as_itf8(context.reference_sequence_id())?,
                as_itf8(usize::from(context.alignment_start()))?,
                as_itf8(context.alignment_span())?,
            ),
            ReferenceSequenceContext::None => (UNMAPPED, 0, 0),
            ReferenceSequenceContext::Many => (MULTI_REFERENCE, 0, 0),
        };

    write_itf8(writer, reference_sequence_id)?;
    write_itf8(writer, alignment_start)?;
    write_itf8(writer, alignment_span)?;

    write_itf8(writer, as_itf8(header.record_count())?)?;
    write_ltf8(
        writer,
        i64::try_from(header.record_counter())
            .map_err(|_| Error::invalid_state("record counter overflow"))?,
    )?;
    write_itf8(writer, as_itf8(header.block_count())?)?;

    write_itf8(writer, as_itf8(header.block_content_ids().len())?)?;

    for &content_id in header.block_content_ids() {
        write_itf8(writer, content_id)?;
    }

    write_itf8(
        writer,
        header
            .embedded_reference_bases_block_content_id()
            .unwrap_or(MISSING_EMBEDDED_REFERENCE),
    )?;

    let md5 = header.reference_md5().unwrap_or([0; 16]);
    writer.write_all(&md5)?;

    if !header.optional_tags.is_empty() {
        writer.write_all(&header.optional_tags)?;
    }

    Ok(())
}

fn as_itf8(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| Error::invalid_state("value exceeds ITF8 range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn test_write_header() -> Result<()> {
        let header = Header {
            reference_sequence_context: ReferenceSequenceContext::some(
                2,
                Position::new(3).unwrap(),
                Position::new(7).unwrap(),
            ),
            record_count: 8,
            record_counter: 13,
            block_count: 1,
            block_content_ids: vec![21],
            embedded_reference_bases_block_content_id: None,
            reference_md5: Some([
                0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f,
                0xf2, 0x7e, 0xf7,
            ]),
            optional_tags: Vec::new(),
        };

        let mut buf = Vec::new();
        write_header(&mut buf, &header)?;

        let expected = [
            0x02, // reference sequence ID = 2
            0x03, // alignment start = 3
            0x05, // alignment span = 5
            0x08, // number of records = 8
            0x0d, // record counter = 13
            0x01, // number of blocks = 1
            0x01, // block content ID count = 1
            0x15, // block content IDs[0] = 21
            0xff, 0xff, 0xff, 0xff, 0x0f, // embedded reference block = none
            0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f,
            0xf2, 0x7e, 0xf7, // reference MD5
        ];

        assert_eq!(buf, expected);

        Ok(())
    }
}
