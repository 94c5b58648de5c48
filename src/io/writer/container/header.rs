use std::io::Write;

use flate2::CrcWriter;

use crate::{
    container::{Header, ReferenceSequenceContext},
    io::writer::num::{write_i32_le, write_itf8, write_ltf8, write_u32_le},
    Error, Result,
};

const UNMAPPED: i32 = -1;
const MULTI_REFERENCE: i32 = -2;

/// Writes a container header, including its trailing CRC32.
pub(crate) fn write_header<W>(writer: &mut W, header: &Header, len: usize) -> Result<()>
where
    W: Write,
{
    let mut crc_writer = CrcWriter::new(writer);

    write_header_raw(
        &mut crc_writer,
        len,
        header.reference_sequence_context(),
        header.record_count(),
        header.record_counter(),
        header.base_count(),
        header.block_count(),
        header.landmarks(),
    )?;

    let crc32 = crc_writer.crc().sum();
    write_u32_le(crc_writer.get_mut(), crc32)?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn write_header_raw<W>(
    writer: &mut W,
    len: usize,
    reference_sequence_context: ReferenceSequenceContext,
    record_count: usize,
    record_counter: u64,
    base_count: u64,
    block_count: usize,
    landmarks: &[usize],
) -> Result<()>
where
    W: Write,
{
    let length = i32::try_from(len).map_err(|_| Error::invalid_state("container too large"))?;
    write_i32_le(writer, length)?;

    write_reference_sequence_context(writer, reference_sequence_context)?;

    write_itf8(writer, as_itf8(record_count)?)?;
    write_ltf8(
        writer,
        i64::try_from(record_counter).map_err(|_| Error::invalid_state("record counter overflow"))?,
    )?;
    write_ltf8(
        writer,
        i64::try_from(base_count).map_err(|_| Error::invalid_state("base count overflow"))?,
    )?;
    write_itf8(writer, as_itf8(block_count)?)?;

    write_itf8(writer, as_itf8(landmarks.len())?)?;

    for &landmark in landmarks {
        write_itf8(writer, as_itf8(landmark)?)?;
    }

    Ok(())
}

fn write_reference_sequence_context<W>(
    writer: &mut W,
    reference_sequence_context: ReferenceSequenceContext,
) -> Result<()>
where
    W: Write,
{
    let (reference_sequence_id, alignment_start, alignment_span) = match reference_sequence_context
    {
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

    Ok(())
}

fn as_itf8(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| Error::invalid_state("value exceeds ITF8 range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io::reader::container::header::read_header, Position};

    #[test]
    fn test_round_trip() -> Result<()> {
        let header = Header {
            reference_sequence_context: ReferenceSequenceContext::some(
                2,
                Position::new(3).unwrap(),
                Position::new(7).unwrap(),
            ),
            record_count: 8,
            record_counter: 13,
            base_count: 21,
            block_count: 34,
            landmarks: vec![55, 89],
        };

        let mut buf = Vec::new();
        write_header(&mut buf, &header, 144)?;

        let mut actual = Header::default();
        let len = read_header(
            &mut &buf[..],
            &mut actual,
            crate::file_definition::Version::V3_0,
        )?;

        assert_eq!(len, 144);
        assert_eq!(actual, header);

        Ok(())
    }
}
