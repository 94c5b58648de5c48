//! CRAI serialization: gzip-compressed tab-separated text, one line per
//! entry.

use std::io::{BufRead, BufReader, Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use super::{Entry, Index};
use crate::{Error, Position, Result};

const UNMAPPED: i64 = -1;
const MULTI_REFERENCE: i64 = -2;

/// Writes a CRAI index.
pub fn write_index<W>(writer: &mut W, index: &Index) -> Result<()>
where
    W: Write,
{
    let mut encoder = GzEncoder::new(writer, Compression::default());

    for entry in index {
        let reference_sequence_id = entry
            .reference_sequence_id()
            .map(|id| id as i64)
            .unwrap_or(UNMAPPED);

        let alignment_start = entry.alignment_start().map(usize::from).unwrap_or(0);

        writeln!(
            encoder,
            "{}\t{}\t{}\t{}\t{}\t{}",
            reference_sequence_id,
            alignment_start,
            entry.alignment_span(),
            entry.container_offset(),
            entry.slice_offset(),
            entry.slice_size(),
        )?;
    }

    encoder.finish()?;

    Ok(())
}

/// Reads a CRAI index.
pub fn read_index<R>(reader: R) -> Result<Index>
where
    R: Read,
{
    let reader = BufReader::new(GzDecoder::new(reader));

    let mut index = Index::new();

    for result in reader.lines() {
        let line = result?;

        if line.is_empty() {
            continue;
        }

        index.push(parse_entry(&line)?);
    }

    Ok(index)
}

fn parse_entry(line: &str) -> Result<Entry> {
    let mut fields = line.split('\t');

    let mut next_field = || {
        fields
            .next()
            .ok_or_else(|| Error::malformed("truncated CRAI entry"))
    };

    let reference_sequence_id: i64 = parse_int(next_field()?)?;
    let alignment_start: usize = parse_int(next_field()?)?;
    let alignment_span: usize = parse_int(next_field()?)?;
    let container_offset: u64 = parse_int(next_field()?)?;
    let slice_offset: u64 = parse_int(next_field()?)?;
    let slice_size: u64 = parse_int(next_field()?)?;

    match reference_sequence_id {
        UNMAPPED => Ok(Entry::unplaced(container_offset, slice_offset, slice_size)),
        MULTI_REFERENCE => Err(Error::invalid_state(
            "CRAI entries cannot carry the multi-reference sentinel",
        )),
        n if n >= 0 => Ok(Entry::new(
            n as usize,
            Position::new(alignment_start),
            alignment_span,
            container_offset,
            slice_offset,
            slice_size,
        )),
        n => Err(Error::malformed(format!(
            "invalid CRAI reference sequence ID: {n}"
        ))),
    }
}

fn parse_int<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse()
        .map_err(|_| Error::malformed(format!("invalid CRAI field: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> Result<()> {
        let index: Index = vec![
            Entry::new(0, Position::new(1), 100, 26, 55, 320),
            Entry::unplaced(500, 55, 120),
        ];

        let mut buf = Vec::new();
        write_index(&mut buf, &index)?;

        let decoded = read_index(&buf[..])?;
        assert_eq!(decoded, index);

        Ok(())
    }

    #[test]
    fn test_read_index_rejects_multi_reference_entries() -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut buf, Compression::default());
            writeln!(encoder, "-2\t0\t0\t26\t55\t320")?;
            encoder.finish()?;
        }

        assert!(matches!(
            read_index(&buf[..]),
            Err(Error::InvalidState(_))
        ));

        Ok(())
    }
}
