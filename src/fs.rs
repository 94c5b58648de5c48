//! Whole-file operations.

use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use crate::{
    container::ReferenceSequenceContext,
    crai,
    io::reader::Container,
    io::Reader,
    Result,
};

/// Builds a CRAI index for the CRAM file at `src`.
///
/// Containers are walked by byte offset; multi-reference slices decode
/// their records (without a reference) to expand into per-reference
/// entries. Entries are returned in the CRAI total order.
pub fn index<P>(src: P) -> Result<crai::Index>
where
    P: AsRef<Path>,
{
    let file = File::open(src).map(BufReader::new)?;
    index_from_reader(file)
}

/// Builds a CRAI index from a seekable CRAM stream.
pub fn index_from_reader<R>(inner: R) -> Result<crai::Index>
where
    R: Read + Seek,
{
    let mut reader = Reader::new(inner);

    reader.read_file_definition()?;
    reader.read_file_header()?;

    let mut index = crai::Index::new();
    let mut container = Container::default();

    loop {
        let container_offset = reader.get_mut().seek(SeekFrom::Current(0))?;

        if reader.read_container(&mut container)? == 0 {
            break;
        }

        push_container_entries(&container, container_offset, &mut index)?;
    }

    index.sort();

    Ok(index)
}

fn push_container_entries(
    container: &Container,
    container_offset: u64,
    index: &mut crai::Index,
) -> Result<()> {
    let container_context = container.header().reference_sequence_context();

    // the compression header is only needed when a multi-reference slice
    // must decode its records
    let mut compression_header = None;

    for result in container.slices() {
        let slice = result?;
        let slice_context = slice.header().reference_sequence_context();

        let records = if matches!(slice_context, ReferenceSequenceContext::Many) {
            if compression_header.is_none() {
                compression_header = Some(container.compression_header()?);
            }

            let compression_header = compression_header.as_ref().expect("just initialized");
            slice.decode_records(container_context, compression_header)?
        } else {
            Vec::new()
        };

        let coordinate_sorted = match &compression_header {
            Some(header) => header.preservation_map().alignment_starts_are_deltas(),
            None => true,
        };

        let entries = crai::entries_for_slice(
            slice_context,
            &records,
            container_offset,
            slice.indexing(),
            coordinate_sorted,
        )?;

        index.extend(entries);
    }

    Ok(())
}
