pub(crate) mod block;
pub(crate) mod compression_header;
pub(crate) mod header;
pub mod slice;

use std::{io::Read, iter};

use self::header::read_header;
pub(crate) use self::{block::read_block_as, compression_header::read_compression_header};
pub use self::slice::Slice;
use crate::{
    container::{CompressionHeader, Header},
    file_definition::Version,
    Result,
};

/// A lazily decoded CRAM container.
///
/// The container body is kept as raw bytes; the compression header and
/// slices decode on demand, which lets indexing-only callers skip record
/// decoding entirely.
#[derive(Default)]
pub struct Container {
    pub(crate) header: Header,
    pub(crate) src: Vec<u8>,
    pub(crate) version: Version,
}

impl Container {
    /// Returns the container header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decodes the compression header.
    pub fn compression_header(&self) -> Result<CompressionHeader> {
        let end = self
            .header
            .landmarks
            .first()
            .copied()
            .unwrap_or(self.src.len());

        let src = self
            .src
            .get(..end)
            .ok_or_else(|| crate::Error::malformed("landmark out of bounds"))?;

        read_compression_header(&mut &src[..], self.version)
    }

    /// Returns an iterator decoding the container's slices.
    ///
    /// Slice boundaries come from differencing consecutive landmarks; the
    /// last slice runs to the end of the container body.
    pub fn slices(&self) -> impl Iterator<Item = Result<Slice>> + '_ {
        let landmarks = &self.header.landmarks;
        let version = self.version;
        let mut i = 0;

        iter::from_fn(move || {
            if i >= landmarks.len() {
                return None;
            }

            let start = landmarks[i];
            let end = landmarks.get(i + 1).copied().unwrap_or(self.src.len());
            let landmark_index = i;
            i += 1;

            let result = self
                .src
                .get(start..end)
                .ok_or_else(|| crate::Error::malformed("landmark out of bounds"))
                .and_then(|src| {
                    slice::read_slice(
                        &mut &src[..],
                        version,
                        landmark_index,
                        start as u64,
                        (end - start) as u64,
                    )
                });

            Some(result)
        })
    }
}

/// Reads the next container into `container`, returning the body length or
/// 0 at end of stream (the EOF container or a clean end of input).
pub fn read_container<R>(
    reader: &mut R,
    container: &mut Container,
    version: Version,
) -> Result<usize>
where
    R: Read,
{
    container.version = version;

    match read_header(reader, &mut container.header, version)? {
        0 => Ok(0),
        len => {
            container.src.resize(len, 0);
            reader.read_exact(&mut container.src).map_err(crate::Error::from)?;
            Ok(len)
        }
    }
}
