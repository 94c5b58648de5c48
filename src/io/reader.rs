//! The CRAM reader.

mod builder;
pub(crate) mod collections;
pub mod container;
mod header;
pub(crate) mod num;

pub use self::{builder::Builder, container::Container};

use std::{collections::VecDeque, io::Read, sync::Arc};

use self::{
    container::read_container,
    header::{read_file_definition, read_file_header},
};
use crate::{
    file_definition::Version, FileDefinition, Record, ReferenceSource, Result,
    ValidationStringency,
};

/// A CRAM reader.
///
/// The reader steps through a stream container by container. Reading ends at
/// the EOF container, which [`Self::read_container`] reports as an empty
/// read.
pub struct Reader<R> {
    inner: R,
    reference_source: Option<Arc<dyn ReferenceSource>>,
    validation_stringency: ValidationStringency,
    version: Version,
}

impl<R> Reader<R>
where
    R: Read,
{
    /// Creates a reader with default settings: no reference source and
    /// strict validation.
    pub fn new(inner: R) -> Self {
        Builder::default().build_from_reader(inner)
    }

    pub(crate) fn with(
        inner: R,
        reference_source: Option<Arc<dyn ReferenceSource>>,
        validation_stringency: ValidationStringency,
    ) -> Self {
        Self {
            inner,
            reference_source,
            validation_stringency,
            version: Version::default(),
        }
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Reads and validates the file definition.
    ///
    /// This must be the first read of a stream.
    pub fn read_file_definition(&mut self) -> Result<FileDefinition> {
        let file_definition = read_file_definition(&mut self.inner)?;
        self.version = file_definition.version();
        Ok(file_definition)
    }

    /// Reads the header container, returning the raw SAM header text.
    pub fn read_file_header(&mut self) -> Result<Vec<u8>> {
        read_file_header(&mut self.inner, self.version)
    }

    /// Reads the next container into `container`.
    ///
    /// Returns the number of payload bytes read, or 0 at EOF.
    pub fn read_container(&mut self, container: &mut Container) -> Result<usize> {
        read_container(&mut self.inner, container, self.version)
    }

    /// Returns an iterator over the records of the remaining containers.
    ///
    /// The stream must be positioned past the header container.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            container: Container::default(),
            records: VecDeque::new(),
            eof: false,
        }
    }

    pub(crate) fn decode_container_records(
        &self,
        container: &Container,
    ) -> Result<Vec<Record>> {
        let compression_header = container.compression_header()?;
        let mut records = Vec::new();

        for result in container.slices() {
            let slice = result?;

            let slice_records = slice.records(
                container.header().reference_sequence_context(),
                &compression_header,
                self.reference_source.as_deref(),
                self.validation_stringency,
            )?;

            records.extend(slice_records);
        }

        Ok(records)
    }
}

/// An iterator over all records of a reader.
pub struct Records<'a, R> {
    reader: &'a mut Reader<R>,
    container: Container,
    records: VecDeque<Record>,
    eof: bool,
}

impl<R> Iterator for Records<'_, R>
where
    R: Read,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.records.pop_front() {
                return Some(Ok(record));
            }

            if self.eof {
                return None;
            }

            match self.reader.read_container(&mut self.container) {
                Ok(0) => {
                    self.eof = true;
                    return None;
                }
                Ok(_) => match self.reader.decode_container_records(&self.container) {
                    Ok(records) => self.records.extend(records),
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
