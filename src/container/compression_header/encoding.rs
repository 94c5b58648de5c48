//! Per-data-series encodings.

pub(crate) mod codec;
pub(crate) mod kind;

pub use self::{
    codec::{Byte, ByteArray, Integer},
    kind::Kind,
};

use std::io;

use crate::io::{
    reader::container::slice::records::ExternalDataReaders,
    writer::container::slice::records::ExternalDataWriters,
    BitReader, BitWriter,
};

/// A codec that reads values of its type from the core bitstream and/or
/// external block streams.
pub trait Decode<'de> {
    /// The type of the decoded values.
    type Value;

    fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<Self::Value>;
}

/// A codec that writes values of its type to the core bitstream and/or
/// external block streams.
pub trait Encode<'en> {
    /// The type of the encoded values.
    type Value;

    fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: Self::Value,
    ) -> io::Result<()>;
}

/// An encoding wraps a codec for one logical value type (byte, integer, or
/// byte array).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Encoding<C>(C);

impl<C> Encoding<C> {
    /// Creates an encoding.
    pub fn new(codec: C) -> Self {
        Self(codec)
    }

    /// Returns the wrapped codec.
    pub fn get(&self) -> &C {
        &self.0
    }
}

impl<'de, C> Encoding<C>
where
    C: Decode<'de>,
{
    pub fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<C::Value> {
        self.0.decode(core_data_reader, external_data_readers)
    }
}

impl<'en, C> Encoding<C>
where
    C: Encode<'en>,
{
    pub fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: C::Value,
    ) -> io::Result<()> {
        self.0.encode(core_data_writer, external_data_writers, value)
    }
}

pub(crate) fn missing_external_block_error(block_content_id: i32) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("missing external block: {block_content_id}"),
    )
}

pub(crate) fn null_codec_error() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        "NULL encoding invoked for a data series that carries data",
    )
}
