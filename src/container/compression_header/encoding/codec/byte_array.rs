use std::io;

use crate::{
    container::{
        block,
        compression_header::{
            encoding::{missing_external_block_error, null_codec_error, Decode, Encode},
            Encoding,
        },
    },
    io::{
        reader::container::slice::records::ExternalDataReaders,
        writer::container::slice::records::ExternalDataWriters,
        BitReader, BitWriter,
    },
};

use super::{Byte, Integer};

/// A codec for byte array values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ByteArray {
    /// No data.
    Null,
    /// A length encoded by one sub-encoding, followed by that many bytes
    /// encoded by another.
    ByteArrayLength {
        /// The length sub-encoding.
        len_encoding: Encoding<Integer>,
        /// The value sub-encoding.
        value_encoding: Encoding<Byte>,
    },
    /// Bytes from an external block, terminated by a sentinel.
    ByteArrayStop {
        /// The terminator, e.g. `\t`.
        stop_byte: u8,
        /// The content id of the backing block.
        block_content_id: block::ContentId,
    },
}

impl<'de> Decode<'de> for ByteArray {
    type Value = Vec<u8>;

    fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<Self::Value> {
        match self {
            Self::Null => Err(null_codec_error()),
            Self::ByteArrayLength {
                len_encoding,
                value_encoding,
            } => {
                let len = len_encoding.decode(core_data_reader, external_data_readers)?;

                let len =
                    usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                let mut buf = Vec::with_capacity(len);

                for _ in 0..len {
                    let b = value_encoding.decode(core_data_reader, external_data_readers)?;
                    buf.push(b);
                }

                Ok(buf)
            }
            Self::ByteArrayStop {
                stop_byte,
                block_content_id,
            } => {
                let src = external_data_readers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block_error(*block_content_id))?;

                let len = src
                    .iter()
                    .position(|&b| b == *stop_byte)
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            "missing byte array terminator",
                        )
                    })?;

                let (buf, rest) = src.split_at(len);
                // skip the terminator
                *src = &rest[1..];

                Ok(buf.to_vec())
            }
        }
    }
}

impl<'en> Encode<'en> for ByteArray {
    type Value = &'en [u8];

    fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: Self::Value,
    ) -> io::Result<()> {
        match self {
            Self::Null => Err(null_codec_error()),
            Self::ByteArrayLength {
                len_encoding,
                value_encoding,
            } => {
                let len = i32::try_from(value.len())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

                len_encoding.encode(core_data_writer, external_data_writers, len)?;

                for &b in value {
                    value_encoding.encode(core_data_writer, external_data_writers, b)?;
                }

                Ok(())
            }
            Self::ByteArrayStop {
                stop_byte,
                block_content_id,
            } => {
                let dst = external_data_writers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block_error(*block_content_id))?;

                if value.contains(stop_byte) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "byte array contains its own terminator",
                    ));
                }

                dst.extend_from_slice(value);
                dst.push(*stop_byte);

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_array_stop_round_trip() -> io::Result<()> {
        let encoding = Encoding::new(ByteArray::ByteArrayStop {
            stop_byte: 0x00,
            block_content_id: 1,
        });

        let mut core_data_writer = BitWriter::default();
        let mut external_data_writers: ExternalDataWriters =
            [(1, Vec::new())].into_iter().collect();

        encoding.encode(&mut core_data_writer, &mut external_data_writers, b"ACGT")?;
        encoding.encode(&mut core_data_writer, &mut external_data_writers, b"TTGA")?;

        let buf = &external_data_writers[&1];
        assert_eq!(buf, b"ACGT\0TTGA\0");

        let core_data = [];
        let mut core_data_reader = BitReader::new(&core_data[..]);
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(1, &buf[..]);

        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b"ACGT"
        );
        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b"TTGA"
        );

        Ok(())
    }

    #[test]
    fn test_byte_array_stop_with_missing_terminator() {
        let encoding = Encoding::new(ByteArray::ByteArrayStop {
            stop_byte: 0x00,
            block_content_id: 1,
        });

        let external_data = b"ACGT";
        let core_data = [];
        let mut core_data_reader = BitReader::new(&core_data[..]);
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(1, &external_data[..]);

        assert!(encoding
            .decode(&mut core_data_reader, &mut external_data_readers)
            .is_err());
    }

    #[test]
    fn test_byte_array_length_round_trip() -> io::Result<()> {
        let encoding = Encoding::new(ByteArray::ByteArrayLength {
            len_encoding: Encoding::new(Integer::External {
                block_content_id: 13,
            }),
            value_encoding: Encoding::new(Byte::External {
                block_content_id: 21,
            }),
        });

        let mut core_data_writer = BitWriter::default();
        let mut external_data_writers: ExternalDataWriters =
            [(13, Vec::new()), (21, Vec::new())].into_iter().collect();

        encoding.encode(&mut core_data_writer, &mut external_data_writers, b"ACGT")?;

        let len_buf = external_data_writers[&13].clone();
        let value_buf = external_data_writers[&21].clone();

        assert_eq!(len_buf, [0x04]);
        assert_eq!(value_buf, b"ACGT");

        let core_data = [];
        let mut core_data_reader = BitReader::new(&core_data[..]);
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(13, &len_buf[..]);
        external_data_readers.insert(21, &value_buf[..]);

        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b"ACGT"
        );

        Ok(())
    }
}
