//! CRAM I/O: readers, writers, and the core bitstream.

mod bit_reader;
mod bit_writer;
pub mod reader;
pub mod writer;

pub(crate) use self::{bit_reader::BitReader, bit_writer::BitWriter};
pub use self::{reader::Reader, writer::Writer};
