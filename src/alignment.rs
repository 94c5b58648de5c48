//! The logical field set of an alignment record.
//!
//! This is the boundary interface the codec consumes and produces: SAM-style
//! flags, CIGAR, mapping quality, and tag data, without any text- or
//! BAM-level parsing. [`RecordBuf`] is the concrete record used on both
//! sides of the conversion to the internal CRAM record.

pub mod cigar;
pub mod data;
mod flags;
mod mapping_quality;
pub mod record;

pub use self::{
    cigar::Cigar, flags::Flags, mapping_quality::MappingQuality, record::RecordBuf,
};
