/// A block content type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    /// The SAM header (`FILE_HEADER`).
    FileHeader,
    /// A compression header (`COMPRESSION_HEADER`).
    CompressionHeader,
    /// A slice header (`MAPPED_SLICE_HEADER`).
    SliceHeader,
    /// Reserved.
    Reserved,
    /// An external data block (`EXTERNAL_DATA`).
    ExternalData,
    /// The core data block (`CORE_DATA`).
    CoreData,
}
