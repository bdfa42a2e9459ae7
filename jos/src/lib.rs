//! A decoder for the Java Object Serialization Stream Protocol, the byte
//! format produced by `java.io.ObjectOutputStream` and consumed by
//! `java.io.ObjectInputStream`.
//!
//! The crate reconstructs a faithful in-memory tree of the wire format:
//! class descriptors, primitive and reference fields, the string intern
//! table, nested objects, enums, arrays, and the raw "block data" that
//! custom `writeObject`/`writeExternal` methods interleave with structured
//! fields. It does not attempt to instantiate language-native objects for
//! specific Java classes, nor does it implement the write half of the
//! protocol; those are callers' concerns.

pub mod byte_source;
pub mod decoder;
pub mod error;
pub mod handle;
pub mod model;
pub mod options;
mod tags;

pub use byte_source::{ByteSource, SliceSource};
#[cfg(feature = "mmap")]
pub use byte_source::MmapSource;
pub use decoder::ObjectInputStream;
pub use error::{DecodeContext, DecodeError};
pub use handle::{Handle, HandleTable, FIRST_HANDLE};
pub use model::{
    Array, BlockData, ClassData, ClassDescFlags, ClassDescInfo, ClassDescriptor, Content,
    EnumValue, FieldDesc, FieldType, FieldValue, JavaString, Object, StringWidth,
};
pub use options::DecoderOptions;
