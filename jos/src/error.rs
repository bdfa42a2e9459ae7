//! The decoder's error taxonomy. Hand-rolled with a manual `Display`/`From`
//! impl, in the same style the teacher codebase uses for its own read
//! errors, rather than reaching for a derive macro.

use std::fmt::{Display, Formatter};

/// The grammar production active when a [`DecodeError::BadTypeCode`] or
/// [`DecodeError::DepthExceeded`] was raised, for diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DecodeContext {
    TopLevelContent,
    ClassDesc,
    NewString,
    FieldValueArray,
    FieldValueObject,
}

impl Display for DecodeContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TopLevelContent => "top-level content",
            Self::ClassDesc => "class descriptor",
            Self::NewString => "newString production",
            Self::FieldValueArray => "array-typed field value",
            Self::FieldValueObject => "object-typed field value",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum DecodeError {
    /// Byte-source exhausted mid-production.
    UnexpectedEof,
    /// Wrong magic or unsupported version in the stream header.
    BadHeader { magic: [u8; 2], version: u16 },
    /// A tag byte not in the allowed set for the current production.
    BadTypeCode { context: DecodeContext, code: u8 },
    /// A `TC_REFERENCE` pointing outside the allocated handle range.
    BadHandle(u32),
    /// A class descriptor flag combination outside the permitted set.
    BadFlags(u8),
    /// An `Externalizable` descriptor without `SC_BLOCKDATA` (protocol
    /// version 1 external contents, which this decoder does not support).
    UnsupportedExternalV1,
    /// `TC_PROXYCLASSDESC`, out of scope for this decoder.
    UnsupportedProxyClassDesc,
    /// A negative or unreasonably large block-data length.
    BadBlockSize(i64),
    /// An unrecognized field type code.
    BadFieldType(u8),
    /// Recursive descent exceeded `DecoderOptions::max_depth`.
    DepthExceeded { max_depth: usize },
    /// The byte source itself reported an I/O failure distinct from plain
    /// exhaustion (e.g. a backing file disappearing under an `MmapSource`).
    Io(std::io::Error),
}

impl From<std::io::Error> for DecodeError {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::Io(value),
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of stream"),
            Self::BadHeader { magic, version } => {
                write!(f, "bad stream header: magic {magic:02X?}, version {version}")
            }
            Self::BadTypeCode { context, code } => {
                write!(f, "unexpected type code 0x{code:02X} in {context}")
            }
            Self::BadHandle(handle) => write!(f, "reference to unallocated handle 0x{handle:06X}"),
            Self::BadFlags(flags) => write!(f, "invalid class descriptor flags 0x{flags:02X}"),
            Self::UnsupportedExternalV1 => {
                write!(f, "externalizable class without SC_BLOCKDATA (protocol version 1) is unsupported")
            }
            Self::UnsupportedProxyClassDesc => write!(f, "proxy class descriptors are unsupported"),
            Self::BadBlockSize(size) => write!(f, "invalid block data size {size}"),
            Self::BadFieldType(code) => write!(f, "unknown field type code 0x{code:02X}"),
            Self::DepthExceeded { max_depth } => {
                write!(f, "recursion exceeded configured maximum depth ({max_depth})")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_eof_maps_to_unexpected_eof() {
        let err: DecodeError = std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into();
        assert!(matches!(err, DecodeError::UnexpectedEof));
    }

    #[test]
    fn other_io_errors_are_preserved() {
        let err: DecodeError = std::io::Error::from(std::io::ErrorKind::InvalidInput).into();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
