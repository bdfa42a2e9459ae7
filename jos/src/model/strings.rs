use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

/// Which length prefix produced a [`JavaString`]: `TC_STRING` (16-bit) or
/// `TC_LONGSTRING` (64-bit). Kept alongside the payload purely for fidelity;
/// re-encoding is not a goal of this crate, but callers inspecting a decoded
/// tree may still want to know which wire shape they saw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StringWidth {
    Short,
    Long,
}

/// A decoded Java string. The payload is kept as raw bytes: the protocol's
/// modified-UTF-8 is not guaranteed to be strict UTF-8, and the spec
/// requires byte-exact preservation. Use [`JavaString::to_string_lossy`]
/// when a caller wants best-effort text rather than bytes.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct JavaString {
    pub bytes: Vec<u8>,
    pub width: StringWidth,
}

impl JavaString {
    pub fn new(bytes: Vec<u8>, width: StringWidth) -> Self {
        Self { bytes, width }
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl Debug for JavaString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaString")
            .field("width", &self.width)
            .field("text", &self.to_string_lossy())
            .finish()
    }
}

impl std::fmt::Display for JavaString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.to_string_lossy(), f)
    }
}
