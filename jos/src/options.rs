/// Advisory guards the decoder applies against malformed or adversarial
/// input. Neither field changes wire semantics; both default to values
/// that impose no behavioral change versus the bare grammar.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Maximum recursive-descent nesting (class descriptor super chains,
    /// nested objects/arrays referencing each other through fields).
    /// Exceeding it yields `DecodeError::DepthExceeded`.
    pub max_depth: usize,
    /// Ceiling on a single block-data or array length. Exceeding it yields
    /// `DecodeError::BadBlockSize`.
    pub max_block_len: u32,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { max_depth: 512, max_block_len: u32::MAX }
    }
}
