/// Default maximum nesting depth.
///
/// Recursive values and types up to this depth are guaranteed to encode and
/// decode; deeper input fails deterministically with `DepthLimitExceeded`.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Default maximum container length for arrays and dictionaries.
///
/// This is a safety limit; adjust explicitly for your deployment.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 1 << 16;

/// Decode-time resource limits.
///
/// Limits are enforced deterministically before any length-prefixed
/// allocation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting depth of values and types combined.
    pub max_depth: usize,
    /// Maximum total count of container items across the entire message.
    pub max_total_items: usize,
    /// Maximum array length in items (a dictionary of `n` pairs is a flat
    /// array of `2 * n` items).
    pub max_array_len: usize,
    /// Maximum byte-string length (also applies to bignum magnitudes and
    /// type-definition ids).
    pub max_bytes_len: usize,
    /// Maximum text-string length in UTF-8 bytes.
    pub max_text_len: usize,
}

impl DecodeLimits {
    /// Construct conservative limits derived from the input size.
    ///
    /// A single CBOR item of `n` bytes can never contain more than `n`
    /// container items or a string longer than `n` bytes, so these bounds
    /// only reject inputs that could not be well-formed anyway. Container
    /// lengths are additionally capped by [`DEFAULT_MAX_CONTAINER_LEN`].
    #[must_use]
    pub fn for_bytes(input_len: usize) -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_total_items: input_len,
            max_array_len: input_len.min(DEFAULT_MAX_CONTAINER_LEN),
            max_bytes_len: input_len,
            max_text_len: input_len,
        }
    }
}
