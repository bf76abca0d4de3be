use core::fmt;

/// The failure classification of a [`CcfError`].
///
/// Every [`ErrorCode`] maps to exactly one kind. The kinds are the stable,
/// coarse-grained taxonomy callers should branch on; codes carry the precise
/// reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unknown tag, truncated stream, or wrong CBOR item for the position.
    Malformed,
    /// Numeric value outside its declared width.
    OutOfRange,
    /// Text payload is not valid UTF-8, or a character is not a single
    /// grapheme cluster.
    InvalidUtf8,
    /// Cadence type ID is empty, unknown, or has a malformed location.
    InvalidTypeId,
    /// A type reference id is not present in the active table.
    UnknownTypeRef,
    /// Dictionary keys, the type-definition table, or a restriction list is
    /// not in canonical order.
    NonCanonicalOrder,
    /// Two equal keys or ids where uniqueness is required.
    DuplicateKey,
    /// Composite field count differs from the declared field count.
    FieldCountMismatch,
    /// A runtime value does not satisfy its declared static type.
    WrongStaticType,
    /// An external type reference appeared and no resolver was provided.
    MissingTypeResolver,
    /// An internal invariant was violated. This is a bug in the codec, not
    /// in the input.
    Internal,
}

/// A structured error code identifying the reason encoding or decoding
/// was rejected.
///
/// This enum is intentionally stable and string-free to support `no_std`
/// and to remain hot-path friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Unexpected end-of-input while decoding.
    UnexpectedEof,
    /// Input contains trailing bytes after the single CCF message.
    TrailingBytes,
    /// Arithmetic overflow while computing a length or offset.
    LengthOverflow,
    /// Memory allocation failed while decoding into owned structures.
    AllocationFailed,
    /// Non-shortest integer or length encoding was used.
    NonMinimalEncoding,
    /// Reserved additional-info value (28..30) was used.
    ReservedAdditionalInfo,
    /// Indefinite-length encoding was used.
    IndefiniteLengthForbidden,
    /// A CBOR tag number outside the fixed CCF registry.
    UnknownTag,
    /// A simple type id outside the fixed CCF registry.
    UnknownSimpleTypeId,
    /// Wrong CBOR major type or simple value for the expected position.
    UnexpectedItem,
    /// Bignum magnitude has a leading zero byte.
    BignumLeadingZero,
    /// Address byte string is not exactly 8 bytes.
    InvalidAddressLength,
    /// Path domain code outside storage/private/public.
    InvalidPathDomain,

    /// Nesting depth limit exceeded.
    DepthLimitExceeded,
    /// Total items limit exceeded.
    TotalItemsLimitExceeded,
    /// Array length exceeds decode limits.
    ArrayLenLimitExceeded,
    /// Byte string length exceeds decode limits.
    BytesLenLimitExceeded,
    /// Text string length exceeds decode limits.
    TextLenLimitExceeded,

    /// Integer outside the declared fixed width.
    IntegerOutOfRange,
    /// Bignum magnitude outside the declared range.
    MagnitudeOutOfRange,
    /// Negative bignum where an unsigned type was expected.
    NegativeUnsigned,

    /// Text payload is not valid UTF-8.
    Utf8Invalid,
    /// Character payload is not a single grapheme cluster.
    NotSingleGrapheme,

    /// Cadence type ID does not name a known built-in type.
    InvalidBuiltinTypeId,
    /// Location-qualified cadence type ID is missing its qualified
    /// identifier.
    MissingQualifiedIdentifier,
    /// Address location in a cadence type ID is not valid hex.
    InvalidAddressLocation,

    /// `type-ref` id not present in the type-definition table.
    UnknownTypeRef,
    /// `type-value-ref` id not present in the local namespace.
    UnknownTypeValueRef,

    /// Dictionary keys are not in canonical order.
    DictKeyOrder,
    /// Type-definition table is not sorted by cadence type ID.
    TypeDefOrder,
    /// Restriction list is not sorted by cadence type ID.
    RestrictionOrder,

    /// Duplicate dictionary key.
    DuplicateDictKey,
    /// Duplicate id in the type-definition table.
    DuplicateTypeDefId,
    /// Duplicate restriction in a restricted type.
    DuplicateRestriction,

    /// Composite field count differs from the declared field count.
    FieldCountMismatch,
    /// Source composite carries a field name the declaration does not.
    UnknownFieldName,
    /// Source composite is missing a declared field.
    MissingFieldName,

    /// Value kind does not match its static type.
    TypeMismatch,
    /// Constant-sized array length differs from the declared size.
    ArrayLenMismatch,
    /// Path domain conflicts with the static path type.
    PathDomainMismatch,
    /// Container value carries no runtime type in an abstract position.
    UntypedContainer,

    /// External type reference with no resolver provided.
    MissingTypeResolver,

    /// Internal invariant violated.
    Internal,
}

impl ErrorCode {
    /// The failure kind this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::UnexpectedEof
            | Self::TrailingBytes
            | Self::LengthOverflow
            | Self::AllocationFailed
            | Self::NonMinimalEncoding
            | Self::ReservedAdditionalInfo
            | Self::IndefiniteLengthForbidden
            | Self::UnknownTag
            | Self::UnknownSimpleTypeId
            | Self::UnexpectedItem
            | Self::BignumLeadingZero
            | Self::InvalidAddressLength
            | Self::InvalidPathDomain
            | Self::DepthLimitExceeded
            | Self::TotalItemsLimitExceeded
            | Self::ArrayLenLimitExceeded
            | Self::BytesLenLimitExceeded
            | Self::TextLenLimitExceeded => ErrorKind::Malformed,

            Self::IntegerOutOfRange | Self::MagnitudeOutOfRange | Self::NegativeUnsigned => {
                ErrorKind::OutOfRange
            }

            Self::Utf8Invalid | Self::NotSingleGrapheme => ErrorKind::InvalidUtf8,

            Self::InvalidBuiltinTypeId
            | Self::MissingQualifiedIdentifier
            | Self::InvalidAddressLocation => ErrorKind::InvalidTypeId,

            Self::UnknownTypeRef | Self::UnknownTypeValueRef => ErrorKind::UnknownTypeRef,

            Self::DictKeyOrder | Self::TypeDefOrder | Self::RestrictionOrder => {
                ErrorKind::NonCanonicalOrder
            }

            Self::DuplicateDictKey | Self::DuplicateTypeDefId | Self::DuplicateRestriction => {
                ErrorKind::DuplicateKey
            }

            Self::FieldCountMismatch | Self::UnknownFieldName | Self::MissingFieldName => {
                ErrorKind::FieldCountMismatch
            }

            Self::TypeMismatch
            | Self::ArrayLenMismatch
            | Self::PathDomainMismatch
            | Self::UntypedContainer => ErrorKind::WrongStaticType,

            Self::MissingTypeResolver => ErrorKind::MissingTypeResolver,

            Self::Internal => ErrorKind::Internal,
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "unexpected end of input",
            Self::TrailingBytes => "trailing bytes after CCF message",
            Self::LengthOverflow => "length overflow",
            Self::AllocationFailed => "allocation failed",
            Self::NonMinimalEncoding => "non-minimal integer or length encoding",
            Self::ReservedAdditionalInfo => "reserved additional info value",
            Self::IndefiniteLengthForbidden => "indefinite length forbidden",
            Self::UnknownTag => "unknown CCF tag number",
            Self::UnknownSimpleTypeId => "unknown simple type id",
            Self::UnexpectedItem => "unexpected CBOR item for position",
            Self::BignumLeadingZero => "bignum magnitude has leading zero",
            Self::InvalidAddressLength => "address must be exactly 8 bytes",
            Self::InvalidPathDomain => "unknown path domain",

            Self::DepthLimitExceeded => "nesting depth limit exceeded",
            Self::TotalItemsLimitExceeded => "total items limit exceeded",
            Self::ArrayLenLimitExceeded => "array length exceeds decode limits",
            Self::BytesLenLimitExceeded => "byte string length exceeds decode limits",
            Self::TextLenLimitExceeded => "text string length exceeds decode limits",

            Self::IntegerOutOfRange => "integer outside declared range",
            Self::MagnitudeOutOfRange => "bignum magnitude outside declared range",
            Self::NegativeUnsigned => "negative value for unsigned type",

            Self::Utf8Invalid => "text must be valid UTF-8",
            Self::NotSingleGrapheme => "character must be a single grapheme cluster",

            Self::InvalidBuiltinTypeId => "invalid type ID for built-in",
            Self::MissingQualifiedIdentifier => "type ID is missing qualified identifier",
            Self::InvalidAddressLocation => "invalid address location in type ID",

            Self::UnknownTypeRef => "type reference not found in type definitions",
            Self::UnknownTypeValueRef => "type value reference not found",

            Self::DictKeyOrder => "dictionary keys not in canonical order",
            Self::TypeDefOrder => "type definitions not sorted by cadence type ID",
            Self::RestrictionOrder => "restrictions not sorted by cadence type ID",

            Self::DuplicateDictKey => "duplicate dictionary key",
            Self::DuplicateTypeDefId => "duplicate type definition id",
            Self::DuplicateRestriction => "duplicate restriction",

            Self::FieldCountMismatch => "composite field count mismatch",
            Self::UnknownFieldName => "composite field not declared by its type",
            Self::MissingFieldName => "composite is missing a declared field",

            Self::TypeMismatch => "value does not match its static type",
            Self::ArrayLenMismatch => "constant-sized array length mismatch",
            Self::PathDomainMismatch => "path domain conflicts with static type",
            Self::UntypedContainer => "container has no runtime type in abstract position",

            Self::MissingTypeResolver => "external type reference without resolver",

            Self::Internal => "internal invariant violated",
        }
    }
}

/// A CCF error with a stable code and the byte offset at which it was
/// detected.
///
/// Encode-side errors report the number of bytes emitted so far; decode-side
/// errors report the position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcfError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset where the error was detected.
    pub offset: usize,
}

impl CcfError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// The failure kind of this error.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for CcfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ccf error at {}: {}", self.offset, self.code.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CcfError {}
