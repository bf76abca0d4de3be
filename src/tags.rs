//! The CCF tag registry.
//!
//! CBOR tag numbers 128..=255 are reserved for CCF. This module is the
//! single source of truth for every tag number and simple type id in the
//! format; no other module may invent numbers. Unknown tags or simple type
//! ids in decode input are rejected.

/// Root message: `[[type-definition…], [inline-type, value]]`.
pub const TYPE_DEF_AND_VALUE: u64 = 129;
/// Root message without user-defined types, and the inline wrapper used at
/// abstract-typed positions: `[inline-type, value]`.
pub const TYPE_AND_VALUE: u64 = 130;

/// Inline type: a built-in simple type id.
pub const SIMPLE_TYPE: u64 = 136;
/// Inline type: reference into the type-definition table by id bytes.
pub const TYPE_REF: u64 = 137;
/// Inline type: optional over an inner inline type.
pub const OPTIONAL_TYPE: u64 = 138;
/// Inline type: variable-sized array over an element type.
pub const VARSIZED_ARRAY_TYPE: u64 = 139;
/// Inline type: constant-sized array, `[size, element]`.
pub const CONSTSIZED_ARRAY_TYPE: u64 = 140;
/// Inline type: dictionary, `[key, value]`.
pub const DICT_TYPE: u64 = 141;
/// Inline type: reference, `[authorized, referenced]`.
pub const REFERENCE_TYPE: u64 = 142;
/// Inline type: restricted type, `[base, [restriction…]]`.
pub const RESTRICTED_TYPE: u64 = 143;
/// Inline type: capability, `[borrow-type / null]`.
pub const CAPABILITY_TYPE: u64 = 144;

/// Type definition: struct.
pub const STRUCT_TYPE: u64 = 160;
/// Type definition: resource.
pub const RESOURCE_TYPE: u64 = 161;
/// Type definition: event.
pub const EVENT_TYPE: u64 = 162;
/// Type definition: contract.
pub const CONTRACT_TYPE: u64 = 163;
/// Type definition: enum (carries a raw type).
pub const ENUM_TYPE: u64 = 164;
/// Type definition: attachment.
pub const ATTACHMENT_TYPE: u64 = 165;
/// Type definition: struct interface.
pub const STRUCT_INTERFACE_TYPE: u64 = 176;
/// Type definition: resource interface.
pub const RESOURCE_INTERFACE_TYPE: u64 = 177;
/// Type definition: contract interface.
pub const CONTRACT_INTERFACE_TYPE: u64 = 178;

/// Type value: back reference into the local type-value namespace.
pub const TYPE_VALUE_REF: u64 = 184;
/// Type value: simple type id.
pub const SIMPLE_TYPE_VALUE: u64 = 185;
/// Type value: optional.
pub const OPTIONAL_TYPE_VALUE: u64 = 186;
/// Type value: variable-sized array.
pub const VARSIZED_ARRAY_TYPE_VALUE: u64 = 187;
/// Type value: constant-sized array, `[size, element]`.
pub const CONSTSIZED_ARRAY_TYPE_VALUE: u64 = 188;
/// Type value: dictionary, `[key, value]`.
pub const DICT_TYPE_VALUE: u64 = 189;
/// Type value: reference, `[authorized, referenced]`.
pub const REFERENCE_TYPE_VALUE: u64 = 190;
/// Type value: restricted type, `[type-id, base, [restriction…]]`.
pub const RESTRICTED_TYPE_VALUE: u64 = 191;
/// Type value: capability, `[borrow-type / null]`.
pub const CAPABILITY_TYPE_VALUE: u64 = 192;
/// Type value: function, `[type-id, [parameter…], return]`.
pub const FUNCTION_TYPE_VALUE: u64 = 193;
/// Type value: struct.
pub const STRUCT_TYPE_VALUE: u64 = 208;
/// Type value: resource.
pub const RESOURCE_TYPE_VALUE: u64 = 209;
/// Type value: event.
pub const EVENT_TYPE_VALUE: u64 = 210;
/// Type value: contract.
pub const CONTRACT_TYPE_VALUE: u64 = 211;
/// Type value: enum.
pub const ENUM_TYPE_VALUE: u64 = 212;
/// Type value: attachment.
pub const ATTACHMENT_TYPE_VALUE: u64 = 213;
/// Type value: struct interface.
pub const STRUCT_INTERFACE_TYPE_VALUE: u64 = 224;
/// Type value: resource interface.
pub const RESOURCE_INTERFACE_TYPE_VALUE: u64 = 225;
/// Type value: contract interface.
pub const CONTRACT_INTERFACE_TYPE_VALUE: u64 = 226;

/// A built-in simple type.
///
/// The discriminant order follows the fixed simple type id table; the wire
/// id of each variant is returned by [`SimpleType::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum SimpleType {
    Bool,
    String,
    Character,
    Address,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Word8,
    Word16,
    Word32,
    Word64,
    Word128,
    Word256,
    Fix64,
    UFix64,
    Path,
    CapabilityPath,
    StoragePath,
    PublicPath,
    PrivatePath,
    Any,
    AnyStruct,
    AnyResource,
    AnyStructAttachment,
    AnyResourceAttachment,
    Meta,
    Never,
    Number,
    SignedNumber,
    Integer,
    SignedInteger,
    FixedPoint,
    SignedFixedPoint,
    Void,
    Function,
}

impl SimpleType {
    /// The wire id of this simple type.
    #[must_use]
    pub const fn id(self) -> u64 {
        match self {
            Self::Bool => 0,
            Self::String => 1,
            Self::Character => 2,
            Self::Address => 3,
            Self::Int => 4,
            Self::Int8 => 5,
            Self::Int16 => 6,
            Self::Int32 => 7,
            Self::Int64 => 8,
            Self::Int128 => 9,
            Self::Int256 => 10,
            Self::UInt => 11,
            Self::UInt8 => 12,
            Self::UInt16 => 13,
            Self::UInt32 => 14,
            Self::UInt64 => 15,
            Self::UInt128 => 16,
            Self::UInt256 => 17,
            Self::Word8 => 18,
            Self::Word16 => 19,
            Self::Word32 => 20,
            Self::Word64 => 21,
            Self::Fix64 => 22,
            Self::UFix64 => 23,
            Self::Path => 24,
            Self::CapabilityPath => 25,
            Self::StoragePath => 26,
            Self::PublicPath => 27,
            Self::PrivatePath => 28,
            Self::Any => 38,
            Self::AnyStruct => 39,
            Self::AnyResource => 40,
            Self::Meta => 41,
            Self::Never => 42,
            Self::Number => 43,
            Self::SignedNumber => 44,
            Self::Integer => 45,
            Self::SignedInteger => 46,
            Self::FixedPoint => 47,
            Self::SignedFixedPoint => 48,
            Self::Void => 50,
            Self::Function => 51,
            Self::Word128 => 52,
            Self::Word256 => 53,
            Self::AnyStructAttachment => 54,
            Self::AnyResourceAttachment => 55,
        }
    }

    /// Look up a simple type by its wire id.
    #[must_use]
    pub const fn from_id(id: u64) -> Option<Self> {
        Some(match id {
            0 => Self::Bool,
            1 => Self::String,
            2 => Self::Character,
            3 => Self::Address,
            4 => Self::Int,
            5 => Self::Int8,
            6 => Self::Int16,
            7 => Self::Int32,
            8 => Self::Int64,
            9 => Self::Int128,
            10 => Self::Int256,
            11 => Self::UInt,
            12 => Self::UInt8,
            13 => Self::UInt16,
            14 => Self::UInt32,
            15 => Self::UInt64,
            16 => Self::UInt128,
            17 => Self::UInt256,
            18 => Self::Word8,
            19 => Self::Word16,
            20 => Self::Word32,
            21 => Self::Word64,
            22 => Self::Fix64,
            23 => Self::UFix64,
            24 => Self::Path,
            25 => Self::CapabilityPath,
            26 => Self::StoragePath,
            27 => Self::PublicPath,
            28 => Self::PrivatePath,
            38 => Self::Any,
            39 => Self::AnyStruct,
            40 => Self::AnyResource,
            41 => Self::Meta,
            42 => Self::Never,
            43 => Self::Number,
            44 => Self::SignedNumber,
            45 => Self::Integer,
            46 => Self::SignedInteger,
            47 => Self::FixedPoint,
            48 => Self::SignedFixedPoint,
            50 => Self::Void,
            51 => Self::Function,
            52 => Self::Word128,
            53 => Self::Word256,
            54 => Self::AnyStructAttachment,
            55 => Self::AnyResourceAttachment,
            _ => return None,
        })
    }

    /// The cadence type id of this built-in.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Character => "Character",
            Self::Address => "Address",
            Self::Int => "Int",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Int128 => "Int128",
            Self::Int256 => "Int256",
            Self::UInt => "UInt",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::UInt128 => "UInt128",
            Self::UInt256 => "UInt256",
            Self::Word8 => "Word8",
            Self::Word16 => "Word16",
            Self::Word32 => "Word32",
            Self::Word64 => "Word64",
            Self::Word128 => "Word128",
            Self::Word256 => "Word256",
            Self::Fix64 => "Fix64",
            Self::UFix64 => "UFix64",
            Self::Path => "Path",
            Self::CapabilityPath => "CapabilityPath",
            Self::StoragePath => "StoragePath",
            Self::PublicPath => "PublicPath",
            Self::PrivatePath => "PrivatePath",
            Self::Any => "Any",
            Self::AnyStruct => "AnyStruct",
            Self::AnyResource => "AnyResource",
            Self::AnyStructAttachment => "AnyStructAttachment",
            Self::AnyResourceAttachment => "AnyResourceAttachment",
            Self::Meta => "Type",
            Self::Never => "Never",
            Self::Number => "Number",
            Self::SignedNumber => "SignedNumber",
            Self::Integer => "Integer",
            Self::SignedInteger => "SignedInteger",
            Self::FixedPoint => "FixedPoint",
            Self::SignedFixedPoint => "SignedFixedPoint",
            Self::Void => "Void",
            Self::Function => "Function",
        }
    }

    /// Returns `true` iff values of this type cannot be decoded from the
    /// type alone, so the inline-type rule must wrap them with their
    /// runtime type.
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        matches!(
            self,
            Self::Any
                | Self::AnyStruct
                | Self::AnyResource
                | Self::AnyStructAttachment
                | Self::AnyResourceAttachment
                | Self::Number
                | Self::SignedNumber
                | Self::Integer
                | Self::SignedInteger
                | Self::FixedPoint
                | Self::SignedFixedPoint
        )
    }
}
