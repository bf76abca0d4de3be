//! Runtime values.
//!
//! Values are immutable inputs to the encoder and outputs of the decoder.
//! Containers optionally carry their own type: it is ignored in positions
//! whose static type is concrete, and required (as the runtime type of the
//! inline-type wrapper) in abstract positions.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use unicode_segmentation::UnicodeSegmentation;

use crate::bigint::BigInt;
use crate::error::{CcfError, ErrorCode};
use crate::tags::SimpleType;
use crate::types::{CompositeId, FunctionType, Type, TypePool};

/// Scale factor of `Fix64` and `UFix64`: 8 implicit fractional digits.
pub const FIXED_POINT_SCALE: u64 = 100_000_000;

/// The domain of a path value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathDomain {
    /// `/storage/...`
    Storage,
    /// `/private/...`
    Private,
    /// `/public/...`
    Public,
}

impl PathDomain {
    /// The wire code of this domain.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::Storage => 1,
            Self::Private => 2,
            Self::Public => 3,
        }
    }

    /// Look up a domain by its wire code.
    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            1 => Self::Storage,
            2 => Self::Private,
            3 => Self::Public,
            _ => return None,
        })
    }

    /// The precise simple type of a path value in this domain.
    #[must_use]
    pub const fn path_type(self) -> SimpleType {
        match self {
            Self::Storage => SimpleType::StoragePath,
            Self::Private => SimpleType::PrivatePath,
            Self::Public => SimpleType::PublicPath,
        }
    }
}

/// A path value: a domain and an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValue {
    /// Path domain.
    pub domain: PathDomain,
    /// Path identifier.
    pub identifier: String,
}

/// The target of a capability: a u64 id or a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityTarget {
    /// An id-based capability.
    Id(u64),
    /// A path-based capability.
    Path(PathValue),
}

/// A capability value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityValue {
    /// The address the capability targets. Exactly 8 bytes.
    pub address: [u8; 8],
    /// The borrow type, used as part of the runtime capability type.
    pub borrow_type: Option<Type>,
    /// The capability target.
    pub target: CapabilityTarget,
}

/// A named field of a composite value.
///
/// Source order is arbitrary; the encoder permutes fields into the
/// declaration order of the composite's type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeField {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: Value,
}

/// A composite value: its type and named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeValue {
    /// The composite's type in the [`TypePool`].
    pub type_ref: CompositeId,
    /// Named fields, in any order.
    pub fields: Vec<CompositeField>,
}

/// An array value with an optionally carried array type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayValue {
    /// The runtime array type (`Type::VarArray` or `Type::ConstArray`).
    /// Required only when the array sits in an abstract-typed position.
    pub ty: Option<Type>,
    /// Elements in order.
    pub elements: Vec<Value>,
}

/// A key-value entry of a dictionary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    /// Entry key.
    pub key: Value,
    /// Entry value.
    pub value: Value,
}

/// A dictionary value with an optionally carried dictionary type.
///
/// Entry order is arbitrary; the encoder sorts entries into canonical key
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryValue {
    /// The runtime dictionary type (`Type::Dictionary`). Required only when
    /// the dictionary sits in an abstract-typed position.
    pub ty: Option<Type>,
    /// Entries in any order.
    pub entries: Vec<DictEntry>,
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// The unit value.
    Void,
    /// A boolean.
    Bool(bool),
    /// An optional: absent or present.
    Optional(Option<Box<Value>>),
    /// A single grapheme cluster. Construct with [`Value::character`].
    Character(String),
    /// A UTF-8 string.
    String(String),
    /// An 8-byte address.
    Address([u8; 8]),
    /// Unbounded signed integer.
    Int(BigInt),
    /// 8-bit signed integer.
    Int8(i8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 128-bit signed integer.
    Int128(i128),
    /// 256-bit signed integer. Range-checked at encode time.
    Int256(BigInt),
    /// Unbounded unsigned integer. Sign-checked at encode time.
    UInt(BigInt),
    /// 8-bit unsigned integer.
    UInt8(u8),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 128-bit unsigned integer.
    UInt128(u128),
    /// 256-bit unsigned integer. Range-checked at encode time.
    UInt256(BigInt),
    /// 8-bit wrapping word.
    Word8(u8),
    /// 16-bit wrapping word.
    Word16(u16),
    /// 32-bit wrapping word.
    Word32(u32),
    /// 64-bit wrapping word.
    Word64(u64),
    /// 128-bit wrapping word.
    Word128(u128),
    /// 256-bit wrapping word. Range-checked at encode time.
    Word256(BigInt),
    /// Signed fixed-point number, scaled by [`FIXED_POINT_SCALE`].
    Fix64(i64),
    /// Unsigned fixed-point number, scaled by [`FIXED_POINT_SCALE`].
    UFix64(u64),
    /// An array.
    Array(ArrayValue),
    /// A dictionary.
    Dictionary(DictionaryValue),
    /// A composite value (struct, resource, event, contract, enum, or
    /// attachment).
    Composite(CompositeValue),
    /// A path.
    Path(PathValue),
    /// A capability.
    Capability(CapabilityValue),
    /// A first-class type; `None` encodes a type value without a static
    /// type.
    TypeValue(Option<Type>),
    /// A function value: just its signature.
    Function(Box<FunctionType>),
}

impl Value {
    /// Construct a character value, validating that `s` is exactly one
    /// extended grapheme cluster.
    ///
    /// # Errors
    ///
    /// Returns `NotSingleGrapheme` otherwise.
    pub fn character(s: impl Into<String>) -> Result<Self, CcfError> {
        let s = s.into();
        if is_single_grapheme(&s) {
            Ok(Self::Character(s))
        } else {
            Err(CcfError::new(ErrorCode::NotSingleGrapheme, 0))
        }
    }

    /// Construct an untyped array value.
    #[must_use]
    pub fn array(elements: Vec<Self>) -> Self {
        Self::Array(ArrayValue { ty: None, elements })
    }

    /// Construct an array value carrying its runtime array type.
    #[must_use]
    pub fn typed_array(ty: Type, elements: Vec<Self>) -> Self {
        Self::Array(ArrayValue {
            ty: Some(ty),
            elements,
        })
    }

    /// Construct an untyped dictionary value.
    #[must_use]
    pub fn dictionary(entries: Vec<DictEntry>) -> Self {
        Self::Dictionary(DictionaryValue { ty: None, entries })
    }

    /// Construct a dictionary value carrying its runtime dictionary type.
    #[must_use]
    pub fn typed_dictionary(ty: Type, entries: Vec<DictEntry>) -> Self {
        Self::Dictionary(DictionaryValue {
            ty: Some(ty),
            entries,
        })
    }

    /// Construct a present optional.
    #[must_use]
    pub fn some(inner: Self) -> Self {
        Self::Optional(Some(Box::new(inner)))
    }

    /// The absent optional.
    #[must_use]
    pub const fn nil() -> Self {
        Self::Optional(None)
    }

    /// The runtime type of this value, used by the inline-type rule at
    /// abstract-typed positions.
    ///
    /// # Errors
    ///
    /// Returns `UntypedContainer` for containers built without a runtime
    /// type.
    pub(crate) fn runtime_type(&self, pool: &TypePool) -> Result<Type, ErrorCode> {
        Ok(match self {
            Self::Void => Type::Simple(SimpleType::Void),
            Self::Bool(_) => Type::Simple(SimpleType::Bool),
            Self::Optional(_) => {
                // Walk the Some-chain iteratively; optional values are the
                // only place runtime types nest through the value itself.
                let mut somes = 0usize;
                let mut cur = self;
                while let Self::Optional(Some(inner)) = cur {
                    somes += 1;
                    cur = &**inner;
                }
                let (mut ty, wraps) = if let Self::Optional(None) = cur {
                    (Type::Simple(SimpleType::Never), somes + 1)
                } else {
                    (cur.runtime_type(pool)?, somes)
                };
                for _ in 0..wraps {
                    ty = Type::optional(ty);
                }
                ty
            }
            Self::Character(_) => Type::Simple(SimpleType::Character),
            Self::String(_) => Type::Simple(SimpleType::String),
            Self::Address(_) => Type::Simple(SimpleType::Address),
            Self::Int(_) => Type::Simple(SimpleType::Int),
            Self::Int8(_) => Type::Simple(SimpleType::Int8),
            Self::Int16(_) => Type::Simple(SimpleType::Int16),
            Self::Int32(_) => Type::Simple(SimpleType::Int32),
            Self::Int64(_) => Type::Simple(SimpleType::Int64),
            Self::Int128(_) => Type::Simple(SimpleType::Int128),
            Self::Int256(_) => Type::Simple(SimpleType::Int256),
            Self::UInt(_) => Type::Simple(SimpleType::UInt),
            Self::UInt8(_) => Type::Simple(SimpleType::UInt8),
            Self::UInt16(_) => Type::Simple(SimpleType::UInt16),
            Self::UInt32(_) => Type::Simple(SimpleType::UInt32),
            Self::UInt64(_) => Type::Simple(SimpleType::UInt64),
            Self::UInt128(_) => Type::Simple(SimpleType::UInt128),
            Self::UInt256(_) => Type::Simple(SimpleType::UInt256),
            Self::Word8(_) => Type::Simple(SimpleType::Word8),
            Self::Word16(_) => Type::Simple(SimpleType::Word16),
            Self::Word32(_) => Type::Simple(SimpleType::Word32),
            Self::Word64(_) => Type::Simple(SimpleType::Word64),
            Self::Word128(_) => Type::Simple(SimpleType::Word128),
            Self::Word256(_) => Type::Simple(SimpleType::Word256),
            Self::Fix64(_) => Type::Simple(SimpleType::Fix64),
            Self::UFix64(_) => Type::Simple(SimpleType::UFix64),
            Self::Array(a) => a.ty.clone().ok_or(ErrorCode::UntypedContainer)?,
            Self::Dictionary(d) => d.ty.clone().ok_or(ErrorCode::UntypedContainer)?,
            Self::Composite(c) => Type::Composite(c.type_ref),
            Self::Path(p) => Type::Simple(p.domain.path_type()),
            Self::Capability(c) => Type::Capability {
                borrow: c.borrow_type.clone().map(Box::new),
            },
            Self::TypeValue(_) => Type::Simple(SimpleType::Meta),
            Self::Function(_) => Type::Simple(SimpleType::Function),
        })
    }
}

/// Returns `true` iff `s` is exactly one extended grapheme cluster.
pub(crate) fn is_single_grapheme(s: &str) -> bool {
    let mut graphemes = s.graphemes(true);
    graphemes.next().is_some() && graphemes.next().is_none()
}
