//! Static types and user-defined composite types.
//!
//! Composite types live in a caller-owned [`TypePool`] and are referred to
//! by index ([`CompositeId`]). The indirection is what lets recursive types
//! (a composite with a field of its own type) exist without reference
//! cycles, and it mirrors the two wire-level indirections: `type-ref` into
//! the type-definition table and `type-value-ref` into a type value's local
//! namespace.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::tags::SimpleType;

/// Index of a composite type inside a [`TypePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeId(pub(crate) u32);

impl CompositeId {
    /// The raw index value.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A static type, as attached to values and carried inside the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A built-in simple type.
    Simple(SimpleType),
    /// An optional over an inner type.
    Optional(Box<Type>),
    /// A variable-sized array.
    VarArray(Box<Type>),
    /// A constant-sized array.
    ConstArray {
        /// Declared element count.
        size: u64,
        /// Element type.
        element: Box<Type>,
    },
    /// A dictionary with homogeneous key and value types.
    Dictionary {
        /// Key type.
        key: Box<Type>,
        /// Value type.
        value: Box<Type>,
    },
    /// A user-defined composite or interface type.
    Composite(CompositeId),
    /// A reference type.
    Reference {
        /// Whether the reference is authorized.
        authorized: bool,
        /// The referenced type.
        referenced: Box<Type>,
    },
    /// A restricted type: a base type plus restrictions, canonically
    /// sorted by their cadence type id.
    Restricted {
        /// The restricted base type.
        base: Box<Type>,
        /// Restriction types, usually interfaces.
        restrictions: Vec<Type>,
    },
    /// A capability type with an optional borrow type.
    Capability {
        /// The borrow type, if declared.
        borrow: Option<Box<Type>>,
    },
    /// A function type. Only valid inside type values and function values;
    /// composite fields of function type are dropped from the wire.
    Function(Box<FunctionType>),
}

impl Type {
    /// Convenience constructor for an optional type.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Convenience constructor for a variable-sized array type.
    #[must_use]
    pub fn var_array(element: Self) -> Self {
        Self::VarArray(Box::new(element))
    }

    /// Convenience constructor for a constant-sized array type.
    #[must_use]
    pub fn const_array(size: u64, element: Self) -> Self {
        Self::ConstArray {
            size,
            element: Box::new(element),
        }
    }

    /// Convenience constructor for a dictionary type.
    #[must_use]
    pub fn dictionary(key: Self, value: Self) -> Self {
        Self::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Returns `true` iff values at a position of this static type must be
    /// wrapped with their runtime type (the inline-type rule).
    ///
    /// Abstract positions are the `Any*` family and the numeric supertypes,
    /// restricted types, and interface types. Everything else decodes from
    /// the static type alone.
    #[must_use]
    pub fn is_abstract(&self, pool: &TypePool) -> bool {
        match self {
            Self::Simple(s) => s.is_abstract(),
            Self::Restricted { .. } => true,
            Self::Composite(id) => pool.get(*id).is_some_and(|d| d.kind.is_interface()),
            _ => false,
        }
    }

    /// The cadence type id of this type, composed structurally.
    #[must_use]
    pub fn id_string(&self, pool: &TypePool) -> String {
        match self {
            Self::Simple(s) => String::from(s.name()),
            Self::Optional(inner) => format!("{}?", inner.id_string(pool)),
            Self::VarArray(element) => format!("[{}]", element.id_string(pool)),
            Self::ConstArray { size, element } => {
                format!("[{};{}]", element.id_string(pool), size)
            }
            Self::Dictionary { key, value } => {
                format!("{{{}:{}}}", key.id_string(pool), value.id_string(pool))
            }
            Self::Composite(id) => pool
                .get(*id)
                .map_or_else(String::new, |d| d.type_id.clone()),
            Self::Reference {
                authorized,
                referenced,
            } => {
                let amp = if *authorized { "auth&" } else { "&" };
                format!("{}{}", amp, referenced.id_string(pool))
            }
            Self::Restricted { base, restrictions } => {
                let mut out = base.id_string(pool);
                out.push('{');
                for (i, r) in restrictions.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&r.id_string(pool));
                }
                out.push('}');
                out
            }
            Self::Capability { borrow } => borrow.as_ref().map_or_else(
                || String::from("Capability"),
                |b| format!("Capability<{}>", b.id_string(pool)),
            ),
            Self::Function(f) => f.type_id.clone(),
        }
    }
}

/// The kind of a user-defined composite or interface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CompositeKind {
    Struct,
    Resource,
    Event,
    Contract,
    Enum,
    Attachment,
    StructInterface,
    ResourceInterface,
    ContractInterface,
}

impl CompositeKind {
    /// Returns `true` iff this is an interface kind.
    #[must_use]
    pub const fn is_interface(self) -> bool {
        matches!(
            self,
            Self::StructInterface | Self::ResourceInterface | Self::ContractInterface
        )
    }
}

/// A named, typed field of a composite type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Declared field type.
    pub ty: Type,
}

impl Field {
    /// Construct a field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An initializer parameter of a composite type, carried only in type
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Argument label.
    pub label: String,
    /// Parameter identifier.
    pub identifier: String,
    /// Parameter type.
    pub ty: Type,
}

/// A function type: its composed type id, parameters, and return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    /// The composed cadence type id of the function type.
    pub type_id: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Return type.
    pub return_type: Type,
}

/// A user-defined composite or interface type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeType {
    /// The composite kind.
    pub kind: CompositeKind,
    /// Location-qualified cadence type id, e.g. `S.test.Foo`.
    pub type_id: String,
    /// The raw type of an enum; `None` for every other kind.
    pub raw_type: Option<Type>,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Initializer parameter lists, carried only in type values.
    pub initializers: Vec<Vec<Parameter>>,
}

impl CompositeType {
    /// Construct a composite type with no raw type and no initializers.
    #[must_use]
    pub fn new(kind: CompositeKind, type_id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            kind,
            type_id: type_id.into(),
            raw_type: None,
            fields,
            initializers: Vec::new(),
        }
    }

    /// The fields that appear on the wire: function-typed members are
    /// dropped.
    pub fn data_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| !matches!(f.ty, Type::Function(_)))
    }

    /// Number of fields that appear on the wire.
    #[must_use]
    pub fn data_field_count(&self) -> usize {
        self.data_fields().count()
    }
}

/// An arena of composite type definitions.
///
/// The pool is append-only; [`CompositeId`]s are stable for the lifetime of
/// the pool. Encoding borrows a pool, decoding returns a freshly built one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePool {
    defs: Vec<CompositeType>,
}

impl TypePool {
    /// Construct an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self { defs: Vec::new() }
    }

    /// Insert a definition and return its id.
    pub fn insert(&mut self, def: CompositeType) -> CompositeId {
        let id = CompositeId(u32::try_from(self.defs.len()).expect("pool size exceeds u32"));
        self.defs.push(def);
        id
    }

    /// Look up a definition.
    #[inline]
    #[must_use]
    pub fn get(&self, id: CompositeId) -> Option<&CompositeType> {
        self.defs.get(id.index())
    }

    /// Look up a definition mutably.
    ///
    /// Recursive composite types are built by inserting a definition first
    /// and filling in fields that refer to its own id afterwards.
    #[must_use]
    pub fn get_mut(&mut self, id: CompositeId) -> Option<&mut CompositeType> {
        self.defs.get_mut(id.index())
    }

    /// Find a definition by its cadence type id.
    #[must_use]
    pub fn find(&self, type_id: &str) -> Option<CompositeId> {
        self.defs
            .iter()
            .position(|d| d.type_id == type_id)
            .map(|i| CompositeId(u32::try_from(i).expect("pool size exceeds u32")))
    }

    /// Number of definitions in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` iff the pool holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over `(id, definition)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (CompositeId, &CompositeType)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (CompositeId(u32::try_from(i).expect("pool size exceeds u32")), d))
    }
}
