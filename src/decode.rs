//! The value decoder.
//!
//! Mirror of the encoder: reads the outer envelope, builds the local
//! id-to-definition table, then parses the value body under the decoded
//! static type, enforcing every range, UTF-8, ordering, and field-count
//! invariant. The decoder never returns a partial value on error.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::bigint::{cmp_magnitudes, BigInt, INT256_MAX_MAG, UINT256_MAX_LEN};
use crate::error::{CcfError, ErrorCode};
use crate::limits::DecodeLimits;
use crate::order::{cmp_encoded_keys, is_strictly_increasing};
use crate::reader::Reader;
use crate::tags;
use crate::tags::SimpleType;
use crate::typeid::validate_composite_type_id;
use crate::types::{
    CompositeId, CompositeKind, CompositeType, Field, FunctionType, Parameter, Type, TypePool,
};
use crate::value::{
    is_single_grapheme, ArrayValue, CapabilityTarget, CapabilityValue, CompositeField,
    CompositeValue, DictEntry, DictionaryValue, PathDomain, PathValue, Value,
};

/// The result of a successful decode: the reconstructed value, its static
/// type, and the pool holding every composite type definition the message
/// carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Composite type definitions.
    pub pool: TypePool,
    /// The decoded static type of the root value.
    pub ty: Type,
    /// The decoded value.
    pub value: Value,
}

/// Resolves composite types referenced by cadence type id but not described
/// in-band.
///
/// A returned definition must be self-contained: its field types may not
/// contain `Type::Composite` references, since those indices would be
/// meaningless in the decoder's pool.
pub trait TypeResolver {
    /// Resolve `cadence_type_id` to a composite type definition, or `None`
    /// if unknown.
    fn resolve(&self, cadence_type_id: &str) -> Option<CompositeType>;
}

/// Decode a single CCF message with limits derived from the input length.
///
/// # Errors
///
/// Fails with a typed [`CcfError`] on any malformed, non-canonical, or
/// out-of-range input. No partial value is ever returned.
pub fn decode(bytes: &[u8]) -> Result<Decoded, CcfError> {
    decode_with_limits(bytes, DecodeLimits::for_bytes(bytes.len()))
}

/// Decode a single CCF message with explicit limits.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_limits(bytes: &[u8], limits: DecodeLimits) -> Result<Decoded, CcfError> {
    decode_with_resolver(bytes, limits, None)
}

/// Decode a single CCF message, resolving external type references through
/// `resolver`.
///
/// A `type-ref` id that is not described in-band is an external reference:
/// with a resolver its id bytes are reinterpreted as a UTF-8 cadence type
/// id and handed to the resolver; without one, decoding fails with
/// `MissingTypeResolver`.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_resolver(
    bytes: &[u8],
    limits: DecodeLimits,
    resolver: Option<&dyn TypeResolver>,
) -> Result<Decoded, CcfError> {
    let mut d = Decoder {
        r: Reader::new(bytes, limits),
        pool: TypePool::new(),
        table: Vec::new(),
        resolver,
    };

    let (tag, off) = d.r.read_tag()?;
    match tag {
        tags::TYPE_DEF_AND_VALUE => {
            d.r.read_array_exact(2)?;
            d.parse_type_defs()?;
        }
        tags::TYPE_AND_VALUE => {}
        _ => return Err(CcfError::new(ErrorCode::UnknownTag, off)),
    }
    d.r.read_array_exact(2)?;
    let ty = d.parse_inline_type(0)?;
    let value = d.parse_value(&ty, 0)?;

    if !d.r.eof() {
        return Err(CcfError::new(ErrorCode::TrailingBytes, d.r.pos()));
    }
    Ok(Decoded {
        pool: d.pool,
        ty,
        value,
    })
}

struct Decoder<'a, 'r> {
    r: Reader<'a>,
    pool: TypePool,
    /// Wire id bytes -> pool id, in table order.
    table: Vec<(Vec<u8>, CompositeId)>,
    resolver: Option<&'r dyn TypeResolver>,
}

impl Decoder<'_, '_> {
    fn lookup_ref(&self, id_bytes: &[u8]) -> Option<CompositeId> {
        self.table
            .iter()
            .find(|(id, _)| id.as_slice() == id_bytes)
            .map(|(_, cid)| *cid)
    }

    // --- type-definition table --------------------------------------------

    /// Parse the type-definition table in two passes: headers first (so
    /// forward `type-ref`s resolve), then bodies.
    fn parse_type_defs(&mut self) -> Result<(), CcfError> {
        let (count, _) = self.r.read_array()?;
        let items_before = self.r.items_checkpoint();

        struct Entry {
            kind: CompositeKind,
            body_pos: usize,
        }

        let mut entries: Vec<Entry> = Vec::new();
        entries
            .try_reserve_exact(count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, self.r.pos()))?;
        let mut prev_type_id: Option<String> = None;

        for _ in 0..count {
            let (tag, tag_off) = self.r.read_tag()?;
            let kind = match tag {
                tags::STRUCT_TYPE => CompositeKind::Struct,
                tags::RESOURCE_TYPE => CompositeKind::Resource,
                tags::EVENT_TYPE => CompositeKind::Event,
                tags::CONTRACT_TYPE => CompositeKind::Contract,
                tags::ENUM_TYPE => CompositeKind::Enum,
                tags::ATTACHMENT_TYPE => CompositeKind::Attachment,
                tags::STRUCT_INTERFACE_TYPE => CompositeKind::StructInterface,
                tags::RESOURCE_INTERFACE_TYPE => CompositeKind::ResourceInterface,
                tags::CONTRACT_INTERFACE_TYPE => CompositeKind::ContractInterface,
                _ => return Err(CcfError::new(ErrorCode::UnknownTag, tag_off)),
            };
            let arity = match kind {
                k if k.is_interface() => 2,
                CompositeKind::Enum => 4,
                _ => 3,
            };
            self.r.read_array_exact(arity)?;
            let (id_bytes, id_off) = self.r.read_bytes()?;
            let (type_id, tid_off) = self.r.read_text()?;
            validate_composite_type_id(type_id)
                .map_err(|code| CcfError::new(code, tid_off))?;

            // Table invariants: ids unique, definitions sorted by cadence
            // type id over UTF-8 bytes.
            if self.table.iter().any(|(id, _)| id.as_slice() == id_bytes) {
                return Err(CcfError::new(ErrorCode::DuplicateTypeDefId, id_off));
            }
            if let Some(prev) = &prev_type_id {
                if prev.as_bytes() >= type_id.as_bytes() {
                    return Err(CcfError::new(ErrorCode::TypeDefOrder, tid_off));
                }
            }
            prev_type_id = Some(type_id.to_string());

            let body_pos = self.r.pos();
            // Skip the body items; pass 2 re-parses them.
            for _ in 2..arity {
                self.r.skip_value(0)?;
            }

            let cid = self.pool.insert(CompositeType {
                kind,
                type_id: type_id.to_string(),
                raw_type: None,
                fields: Vec::new(),
                initializers: Vec::new(),
            });
            self.table.push((id_bytes.to_vec(), cid));
            entries.push(Entry { kind, body_pos });
        }

        let end_pos = self.r.pos();
        self.r.restore_items(items_before);

        for (i, entry) in entries.iter().enumerate() {
            if entry.kind.is_interface() {
                continue;
            }
            self.r.set_pos(entry.body_pos);
            let raw_type = if entry.kind == CompositeKind::Enum {
                Some(self.parse_inline_type(0)?)
            } else {
                None
            };
            let fields = self.parse_field_records()?;
            let cid = self.table[i].1;
            let def = self
                .pool
                .get_mut(cid)
                .ok_or_else(|| CcfError::new(ErrorCode::Internal, self.r.pos()))?;
            def.raw_type = raw_type;
            def.fields = fields;
        }

        self.r.set_pos(end_pos);
        Ok(())
    }

    fn parse_field_records(&mut self) -> Result<Vec<Field>, CcfError> {
        let (count, off) = self.r.read_array()?;
        let mut fields = Vec::new();
        fields
            .try_reserve_exact(count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, off))?;
        for _ in 0..count {
            self.r.read_array_exact(2)?;
            let (name, _) = self.r.read_text()?;
            let name = name.to_string();
            let ty = self.parse_inline_type(0)?;
            fields.push(Field { name, ty });
        }
        Ok(fields)
    }

    // --- inline (static) types --------------------------------------------

    fn parse_inline_type(&mut self, depth: usize) -> Result<Type, CcfError> {
        self.r.ensure_depth(depth, self.r.pos())?;
        let (tag, off) = self.r.read_tag()?;
        Ok(match tag {
            tags::SIMPLE_TYPE => {
                let (id, id_off) = self.r.read_u64()?;
                let st = SimpleType::from_id(id)
                    .ok_or_else(|| CcfError::new(ErrorCode::UnknownSimpleTypeId, id_off))?;
                Type::Simple(st)
            }
            tags::OPTIONAL_TYPE => Type::optional(self.parse_inline_type(depth + 1)?),
            tags::VARSIZED_ARRAY_TYPE => Type::var_array(self.parse_inline_type(depth + 1)?),
            tags::CONSTSIZED_ARRAY_TYPE => {
                self.r.read_array_exact(2)?;
                let (size, _) = self.r.read_u64()?;
                Type::const_array(size, self.parse_inline_type(depth + 1)?)
            }
            tags::DICT_TYPE => {
                self.r.read_array_exact(2)?;
                let key = self.parse_inline_type(depth + 1)?;
                let value = self.parse_inline_type(depth + 1)?;
                Type::dictionary(key, value)
            }
            tags::REFERENCE_TYPE => {
                self.r.read_array_exact(2)?;
                let (authorized, _) = self.r.read_bool()?;
                Type::Reference {
                    authorized,
                    referenced: Box::new(self.parse_inline_type(depth + 1)?),
                }
            }
            tags::RESTRICTED_TYPE => {
                self.r.read_array_exact(2)?;
                let base = self.parse_inline_type(depth + 1)?;
                let restrictions = self.parse_restrictions(depth)?;
                Type::Restricted {
                    base: Box::new(base),
                    restrictions,
                }
            }
            tags::CAPABILITY_TYPE => {
                self.r.read_array_exact(1)?;
                let borrow = if self.r.take_null() {
                    None
                } else {
                    Some(Box::new(self.parse_inline_type(depth + 1)?))
                };
                Type::Capability { borrow }
            }
            tags::TYPE_REF => {
                let (id_bytes, id_off) = self.r.read_bytes()?;
                self.resolve_type_ref(id_bytes, id_off)?
            }
            _ => return Err(CcfError::new(ErrorCode::UnknownTag, off)),
        })
    }

    fn parse_restrictions(&mut self, depth: usize) -> Result<Vec<Type>, CcfError> {
        let (count, off) = self.r.read_array()?;
        let mut restrictions = Vec::new();
        restrictions
            .try_reserve_exact(count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, off))?;
        let mut prev_id: Option<String> = None;
        for _ in 0..count {
            let r_off = self.r.pos();
            let r_ty = self.parse_inline_type(depth + 1)?;
            let r_id = r_ty.id_string(&self.pool);
            if let Some(prev) = &prev_id {
                if prev == &r_id {
                    return Err(CcfError::new(ErrorCode::DuplicateRestriction, r_off));
                }
                if prev.as_bytes() > r_id.as_bytes() {
                    return Err(CcfError::new(ErrorCode::RestrictionOrder, r_off));
                }
            }
            prev_id = Some(r_id);
            restrictions.push(r_ty);
        }
        Ok(restrictions)
    }

    /// Resolve `type-ref` id bytes: in-band table first, then the external
    /// resolver.
    fn resolve_type_ref(&mut self, id_bytes: &[u8], off: usize) -> Result<Type, CcfError> {
        if let Some(cid) = self.lookup_ref(id_bytes) {
            return Ok(Type::Composite(cid));
        }
        let Some(resolver) = self.resolver else {
            return Err(CcfError::new(ErrorCode::MissingTypeResolver, off));
        };
        let type_id = core::str::from_utf8(id_bytes)
            .map_err(|_| CcfError::new(ErrorCode::UnknownTypeRef, off))?;
        let def = resolver
            .resolve(type_id)
            .ok_or_else(|| CcfError::new(ErrorCode::UnknownTypeRef, off))?;
        let cid = match self.pool.find(&def.type_id) {
            Some(existing) => existing,
            None => self.pool.insert(def),
        };
        Ok(Type::Composite(cid))
    }

    // --- values -----------------------------------------------------------

    fn parse_value(&mut self, ty: &Type, depth: usize) -> Result<Value, CcfError> {
        self.r.ensure_depth(depth, self.r.pos())?;
        if ty.is_abstract(&self.pool) {
            let (tag, off) = self.r.read_tag()?;
            if tag != tags::TYPE_AND_VALUE {
                return Err(CcfError::new(ErrorCode::UnexpectedItem, off));
            }
            self.r.read_array_exact(2)?;
            let rt = self.parse_inline_type(depth + 1)?;
            // Runtime types are concrete by construction; an abstract type
            // in the wrapper position can never describe a value.
            if rt.is_abstract(&self.pool) || !self.runtime_satisfies(&rt, ty) {
                return Err(CcfError::new(ErrorCode::TypeMismatch, off));
            }
            let mut value = self.parse_bare(&rt, depth)?;
            // Wrapped containers keep their runtime type so the inline-type
            // rule reproduces this wrapper on re-encode.
            match &mut value {
                Value::Array(a) => a.ty = Some(rt),
                Value::Dictionary(d) => d.ty = Some(rt),
                _ => {}
            }
            return Ok(value);
        }
        self.parse_bare(ty, depth)
    }

    fn parse_bare(&mut self, ty: &Type, depth: usize) -> Result<Value, CcfError> {
        match ty {
            Type::Simple(s) => self.parse_simple(*s, depth),
            Type::Optional(inner) => {
                if self.r.take_null() {
                    // The absence marker is a single null regardless of
                    // optional depth; the nil sits at the innermost level.
                    Ok(nil_at_depth(inner))
                } else {
                    Ok(Value::some(self.parse_value(inner, depth + 1)?))
                }
            }
            Type::VarArray(element) => {
                let (count, off) = self.r.read_array()?;
                Ok(Value::Array(ArrayValue {
                    ty: None,
                    elements: self.parse_elements(element, count, off, depth)?,
                }))
            }
            Type::ConstArray { size, element } => {
                let (count, off) = self.r.read_array()?;
                if count as u64 != *size {
                    return Err(CcfError::new(ErrorCode::ArrayLenMismatch, off));
                }
                Ok(Value::Array(ArrayValue {
                    ty: None,
                    elements: self.parse_elements(element, count, off, depth)?,
                }))
            }
            Type::Dictionary { key, value } => self.parse_dictionary(key, value, depth),
            Type::Composite(id) => self.parse_composite(*id, depth),
            Type::Capability { borrow } => {
                self.r.read_array_exact(2)?;
                let (addr, addr_off) = self.r.read_bytes()?;
                let address: [u8; 8] = addr
                    .try_into()
                    .map_err(|_| CcfError::new(ErrorCode::InvalidAddressLength, addr_off))?;
                // A u64 id and a path target are distinguished by major type.
                let target = if self.r.peek_u8().is_some_and(|b| b >> 5 == 0) {
                    let (id, _) = self.r.read_u64()?;
                    CapabilityTarget::Id(id)
                } else {
                    CapabilityTarget::Path(self.parse_path()?)
                };
                Ok(Value::Capability(CapabilityValue {
                    address,
                    borrow_type: borrow.as_deref().cloned(),
                    target,
                }))
            }
            Type::Reference { .. } | Type::Function(_) | Type::Restricted { .. } => {
                Err(CcfError::new(ErrorCode::UnexpectedItem, self.r.pos()))
            }
        }
    }

    fn parse_elements(
        &mut self,
        element: &Type,
        count: usize,
        off: usize,
        depth: usize,
    ) -> Result<Vec<Value>, CcfError> {
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, off))?;
        for _ in 0..count {
            elements.push(self.parse_value(element, depth + 1)?);
        }
        Ok(elements)
    }

    fn parse_dictionary(
        &mut self,
        key_ty: &Type,
        val_ty: &Type,
        depth: usize,
    ) -> Result<Value, CcfError> {
        let (count, off) = self.r.read_array()?;
        if count % 2 != 0 {
            return Err(CcfError::new(ErrorCode::UnexpectedItem, off));
        }
        let pairs = count / 2;
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(pairs)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, off))?;

        let mut prev_key: Option<(usize, usize)> = None;
        for _ in 0..pairs {
            let key_start = self.r.pos();
            let key = self.parse_value(key_ty, depth + 1)?;
            let key_end = self.r.pos();

            if let Some((ps, pe)) = prev_key {
                let prev = self.r.span(ps, pe);
                let curr = self.r.span(key_start, key_end);
                if cmp_encoded_keys(prev, curr).is_eq() {
                    return Err(CcfError::new(ErrorCode::DuplicateDictKey, key_start));
                }
                if !is_strictly_increasing(prev, curr) {
                    return Err(CcfError::new(ErrorCode::DictKeyOrder, key_start));
                }
            }
            prev_key = Some((key_start, key_end));

            let value = self.parse_value(val_ty, depth + 1)?;
            entries.push(DictEntry { key, value });
        }
        Ok(Value::Dictionary(DictionaryValue { ty: None, entries }))
    }

    fn parse_composite(&mut self, id: CompositeId, depth: usize) -> Result<Value, CcfError> {
        let declared: Vec<(String, Type)> = {
            let def = self
                .pool
                .get(id)
                .ok_or_else(|| CcfError::new(ErrorCode::Internal, self.r.pos()))?;
            def.data_fields()
                .map(|f| (f.name.clone(), f.ty.clone()))
                .collect()
        };
        let (count, off) = self.r.read_array()?;
        if count != declared.len() {
            return Err(CcfError::new(ErrorCode::FieldCountMismatch, off));
        }
        let mut fields = Vec::new();
        fields
            .try_reserve_exact(count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, off))?;
        for (name, field_ty) in declared {
            let value = self.parse_value(&field_ty, depth + 1)?;
            fields.push(CompositeField { name, value });
        }
        Ok(Value::Composite(CompositeValue {
            type_ref: id,
            fields,
        }))
    }

    #[allow(clippy::too_many_lines)]
    fn parse_simple(&mut self, st: SimpleType, depth: usize) -> Result<Value, CcfError> {
        Ok(match st {
            SimpleType::Void => {
                self.r.read_null()?;
                Value::Void
            }
            SimpleType::Bool => Value::Bool(self.r.read_bool()?.0),
            SimpleType::String => Value::String(self.r.read_text()?.0.to_string()),
            SimpleType::Character => {
                let (s, off) = self.r.read_text()?;
                if !is_single_grapheme(s) {
                    return Err(CcfError::new(ErrorCode::NotSingleGrapheme, off));
                }
                Value::Character(s.to_string())
            }
            SimpleType::Address => {
                let (bytes, off) = self.r.read_bytes()?;
                let address: [u8; 8] = bytes
                    .try_into()
                    .map_err(|_| CcfError::new(ErrorCode::InvalidAddressLength, off))?;
                Value::Address(address)
            }

            SimpleType::Int => {
                let (negative, magnitude, _) = self.r.read_bignum()?;
                Value::Int(BigInt::from_wire_parts(negative, magnitude))
            }
            SimpleType::Int8 => Value::Int8(self.parse_i64_range::<i8>()?),
            SimpleType::Int16 => Value::Int16(self.parse_i64_range::<i16>()?),
            SimpleType::Int32 => Value::Int32(self.parse_i64_range::<i32>()?),
            SimpleType::Int64 => Value::Int64(self.r.read_i64()?.0),
            SimpleType::Int128 => {
                let (negative, magnitude, off) = self.r.read_bignum()?;
                let v = BigInt::from_wire_parts(negative, magnitude)
                    .to_i128()
                    .ok_or_else(|| CcfError::new(ErrorCode::MagnitudeOutOfRange, off))?;
                Value::Int128(v)
            }
            SimpleType::Int256 => {
                let (negative, magnitude, off) = self.r.read_bignum()?;
                if cmp_magnitudes(magnitude, &INT256_MAX_MAG).is_gt() {
                    return Err(CcfError::new(ErrorCode::MagnitudeOutOfRange, off));
                }
                Value::Int256(BigInt::from_wire_parts(negative, magnitude))
            }

            SimpleType::UInt => {
                let (negative, magnitude, off) = self.r.read_bignum()?;
                if negative {
                    return Err(CcfError::new(ErrorCode::NegativeUnsigned, off));
                }
                Value::UInt(BigInt::from_wire_parts(false, magnitude))
            }
            SimpleType::UInt8 => Value::UInt8(self.parse_u64_range::<u8>()?),
            SimpleType::UInt16 => Value::UInt16(self.parse_u64_range::<u16>()?),
            SimpleType::UInt32 => Value::UInt32(self.parse_u64_range::<u32>()?),
            SimpleType::UInt64 => Value::UInt64(self.r.read_u64()?.0),
            SimpleType::UInt128 => Value::UInt128(self.parse_unsigned_big_128()?),
            SimpleType::UInt256 => Value::UInt256(self.parse_unsigned_big_256()?),

            SimpleType::Word8 => Value::Word8(self.parse_u64_range::<u8>()?),
            SimpleType::Word16 => Value::Word16(self.parse_u64_range::<u16>()?),
            SimpleType::Word32 => Value::Word32(self.parse_u64_range::<u32>()?),
            SimpleType::Word64 => Value::Word64(self.r.read_u64()?.0),
            SimpleType::Word128 => Value::Word128(self.parse_unsigned_big_128()?),
            SimpleType::Word256 => Value::Word256(self.parse_unsigned_big_256()?),

            SimpleType::Fix64 => Value::Fix64(self.r.read_i64()?.0),
            SimpleType::UFix64 => Value::UFix64(self.r.read_u64()?.0),

            SimpleType::Path
            | SimpleType::CapabilityPath
            | SimpleType::StoragePath
            | SimpleType::PublicPath
            | SimpleType::PrivatePath => {
                let p_off = self.r.pos();
                let p = self.parse_path()?;
                let ok = match st {
                    SimpleType::Path => true,
                    SimpleType::CapabilityPath => {
                        matches!(p.domain, PathDomain::Private | PathDomain::Public)
                    }
                    SimpleType::StoragePath => p.domain == PathDomain::Storage,
                    SimpleType::PublicPath => p.domain == PathDomain::Public,
                    SimpleType::PrivatePath => p.domain == PathDomain::Private,
                    _ => false,
                };
                if !ok {
                    return Err(CcfError::new(ErrorCode::PathDomainMismatch, p_off));
                }
                Value::Path(p)
            }

            SimpleType::Meta => {
                if self.r.take_null() {
                    Value::TypeValue(None)
                } else {
                    let mut ns = BTreeMap::new();
                    Value::TypeValue(Some(self.parse_type_value(&mut ns, depth + 1)?))
                }
            }
            SimpleType::Function => {
                let off = self.r.pos();
                let mut ns = BTreeMap::new();
                match self.parse_type_value(&mut ns, depth + 1)? {
                    Type::Function(ft) => Value::Function(ft),
                    _ => return Err(CcfError::new(ErrorCode::UnexpectedItem, off)),
                }
            }

            // Never has no values; abstract simple types never reach a bare
            // position.
            SimpleType::Never => {
                return Err(CcfError::new(ErrorCode::UnexpectedItem, self.r.pos()))
            }
            _ => return Err(CcfError::new(ErrorCode::Internal, self.r.pos())),
        })
    }

    fn parse_i64_range<T: TryFrom<i64>>(&mut self) -> Result<T, CcfError> {
        let (v, off) = self.r.read_i64()?;
        T::try_from(v).map_err(|_| CcfError::new(ErrorCode::IntegerOutOfRange, off))
    }

    fn parse_u64_range<T: TryFrom<u64>>(&mut self) -> Result<T, CcfError> {
        let (v, off) = self.r.read_u64()?;
        T::try_from(v).map_err(|_| CcfError::new(ErrorCode::IntegerOutOfRange, off))
    }

    fn parse_unsigned_big_128(&mut self) -> Result<u128, CcfError> {
        let (negative, magnitude, off) = self.r.read_bignum()?;
        if negative {
            return Err(CcfError::new(ErrorCode::NegativeUnsigned, off));
        }
        BigInt::from_wire_parts(false, magnitude)
            .to_u128()
            .ok_or_else(|| CcfError::new(ErrorCode::MagnitudeOutOfRange, off))
    }

    fn parse_unsigned_big_256(&mut self) -> Result<BigInt, CcfError> {
        let (negative, magnitude, off) = self.r.read_bignum()?;
        if negative {
            return Err(CcfError::new(ErrorCode::NegativeUnsigned, off));
        }
        if magnitude.len() > UINT256_MAX_LEN {
            return Err(CcfError::new(ErrorCode::MagnitudeOutOfRange, off));
        }
        Ok(BigInt::from_wire_parts(false, magnitude))
    }

    fn parse_path(&mut self) -> Result<PathValue, CcfError> {
        self.r.read_array_exact(2)?;
        let (code, off) = self.r.read_u64()?;
        let domain = PathDomain::from_code(code)
            .ok_or_else(|| CcfError::new(ErrorCode::InvalidPathDomain, off))?;
        let (identifier, _) = self.r.read_text()?;
        Ok(PathValue {
            domain,
            identifier: identifier.to_string(),
        })
    }

    /// Shallow check that a decoded runtime type is a member of the
    /// abstract static type it appeared under.
    fn runtime_satisfies(&self, rt: &Type, st: &Type) -> bool {
        let Type::Simple(s) = st else {
            // Restricted and interface statics accept any composite.
            return match st {
                Type::Restricted { .. } => true,
                Type::Composite(_) => matches!(rt, Type::Composite(_)),
                _ => true,
            };
        };
        let rt_simple = match rt {
            Type::Simple(r) => Some(*r),
            _ => None,
        };
        match s {
            SimpleType::Any => true,
            SimpleType::AnyStruct | SimpleType::AnyStructAttachment => !self.is_resource_type(rt),
            SimpleType::AnyResource | SimpleType::AnyResourceAttachment => {
                self.is_resource_type(rt)
            }
            SimpleType::Number => rt_simple.is_some_and(is_numeric),
            SimpleType::SignedNumber => rt_simple.is_some_and(is_signed_numeric),
            SimpleType::Integer => rt_simple.is_some_and(is_integer),
            SimpleType::SignedInteger => rt_simple.is_some_and(is_signed_integer),
            SimpleType::FixedPoint => {
                matches!(rt_simple, Some(SimpleType::Fix64 | SimpleType::UFix64))
            }
            SimpleType::SignedFixedPoint => matches!(rt_simple, Some(SimpleType::Fix64)),
            _ => true,
        }
    }

    fn is_resource_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Composite(id) => self.pool.get(*id).is_some_and(|d| {
                matches!(
                    d.kind,
                    CompositeKind::Resource | CompositeKind::ResourceInterface
                )
            }),
            _ => false,
        }
    }

    // --- type values ------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn parse_type_value(
        &mut self,
        ns: &mut BTreeMap<Vec<u8>, CompositeId>,
        depth: usize,
    ) -> Result<Type, CcfError> {
        self.r.ensure_depth(depth, self.r.pos())?;
        let (tag, off) = self.r.read_tag()?;
        Ok(match tag {
            tags::SIMPLE_TYPE_VALUE => {
                let (id, id_off) = self.r.read_u64()?;
                let st = SimpleType::from_id(id)
                    .ok_or_else(|| CcfError::new(ErrorCode::UnknownSimpleTypeId, id_off))?;
                Type::Simple(st)
            }
            tags::OPTIONAL_TYPE_VALUE => Type::optional(self.parse_type_value(ns, depth + 1)?),
            tags::VARSIZED_ARRAY_TYPE_VALUE => {
                Type::var_array(self.parse_type_value(ns, depth + 1)?)
            }
            tags::CONSTSIZED_ARRAY_TYPE_VALUE => {
                self.r.read_array_exact(2)?;
                let (size, _) = self.r.read_u64()?;
                Type::const_array(size, self.parse_type_value(ns, depth + 1)?)
            }
            tags::DICT_TYPE_VALUE => {
                self.r.read_array_exact(2)?;
                let key = self.parse_type_value(ns, depth + 1)?;
                let value = self.parse_type_value(ns, depth + 1)?;
                Type::dictionary(key, value)
            }
            tags::REFERENCE_TYPE_VALUE => {
                self.r.read_array_exact(2)?;
                let (authorized, _) = self.r.read_bool()?;
                Type::Reference {
                    authorized,
                    referenced: Box::new(self.parse_type_value(ns, depth + 1)?),
                }
            }
            tags::RESTRICTED_TYPE_VALUE => {
                self.r.read_array_exact(3)?;
                // The composed type id is carried on the wire but is
                // derivable; it is validated only for UTF-8.
                let _ = self.r.read_text()?;
                let base = self.parse_type_value(ns, depth + 1)?;
                let (count, r_off) = self.r.read_array()?;
                let mut restrictions = Vec::new();
                restrictions
                    .try_reserve_exact(count)
                    .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, r_off))?;
                let mut prev_id: Option<String> = None;
                for _ in 0..count {
                    let e_off = self.r.pos();
                    let r_ty = self.parse_type_value(ns, depth + 1)?;
                    let r_id = r_ty.id_string(&self.pool);
                    if let Some(prev) = &prev_id {
                        if prev == &r_id {
                            return Err(CcfError::new(ErrorCode::DuplicateRestriction, e_off));
                        }
                        if prev.as_bytes() > r_id.as_bytes() {
                            return Err(CcfError::new(ErrorCode::RestrictionOrder, e_off));
                        }
                    }
                    prev_id = Some(r_id);
                    restrictions.push(r_ty);
                }
                Type::Restricted {
                    base: Box::new(base),
                    restrictions,
                }
            }
            tags::CAPABILITY_TYPE_VALUE => {
                self.r.read_array_exact(1)?;
                let borrow = if self.r.take_null() {
                    None
                } else {
                    Some(Box::new(self.parse_type_value(ns, depth + 1)?))
                };
                Type::Capability { borrow }
            }
            tags::FUNCTION_TYPE_VALUE => {
                self.r.read_array_exact(3)?;
                let (type_id, _) = self.r.read_text()?;
                let type_id = type_id.to_string();
                let parameters = self.parse_parameters(ns, depth)?;
                let return_type = self.parse_type_value(ns, depth + 1)?;
                Type::Function(Box::new(FunctionType {
                    type_id,
                    parameters,
                    return_type,
                }))
            }
            tags::TYPE_VALUE_REF => {
                let (id_bytes, id_off) = self.r.read_bytes()?;
                let cid = ns
                    .get(id_bytes)
                    .copied()
                    .ok_or_else(|| CcfError::new(ErrorCode::UnknownTypeValueRef, id_off))?;
                Type::Composite(cid)
            }
            tags::STRUCT_TYPE_VALUE
            | tags::RESOURCE_TYPE_VALUE
            | tags::EVENT_TYPE_VALUE
            | tags::CONTRACT_TYPE_VALUE
            | tags::ENUM_TYPE_VALUE
            | tags::ATTACHMENT_TYPE_VALUE
            | tags::STRUCT_INTERFACE_TYPE_VALUE
            | tags::RESOURCE_INTERFACE_TYPE_VALUE
            | tags::CONTRACT_INTERFACE_TYPE_VALUE => {
                let kind = match tag {
                    tags::STRUCT_TYPE_VALUE => CompositeKind::Struct,
                    tags::RESOURCE_TYPE_VALUE => CompositeKind::Resource,
                    tags::EVENT_TYPE_VALUE => CompositeKind::Event,
                    tags::CONTRACT_TYPE_VALUE => CompositeKind::Contract,
                    tags::ENUM_TYPE_VALUE => CompositeKind::Enum,
                    tags::ATTACHMENT_TYPE_VALUE => CompositeKind::Attachment,
                    tags::STRUCT_INTERFACE_TYPE_VALUE => CompositeKind::StructInterface,
                    tags::RESOURCE_INTERFACE_TYPE_VALUE => CompositeKind::ResourceInterface,
                    _ => CompositeKind::ContractInterface,
                };
                self.parse_composite_type_value(kind, ns, depth)?
            }
            _ => return Err(CcfError::new(ErrorCode::UnknownTag, off)),
        })
    }

    fn parse_composite_type_value(
        &mut self,
        kind: CompositeKind,
        ns: &mut BTreeMap<Vec<u8>, CompositeId>,
        depth: usize,
    ) -> Result<Type, CcfError> {
        self.r.read_array_exact(5)?;
        let (id_bytes, id_off) = self.r.read_bytes()?;
        let id_bytes = id_bytes.to_vec();
        let (type_id, tid_off) = self.r.read_text()?;
        let type_id = type_id.to_string();
        validate_composite_type_id(&type_id).map_err(|code| CcfError::new(code, tid_off))?;

        if ns.contains_key(&id_bytes) {
            return Err(CcfError::new(ErrorCode::DuplicateTypeDefId, id_off));
        }
        // A type value naming an already described composite reuses its
        // definition; the payloads are reconciled below.
        let cid = match self.pool.find(&type_id) {
            Some(existing) => existing,
            None => self.pool.insert(CompositeType {
                kind,
                type_id: type_id.clone(),
                raw_type: None,
                fields: Vec::new(),
                initializers: Vec::new(),
            }),
        };
        // Register before parsing the payload so self-references resolve.
        ns.insert(id_bytes, cid);

        let raw_type = if self.r.take_null() {
            None
        } else {
            Some(self.parse_type_value(ns, depth + 1)?)
        };

        let (field_count, f_off) = self.r.read_array()?;
        let mut fields = Vec::new();
        fields
            .try_reserve_exact(field_count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, f_off))?;
        for _ in 0..field_count {
            self.r.read_array_exact(2)?;
            let (name, _) = self.r.read_text()?;
            let name = name.to_string();
            let ty = self.parse_type_value(ns, depth + 1)?;
            fields.push(Field { name, ty });
        }

        let (init_count, i_off) = self.r.read_array()?;
        let mut initializers = Vec::new();
        initializers
            .try_reserve_exact(init_count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, i_off))?;
        for _ in 0..init_count {
            initializers.push(self.parse_parameters(ns, depth)?);
        }

        // Reconcile with any earlier description of the same type id. A
        // table definition never carries initializers (and interface
        // definitions never carry fields), so empty slots are filled from
        // the type value; any conflicting non-empty slot means the message
        // describes the same type twice in incompatible ways.
        let def = self
            .pool
            .get_mut(cid)
            .ok_or_else(|| CcfError::new(ErrorCode::Internal, self.r.pos()))?;
        if def.kind != kind {
            return Err(CcfError::new(ErrorCode::DuplicateTypeDefId, tid_off));
        }
        if let Some(parsed) = raw_type {
            match &def.raw_type {
                None => def.raw_type = Some(parsed),
                Some(existing) => {
                    if *existing != parsed {
                        return Err(CcfError::new(ErrorCode::DuplicateTypeDefId, tid_off));
                    }
                }
            }
        }
        if def.fields.is_empty() {
            def.fields = fields;
        } else if !fields.is_empty() && def.fields != fields {
            return Err(CcfError::new(ErrorCode::DuplicateTypeDefId, tid_off));
        }
        if def.initializers.is_empty() {
            def.initializers = initializers;
        } else if !initializers.is_empty() && def.initializers != initializers {
            return Err(CcfError::new(ErrorCode::DuplicateTypeDefId, tid_off));
        }
        Ok(Type::Composite(cid))
    }

    fn parse_parameters(
        &mut self,
        ns: &mut BTreeMap<Vec<u8>, CompositeId>,
        depth: usize,
    ) -> Result<Vec<Parameter>, CcfError> {
        let (count, off) = self.r.read_array()?;
        let mut params = Vec::new();
        params
            .try_reserve_exact(count)
            .map_err(|_| CcfError::new(ErrorCode::AllocationFailed, off))?;
        for _ in 0..count {
            self.r.read_array_exact(3)?;
            let (label, _) = self.r.read_text()?;
            let label = label.to_string();
            let (identifier, _) = self.r.read_text()?;
            let identifier = identifier.to_string();
            let ty = self.parse_type_value(ns, depth + 1)?;
            params.push(Parameter {
                label,
                identifier,
                ty,
            });
        }
        Ok(params)
    }
}

/// Reconstruct a nil under an optional whose inner type is `inner`: each
/// further optional layer adds a `Some` wrapper around the innermost nil.
fn nil_at_depth(inner: &Type) -> Value {
    match inner {
        Type::Optional(next) => Value::some(nil_at_depth(next)),
        _ => Value::Optional(None),
    }
}

fn is_numeric(s: SimpleType) -> bool {
    is_integer(s) || matches!(s, SimpleType::Fix64 | SimpleType::UFix64)
}

fn is_signed_numeric(s: SimpleType) -> bool {
    is_signed_integer(s) || matches!(s, SimpleType::Fix64)
}

fn is_integer(s: SimpleType) -> bool {
    matches!(
        s,
        SimpleType::Int
            | SimpleType::Int8
            | SimpleType::Int16
            | SimpleType::Int32
            | SimpleType::Int64
            | SimpleType::Int128
            | SimpleType::Int256
            | SimpleType::UInt
            | SimpleType::UInt8
            | SimpleType::UInt16
            | SimpleType::UInt32
            | SimpleType::UInt64
            | SimpleType::UInt128
            | SimpleType::UInt256
            | SimpleType::Word8
            | SimpleType::Word16
            | SimpleType::Word32
            | SimpleType::Word64
            | SimpleType::Word128
            | SimpleType::Word256
    )
}

fn is_signed_integer(s: SimpleType) -> bool {
    matches!(
        s,
        SimpleType::Int
            | SimpleType::Int8
            | SimpleType::Int16
            | SimpleType::Int32
            | SimpleType::Int64
            | SimpleType::Int128
            | SimpleType::Int256
    )
}
