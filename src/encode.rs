//! The value encoder.
//!
//! A single recursive walk parameterized by the static type expected at
//! each position. At every position the encoder applies the inline-type
//! rule: concrete static types emit the bare value, abstract static types
//! wrap the value as `type-and-value([runtime-type, value])`.
//!
//! Encoding is atomic: on error nothing is returned, and the output buffer
//! is discarded with the error.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::bigint::{
    cmp_magnitudes, minimal_be_u64, BigInt, INT256_MAX_MAG, UINT256_MAX_LEN,
};
use crate::collect::{collect, DefTable};
use crate::error::{CcfError, ErrorCode};
use crate::limits::DEFAULT_MAX_DEPTH;
use crate::order::cmp_encoded_keys;
use crate::tags;
use crate::tags::SimpleType;
use crate::types::{CompositeId, CompositeKind, FunctionType, Parameter, Type, TypePool};
use crate::value::{CapabilityTarget, CapabilityValue, CompositeValue, PathValue, Value};
use crate::writer::Writer;

/// Encode `value` with static type `ty` into a single CCF message.
///
/// The encoding is deterministic: equal inputs produce byte-identical
/// output. Dictionary entries and composite fields may be given in any
/// order; the encoder sorts dictionary keys into canonical order and
/// permutes composite fields into the declaration order of their type.
///
/// # Errors
///
/// Fails atomically if the value does not satisfy `ty`, a container in an
/// abstract position carries no runtime type, a numeric value is out of
/// range, or nesting exceeds the depth limit.
pub fn encode(pool: &TypePool, ty: &Type, value: &Value) -> Result<Vec<u8>, CcfError> {
    let table = collect(pool, ty, value)?;
    let enc = Encoder {
        pool,
        table: &table,
    };
    let mut w = Writer::with_capacity(64);

    if table.is_empty() {
        w.tag(tags::TYPE_AND_VALUE);
        w.array(2)?;
    } else {
        w.tag(tags::TYPE_DEF_AND_VALUE);
        w.array(2)?;
        w.array(table.len())?;
        for &id in table.entries() {
            enc.type_def(&mut w, id)?;
        }
        w.array(2)?;
    }
    enc.inline_type(&mut w, ty)?;
    enc.value(&mut w, value, ty, 0)?;
    Ok(w.into_vec())
}

struct Encoder<'a> {
    pool: &'a TypePool,
    table: &'a DefTable,
}

impl Encoder<'_> {
    fn err(w: &Writer, code: ErrorCode) -> CcfError {
        CcfError::new(code, w.position())
    }

    fn composite(&self, w: &Writer, id: CompositeId) -> Result<&crate::types::CompositeType, CcfError> {
        self.pool
            .get(id)
            .ok_or_else(|| Self::err(w, ErrorCode::Internal))
    }

    // --- type definitions -------------------------------------------------

    fn type_def(&self, w: &mut Writer, id: CompositeId) -> Result<(), CcfError> {
        let def = self.composite(w, id)?;
        let id_bytes = self
            .table
            .id_bytes(self.pool, id)
            .ok_or_else(|| Self::err(w, ErrorCode::Internal))?;

        let tag = match def.kind {
            CompositeKind::Struct => tags::STRUCT_TYPE,
            CompositeKind::Resource => tags::RESOURCE_TYPE,
            CompositeKind::Event => tags::EVENT_TYPE,
            CompositeKind::Contract => tags::CONTRACT_TYPE,
            CompositeKind::Enum => tags::ENUM_TYPE,
            CompositeKind::Attachment => tags::ATTACHMENT_TYPE,
            CompositeKind::StructInterface => tags::STRUCT_INTERFACE_TYPE,
            CompositeKind::ResourceInterface => tags::RESOURCE_INTERFACE_TYPE,
            CompositeKind::ContractInterface => tags::CONTRACT_INTERFACE_TYPE,
        };
        w.tag(tag);

        if def.kind.is_interface() {
            w.array(2)?;
            w.bytes(&id_bytes)?;
            w.text(&def.type_id)?;
            return Ok(());
        }

        if def.kind == CompositeKind::Enum {
            let raw = def
                .raw_type
                .as_ref()
                .ok_or_else(|| Self::err(w, ErrorCode::TypeMismatch))?;
            w.array(4)?;
            w.bytes(&id_bytes)?;
            w.text(&def.type_id)?;
            self.inline_type(w, raw)?;
        } else {
            w.array(3)?;
            w.bytes(&id_bytes)?;
            w.text(&def.type_id)?;
        }

        w.array(def.data_field_count())?;
        for field in def.data_fields() {
            w.array(2)?;
            w.text(&field.name)?;
            self.inline_type(w, &field.ty)?;
        }
        Ok(())
    }

    // --- inline (static) types --------------------------------------------

    fn inline_type(&self, w: &mut Writer, ty: &Type) -> Result<(), CcfError> {
        match ty {
            Type::Simple(s) => {
                w.tag(tags::SIMPLE_TYPE);
                w.uint(s.id());
            }
            Type::Optional(inner) => {
                w.tag(tags::OPTIONAL_TYPE);
                self.inline_type(w, inner)?;
            }
            Type::VarArray(element) => {
                w.tag(tags::VARSIZED_ARRAY_TYPE);
                self.inline_type(w, element)?;
            }
            Type::ConstArray { size, element } => {
                w.tag(tags::CONSTSIZED_ARRAY_TYPE);
                w.array(2)?;
                w.uint(*size);
                self.inline_type(w, element)?;
            }
            Type::Dictionary { key, value } => {
                w.tag(tags::DICT_TYPE);
                w.array(2)?;
                self.inline_type(w, key)?;
                self.inline_type(w, value)?;
            }
            Type::Composite(id) => {
                let id_bytes = self
                    .table
                    .id_bytes(self.pool, *id)
                    .ok_or_else(|| Self::err(w, ErrorCode::Internal))?;
                w.tag(tags::TYPE_REF);
                w.bytes(&id_bytes)?;
            }
            Type::Reference {
                authorized,
                referenced,
            } => {
                w.tag(tags::REFERENCE_TYPE);
                w.array(2)?;
                w.bool(*authorized);
                self.inline_type(w, referenced)?;
            }
            Type::Restricted { base, restrictions } => {
                w.tag(tags::RESTRICTED_TYPE);
                w.array(2)?;
                self.inline_type(w, base)?;
                let sorted = self.sorted_restrictions(w, restrictions)?;
                w.array(sorted.len())?;
                for r in sorted {
                    self.inline_type(w, r)?;
                }
            }
            Type::Capability { borrow } => {
                w.tag(tags::CAPABILITY_TYPE);
                w.array(1)?;
                match borrow {
                    Some(b) => self.inline_type(w, b)?,
                    None => w.null(),
                }
            }
            // Function types exist only in type-value form.
            Type::Function(_) => return Err(Self::err(w, ErrorCode::TypeMismatch)),
        }
        Ok(())
    }

    /// Sort a restriction list by cadence type id, rejecting duplicates.
    fn sorted_restrictions<'t>(
        &self,
        w: &Writer,
        restrictions: &'t [Type],
    ) -> Result<Vec<&'t Type>, CcfError> {
        let mut keyed: Vec<(String, &'t Type)> = restrictions
            .iter()
            .map(|r| (r.id_string(self.pool), r))
            .collect();
        keyed.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        for pair in keyed.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Self::err(w, ErrorCode::DuplicateRestriction));
            }
        }
        Ok(keyed.into_iter().map(|(_, r)| r).collect())
    }

    // --- values -----------------------------------------------------------

    fn value(
        &self,
        w: &mut Writer,
        value: &Value,
        ty: &Type,
        depth: usize,
    ) -> Result<(), CcfError> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(Self::err(w, ErrorCode::DepthLimitExceeded));
        }
        if ty.is_abstract(self.pool) {
            let rt = value
                .runtime_type(self.pool)
                .map_err(|code| Self::err(w, code))?;
            w.tag(tags::TYPE_AND_VALUE);
            w.array(2)?;
            self.inline_type(w, &rt)?;
            return self.bare_value(w, value, &rt, depth);
        }
        self.bare_value(w, value, ty, depth)
    }

    fn bare_value(
        &self,
        w: &mut Writer,
        value: &Value,
        ty: &Type,
        depth: usize,
    ) -> Result<(), CcfError> {
        match (ty, value) {
            (Type::Simple(s), _) => self.simple_value(w, *s, value, depth),
            (Type::Optional(inner), Value::Optional(opt)) => match opt {
                None => {
                    w.null();
                    Ok(())
                }
                Some(v) => self.value(w, v, inner, depth + 1),
            },
            (Type::VarArray(element), Value::Array(a)) => {
                w.array(a.elements.len())?;
                for e in &a.elements {
                    self.value(w, e, element, depth + 1)?;
                }
                Ok(())
            }
            (Type::ConstArray { size, element }, Value::Array(a)) => {
                if a.elements.len() as u64 != *size {
                    return Err(Self::err(w, ErrorCode::ArrayLenMismatch));
                }
                w.array(a.elements.len())?;
                for e in &a.elements {
                    self.value(w, e, element, depth + 1)?;
                }
                Ok(())
            }
            (Type::Dictionary { key, value: val }, Value::Dictionary(d)) => {
                self.dictionary(w, &d.entries, key, val, depth)
            }
            (Type::Composite(id), Value::Composite(cv)) => {
                self.composite_value(w, *id, cv, depth)
            }
            (Type::Capability { .. }, Value::Capability(cap)) => self.capability(w, cap),
            _ => Err(Self::err(w, ErrorCode::TypeMismatch)),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn simple_value(
        &self,
        w: &mut Writer,
        st: SimpleType,
        value: &Value,
        depth: usize,
    ) -> Result<(), CcfError> {
        match (st, value) {
            (SimpleType::Void, Value::Void) => w.null(),
            (SimpleType::Bool, Value::Bool(b)) => w.bool(*b),
            (SimpleType::String, Value::String(s)) => w.text(s)?,
            (SimpleType::Character, Value::Character(c)) => {
                if !crate::value::is_single_grapheme(c) {
                    return Err(Self::err(w, ErrorCode::NotSingleGrapheme));
                }
                w.text(c)?;
            }
            (SimpleType::Address, Value::Address(a)) => w.bytes(a)?,

            (SimpleType::Int, Value::Int(big)) => {
                let (negative, magnitude) = big.wire_parts();
                w.bignum(negative, &magnitude)?;
            }
            (SimpleType::Int8, Value::Int8(v)) => w.int(i64::from(*v)),
            (SimpleType::Int16, Value::Int16(v)) => w.int(i64::from(*v)),
            (SimpleType::Int32, Value::Int32(v)) => w.int(i64::from(*v)),
            (SimpleType::Int64, Value::Int64(v)) => w.int(*v),
            (SimpleType::Int128, Value::Int128(v)) => Self::bignum_i128(w, *v)?,
            (SimpleType::Int256, Value::Int256(big)) => {
                let (negative, magnitude) = big.wire_parts();
                if cmp_magnitudes(&magnitude, &INT256_MAX_MAG).is_gt() {
                    return Err(Self::err(w, ErrorCode::MagnitudeOutOfRange));
                }
                w.bignum(negative, &magnitude)?;
            }

            (SimpleType::UInt, Value::UInt(big)) => {
                if big.is_negative() {
                    return Err(Self::err(w, ErrorCode::NegativeUnsigned));
                }
                w.bignum(false, big.magnitude())?;
            }
            (SimpleType::UInt8, Value::UInt8(v)) => w.uint(u64::from(*v)),
            (SimpleType::UInt16, Value::UInt16(v)) => w.uint(u64::from(*v)),
            (SimpleType::UInt32, Value::UInt32(v)) => w.uint(u64::from(*v)),
            (SimpleType::UInt64, Value::UInt64(v)) => w.uint(*v),
            (SimpleType::UInt128, Value::UInt128(v)) => Self::bignum_u128(w, *v)?,
            (SimpleType::UInt256, Value::UInt256(big)) => {
                Self::unsigned_big(w, big, UINT256_MAX_LEN)?;
            }

            (SimpleType::Word8, Value::Word8(v)) => w.uint(u64::from(*v)),
            (SimpleType::Word16, Value::Word16(v)) => w.uint(u64::from(*v)),
            (SimpleType::Word32, Value::Word32(v)) => w.uint(u64::from(*v)),
            (SimpleType::Word64, Value::Word64(v)) => w.uint(*v),
            (SimpleType::Word128, Value::Word128(v)) => Self::bignum_u128(w, *v)?,
            (SimpleType::Word256, Value::Word256(big)) => {
                Self::unsigned_big(w, big, UINT256_MAX_LEN)?;
            }

            (SimpleType::Fix64, Value::Fix64(v)) => w.int(*v),
            (SimpleType::UFix64, Value::UFix64(v)) => w.uint(*v),

            (
                SimpleType::Path
                | SimpleType::CapabilityPath
                | SimpleType::StoragePath
                | SimpleType::PublicPath
                | SimpleType::PrivatePath,
                Value::Path(p),
            ) => {
                Self::check_path_domain(w, st, p)?;
                Self::path(w, p)?;
            }

            (SimpleType::Meta, Value::TypeValue(tv)) => match tv {
                None => w.null(),
                Some(t) => {
                    let mut ns = TypeValueNamespace::default();
                    self.type_value(w, t, &mut ns, depth + 1)?;
                }
            },
            (SimpleType::Function, Value::Function(ft)) => {
                let mut ns = TypeValueNamespace::default();
                self.function_type_value(w, ft, &mut ns, depth + 1)?;
            }

            _ => return Err(Self::err(w, ErrorCode::TypeMismatch)),
        }
        Ok(())
    }

    #[allow(clippy::cast_sign_loss)]
    fn bignum_i128(w: &mut Writer, v: i128) -> Result<(), CcfError> {
        if v >= 0 {
            Self::bignum_u128(w, v as u128)
        } else {
            let n = (-1 - v) as u128;
            let bytes = n.to_be_bytes();
            let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
            w.bignum(true, &bytes[first..])
        }
    }

    fn bignum_u128(w: &mut Writer, v: u128) -> Result<(), CcfError> {
        let bytes = v.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        w.bignum(false, &bytes[first..])
    }

    fn unsigned_big(w: &mut Writer, big: &BigInt, max_len: usize) -> Result<(), CcfError> {
        if big.is_negative() {
            return Err(Self::err(w, ErrorCode::NegativeUnsigned));
        }
        if big.magnitude().len() > max_len {
            return Err(Self::err(w, ErrorCode::MagnitudeOutOfRange));
        }
        w.bignum(false, big.magnitude())
    }

    fn check_path_domain(w: &Writer, st: SimpleType, p: &PathValue) -> Result<(), CcfError> {
        use crate::value::PathDomain;
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
        if ok {
            Ok(())
        } else {
            Err(Self::err(w, ErrorCode::PathDomainMismatch))
        }
    }

    fn path(w: &mut Writer, p: &PathValue) -> Result<(), CcfError> {
        w.array(2)?;
        w.uint(p.domain.code());
        w.text(&p.identifier)
    }

    fn capability(&self, w: &mut Writer, cap: &CapabilityValue) -> Result<(), CcfError> {
        w.array(2)?;
        w.bytes(&cap.address)?;
        match &cap.target {
            CapabilityTarget::Id(id) => {
                w.uint(*id);
                Ok(())
            }
            CapabilityTarget::Path(p) => Self::path(w, p),
        }
    }

    /// Encode a dictionary: encode every key once into a scratch buffer,
    /// sort entries by the canonical encoded-key order, then splice keys
    /// and encode values in that order.
    fn dictionary(
        &self,
        w: &mut Writer,
        entries: &[crate::value::DictEntry],
        key_ty: &Type,
        val_ty: &Type,
        depth: usize,
    ) -> Result<(), CcfError> {
        let mut keyed: Vec<(Vec<u8>, usize)> = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let mut kw = Writer::new();
            self.value(&mut kw, &entry.key, key_ty, depth + 1)?;
            keyed.push((kw.into_vec(), i));
        }
        keyed.sort_by(|a, b| cmp_encoded_keys(&a.0, &b.0));
        for pair in keyed.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Self::err(w, ErrorCode::DuplicateDictKey));
            }
        }

        let total = entries
            .len()
            .checked_mul(2)
            .ok_or_else(|| Self::err(w, ErrorCode::LengthOverflow))?;
        w.array(total)?;
        for (key_bytes, index) in keyed {
            w.push_raw(&key_bytes);
            self.value(w, &entries[index].value, val_ty, depth + 1)?;
        }
        Ok(())
    }

    /// Encode a composite body: field values in the declaration order of
    /// the type definition, permuting from whatever order the source
    /// carries.
    fn composite_value(
        &self,
        w: &mut Writer,
        id: CompositeId,
        cv: &CompositeValue,
        depth: usize,
    ) -> Result<(), CcfError> {
        if cv.type_ref != id {
            let same = match (self.pool.get(cv.type_ref), self.pool.get(id)) {
                (Some(a), Some(b)) => a.type_id == b.type_id,
                _ => false,
            };
            if !same {
                return Err(Self::err(w, ErrorCode::TypeMismatch));
            }
        }
        let def = self.composite(w, id)?;
        let declared: Vec<(&str, &Type)> = def
            .data_fields()
            .map(|f| (f.name.as_str(), &f.ty))
            .collect();

        if cv.fields.len() != declared.len() {
            for f in &cv.fields {
                if !declared.iter().any(|(name, _)| *name == f.name) {
                    return Err(Self::err(w, ErrorCode::UnknownFieldName));
                }
            }
            return Err(Self::err(w, ErrorCode::FieldCountMismatch));
        }

        w.array(declared.len())?;
        for (name, field_ty) in declared {
            let field = cv
                .fields
                .iter()
                .find(|f| f.name == name)
                .ok_or_else(|| Self::err(w, ErrorCode::MissingFieldName))?;
            self.value(w, &field.value, field_ty, depth + 1)?;
        }
        Ok(())
    }

    // --- type values ------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn type_value(
        &self,
        w: &mut Writer,
        ty: &Type,
        ns: &mut TypeValueNamespace,
        depth: usize,
    ) -> Result<(), CcfError> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(Self::err(w, ErrorCode::DepthLimitExceeded));
        }
        match ty {
            Type::Simple(s) => {
                w.tag(tags::SIMPLE_TYPE_VALUE);
                w.uint(s.id());
            }
            Type::Optional(inner) => {
                w.tag(tags::OPTIONAL_TYPE_VALUE);
                self.type_value(w, inner, ns, depth + 1)?;
            }
            Type::VarArray(element) => {
                w.tag(tags::VARSIZED_ARRAY_TYPE_VALUE);
                self.type_value(w, element, ns, depth + 1)?;
            }
            Type::ConstArray { size, element } => {
                w.tag(tags::CONSTSIZED_ARRAY_TYPE_VALUE);
                w.array(2)?;
                w.uint(*size);
                self.type_value(w, element, ns, depth + 1)?;
            }
            Type::Dictionary { key, value } => {
                w.tag(tags::DICT_TYPE_VALUE);
                w.array(2)?;
                self.type_value(w, key, ns, depth + 1)?;
                self.type_value(w, value, ns, depth + 1)?;
            }
            Type::Reference {
                authorized,
                referenced,
            } => {
                w.tag(tags::REFERENCE_TYPE_VALUE);
                w.array(2)?;
                w.bool(*authorized);
                self.type_value(w, referenced, ns, depth + 1)?;
            }
            Type::Restricted { base, restrictions } => {
                w.tag(tags::RESTRICTED_TYPE_VALUE);
                w.array(3)?;
                w.text(&ty.id_string(self.pool))?;
                self.type_value(w, base, ns, depth + 1)?;
                let sorted = self.sorted_restrictions(w, restrictions)?;
                w.array(sorted.len())?;
                for r in sorted {
                    self.type_value(w, r, ns, depth + 1)?;
                }
            }
            Type::Capability { borrow } => {
                w.tag(tags::CAPABILITY_TYPE_VALUE);
                w.array(1)?;
                match borrow {
                    Some(b) => self.type_value(w, b, ns, depth + 1)?,
                    None => w.null(),
                }
            }
            Type::Function(ft) => self.function_type_value(w, ft, ns, depth)?,
            Type::Composite(id) => {
                let def = self.composite(w, *id)?;
                if let Some(&assigned) = ns.assigned.get(def.type_id.as_str()) {
                    w.tag(tags::TYPE_VALUE_REF);
                    w.bytes(&minimal_be_u64(assigned))?;
                    return Ok(());
                }
                let assigned = ns.assigned.len() as u64;
                ns.assigned.insert(def.type_id.clone(), assigned);

                let tag = match def.kind {
                    CompositeKind::Struct => tags::STRUCT_TYPE_VALUE,
                    CompositeKind::Resource => tags::RESOURCE_TYPE_VALUE,
                    CompositeKind::Event => tags::EVENT_TYPE_VALUE,
                    CompositeKind::Contract => tags::CONTRACT_TYPE_VALUE,
                    CompositeKind::Enum => tags::ENUM_TYPE_VALUE,
                    CompositeKind::Attachment => tags::ATTACHMENT_TYPE_VALUE,
                    CompositeKind::StructInterface => tags::STRUCT_INTERFACE_TYPE_VALUE,
                    CompositeKind::ResourceInterface => tags::RESOURCE_INTERFACE_TYPE_VALUE,
                    CompositeKind::ContractInterface => tags::CONTRACT_INTERFACE_TYPE_VALUE,
                };
                w.tag(tag);
                w.array(5)?;
                w.bytes(&minimal_be_u64(assigned))?;
                w.text(&def.type_id)?;
                match &def.raw_type {
                    Some(raw) => self.type_value(w, raw, ns, depth + 1)?,
                    None => w.null(),
                }

                let fields: Vec<_> = def.data_fields().collect();
                w.array(fields.len())?;
                for field in fields {
                    w.array(2)?;
                    w.text(&field.name)?;
                    self.type_value(w, &field.ty, ns, depth + 1)?;
                }

                w.array(def.initializers.len())?;
                for params in &def.initializers {
                    self.parameters(w, params, ns, depth)?;
                }
            }
        }
        Ok(())
    }

    fn function_type_value(
        &self,
        w: &mut Writer,
        ft: &FunctionType,
        ns: &mut TypeValueNamespace,
        depth: usize,
    ) -> Result<(), CcfError> {
        w.tag(tags::FUNCTION_TYPE_VALUE);
        w.array(3)?;
        w.text(&ft.type_id)?;
        self.parameters(w, &ft.parameters, ns, depth)?;
        self.type_value(w, &ft.return_type, ns, depth + 1)
    }

    fn parameters(
        &self,
        w: &mut Writer,
        params: &[Parameter],
        ns: &mut TypeValueNamespace,
        depth: usize,
    ) -> Result<(), CcfError> {
        w.array(params.len())?;
        for p in params {
            w.array(3)?;
            w.text(&p.label)?;
            w.text(&p.identifier)?;
            self.type_value(w, &p.ty, ns, depth + 1)?;
        }
        Ok(())
    }
}

/// The identifier namespace local to one encoded type value: cadence type
/// id of each composite first occurrence, mapped to its assigned counter.
#[derive(Default)]
struct TypeValueNamespace {
    assigned: BTreeMap<String, u64>,
}
