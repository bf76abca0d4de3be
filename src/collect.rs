//! The type graph collector.
//!
//! Walks a value and its static type once, discovers every user-defined
//! composite type that will appear on the wire, and assigns each a stable
//! byte-string identifier. The discovered definitions are sorted by their
//! cadence type id (lexicographic over UTF-8 bytes); the identifier is the
//! minimal big-endian encoding of the 0-based table index, which is what
//! makes the output byte-identical regardless of discovery order.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::bigint::minimal_be_u64;
use crate::error::{CcfError, ErrorCode};
use crate::limits::DEFAULT_MAX_DEPTH;
use crate::types::{CompositeId, Type, TypePool};
use crate::value::Value;

/// The sorted type-definition table of a single encode call.
pub(crate) struct DefTable {
    /// Table entries in canonical (cadence-type-id-sorted) order.
    entries: Vec<CompositeId>,
    /// Cadence type id -> table index, covering every discovered composite.
    positions: BTreeMap<String, usize>,
}

impl DefTable {
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> &[CompositeId] {
        &self.entries
    }

    /// The assigned identifier bytes for a discovered composite.
    pub(crate) fn id_bytes(&self, pool: &TypePool, id: CompositeId) -> Option<Vec<u8>> {
        let def = pool.get(id)?;
        let index = *self.positions.get(def.type_id.as_str())?;
        Some(minimal_be_u64(index as u64))
    }
}

/// Collect the type-definition table for `(ty, value)`.
pub(crate) fn collect(pool: &TypePool, ty: &Type, value: &Value) -> Result<DefTable, CcfError> {
    let mut c = Collector {
        pool,
        seen: BTreeMap::new(),
    };
    c.visit_type(ty, 0)?;
    c.visit_value(value, ty, 0)?;

    let mut entries: Vec<(String, CompositeId)> = c.seen.into_iter().collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut positions = BTreeMap::new();
    let mut sorted = Vec::with_capacity(entries.len());
    for (index, (type_id, id)) in entries.into_iter().enumerate() {
        positions.insert(type_id, index);
        sorted.push(id);
    }
    Ok(DefTable {
        entries: sorted,
        positions,
    })
}

struct Collector<'a> {
    pool: &'a TypePool,
    /// Cadence type id -> first composite discovered under that id.
    seen: BTreeMap<String, CompositeId>,
}

impl Collector<'_> {
    fn depth_check(depth: usize) -> Result<(), CcfError> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(CcfError::new(ErrorCode::DepthLimitExceeded, 0));
        }
        Ok(())
    }

    fn visit_type(&mut self, ty: &Type, depth: usize) -> Result<(), CcfError> {
        Self::depth_check(depth)?;
        match ty {
            Type::Simple(_) => Ok(()),
            Type::Optional(inner) | Type::VarArray(inner) => self.visit_type(inner, depth + 1),
            Type::ConstArray { element, .. } => self.visit_type(element, depth + 1),
            Type::Dictionary { key, value } => {
                self.visit_type(key, depth + 1)?;
                self.visit_type(value, depth + 1)
            }
            Type::Composite(id) => self.visit_composite(*id, depth),
            Type::Reference { referenced, .. } => self.visit_type(referenced, depth + 1),
            Type::Restricted { base, restrictions } => {
                self.visit_type(base, depth + 1)?;
                for r in restrictions {
                    self.visit_type(r, depth + 1)?;
                }
                Ok(())
            }
            Type::Capability { borrow } => match borrow {
                Some(b) => self.visit_type(b, depth + 1),
                None => Ok(()),
            },
            // Function types appear only inside type values, which carry
            // their own identifier namespace and never use the table.
            Type::Function(_) => Ok(()),
        }
    }

    fn visit_composite(&mut self, id: CompositeId, depth: usize) -> Result<(), CcfError> {
        Self::depth_check(depth)?;
        let def = self
            .pool
            .get(id)
            .ok_or_else(|| CcfError::new(ErrorCode::Internal, 0))?;
        if self.seen.contains_key(def.type_id.as_str()) {
            return Ok(());
        }
        self.seen.insert(def.type_id.clone(), id);
        if let Some(raw) = &def.raw_type {
            self.visit_type(raw, depth + 1)?;
        }
        for field in def.data_fields() {
            self.visit_type(&field.ty, depth + 1)?;
        }
        Ok(())
    }

    /// Walk the value exactly the way the encoder will, so that every
    /// runtime type emitted in an inline-type wrapper is in the table.
    fn visit_value(&mut self, value: &Value, ty: &Type, depth: usize) -> Result<(), CcfError> {
        Self::depth_check(depth)?;
        if ty.is_abstract(self.pool) {
            let rt = value
                .runtime_type(self.pool)
                .map_err(|code| CcfError::new(code, 0))?;
            self.visit_type(&rt, depth + 1)?;
            return self.visit_bare(value, &rt, depth);
        }
        self.visit_bare(value, ty, depth)
    }

    fn visit_bare(&mut self, value: &Value, ty: &Type, depth: usize) -> Result<(), CcfError> {
        match (ty, value) {
            (Type::Optional(inner), Value::Optional(Some(v))) => {
                self.visit_value(v, inner, depth + 1)
            }
            (Type::VarArray(element) | Type::ConstArray { element, .. }, Value::Array(a)) => {
                for e in &a.elements {
                    self.visit_value(e, element, depth + 1)?;
                }
                Ok(())
            }
            (Type::Dictionary { key, value: val }, Value::Dictionary(d)) => {
                for entry in &d.entries {
                    self.visit_value(&entry.key, key, depth + 1)?;
                    self.visit_value(&entry.value, val, depth + 1)?;
                }
                Ok(())
            }
            (Type::Composite(id), Value::Composite(cv)) => {
                self.visit_composite(*id, depth)?;
                let def = self
                    .pool
                    .get(*id)
                    .ok_or_else(|| CcfError::new(ErrorCode::Internal, 0))?;
                let declared: Vec<(String, Type)> = def
                    .data_fields()
                    .map(|f| (f.name.clone(), f.ty.clone()))
                    .collect();
                for (name, field_ty) in &declared {
                    if let Some(f) = cv.fields.iter().find(|f| &f.name == name) {
                        self.visit_value(&f.value, field_ty, depth + 1)?;
                    }
                }
                Ok(())
            }
            // Type values and function values have their own namespace;
            // everything else is a leaf.
            _ => Ok(()),
        }
    }
}
