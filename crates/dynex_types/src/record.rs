//! Synthesized record types and the process-wide record cache.
//!
//! A `new {...}` projection needs a concrete type whose properties are exactly
//! the projected `(name, type)` pairs. Structurally identical signatures must
//! map to the same type instance, even when requested from many threads at once.

use crate::descriptor::{Member, MethodSignature, TypeDescriptor};
use crate::types::Type;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dynex_core::text::TextSpan;
use dynex_diagnostics::{messages, RecordSynthesisError};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use unicode_xid::UnicodeXID;

/// One `(name, type)` pair of a record signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicProperty {
    pub name: String,
    pub ty: Type,
}

impl DynamicProperty {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

/// An ordered property list. Two signatures are equal when they have the same
/// length and the same names and types in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertySignature {
    properties: Vec<DynamicProperty>,
}

impl PropertySignature {
    pub fn new(properties: Vec<DynamicProperty>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &[DynamicProperty] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn validate(&self) -> Result<(), RecordSynthesisError> {
        for (i, property) in self.properties.iter().enumerate() {
            if !is_valid_property_name(&property.name) {
                return Err(RecordSynthesisError::new(
                    &messages::INVALID_PROPERTY_NAME,
                    &[&property.name],
                    TextSpan::default(),
                ));
            }
            if self.properties[..i].iter().any(|p| p.name == property.name) {
                return Err(RecordSynthesisError::new(
                    &messages::DUPLICATE_PROPERTY_NAME,
                    &[&property.name],
                    TextSpan::default(),
                ));
            }
        }
        Ok(())
    }
}

impl FromIterator<DynamicProperty> for PropertySignature {
    fn from_iter<I: IntoIterator<Item = DynamicProperty>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn is_valid_property_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_xid_start() => chars.all(|c| c.is_xid_continue()),
        _ => false,
    }
}

/// A record type synthesized at runtime. Exposes exactly its signature's
/// properties, in declaration order.
pub struct RecordType {
    id: usize,
    name: String,
    signature: PropertySignature,
}

impl RecordType {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &PropertySignature {
        &self.signature
    }

    pub fn properties(&self) -> &[DynamicProperty] {
        self.signature.properties()
    }

    /// Position of a property in the record layout.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties().iter().position(|p| p.name == name)
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("properties", &self.signature.properties)
            .finish()
    }
}

impl TypeDescriptor for RecordType {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Vec<Member> {
        self.properties()
            .iter()
            .map(|p| Member::new(p.name.clone(), p.ty.clone()))
            .collect()
    }

    fn member(&self, name: &str) -> Option<Member> {
        self.properties()
            .iter()
            .find(|p| p.name == name)
            .map(|p| Member::new(p.name.clone(), p.ty.clone()))
    }

    fn methods(&self, _name: &str) -> Vec<MethodSignature> {
        Vec::new()
    }
}

/// Thread-safe get-or-create cache of record types keyed by signature.
///
/// Entries are never mutated or evicted. Lookups of distinct signatures lock
/// distinct shards, so unrelated requests do not serialize.
#[derive(Default)]
pub struct RecordCache {
    records: DashMap<PropertySignature, Arc<RecordType>>,
    synthesized: AtomicUsize,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record type for `signature`, synthesizing it on first use.
    ///
    /// Concurrent calls with equal signatures all observe the same instance.
    /// A signature that fails validation is not cached.
    pub fn get_or_create(
        &self,
        signature: PropertySignature,
    ) -> Result<Arc<RecordType>, RecordSynthesisError> {
        if let Some(record) = self.records.get(&signature) {
            return Ok(Arc::clone(record.value()));
        }

        signature.validate()?;

        match self.records.entry(signature) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let id = self.synthesized.fetch_add(1, Ordering::Relaxed) + 1;
                let record = Arc::new(RecordType {
                    id,
                    name: format!("DynamicClass{}", id),
                    signature: entry.key().clone(),
                });
                tracing::debug!(
                    record = %record.name,
                    properties = record.properties().len(),
                    "synthesized record type"
                );
                entry.insert(Arc::clone(&record));
                Ok(record)
            }
        }
    }

    /// Number of distinct signatures currently cached.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of record types synthesized since creation.
    pub fn synthesized_count(&self) -> usize {
        self.synthesized.load(Ordering::Relaxed)
    }

    /// Drop every cached record type. Previously returned handles stay valid.
    pub fn reset(&self) {
        self.records.clear();
    }
}

impl fmt::Debug for RecordCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCache")
            .field("len", &self.records.len())
            .field("synthesized", &self.synthesized_count())
            .finish()
    }
}
