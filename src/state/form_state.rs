//! Per-form tracked state

use super::field::{Field, FieldId, FieldRecord, FieldRef};
use super::value::FieldValue;
use std::collections::HashMap;

/// Fields and field references owned by one form instance
///
/// Both maps are keyed by [`FieldId`]. Insertion order is kept so reads
/// report fields in the order they were discovered.
#[derive(Debug, Default)]
pub struct FormState {
    fields: HashMap<FieldId, Field>,
    order: Vec<FieldId>,
    refs: HashMap<FieldId, FieldRef>,
    ref_order: Vec<FieldId>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a field with its already computed validity
    ///
    /// The first record for an identifier also captures its default value;
    /// later records never touch it. Validity comes from the caller so that
    /// user validators never run while the state is borrowed.
    pub fn record_field(&mut self, record: FieldRecord, valid: bool) -> &Field {
        if !self.fields.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }

        let field = self
            .fields
            .entry(record.id)
            .and_modify(|field| {
                field.name.clone_from(&record.name);
                field.kind.clone_from(&record.kind);
                field.required = record.required;
                field.validator = record.validator.clone();
                field.value = record.value.clone();
                field.valid = valid;
            })
            .or_insert_with(|| Field {
                name: record.name.clone(),
                value: record.value.clone(),
                required: record.required,
                kind: record.kind.clone(),
                default_value: Some(record.value.clone()),
                validator: record.validator.clone(),
                valid,
            });

        tracing::trace!(field = %field.name, valid = field.valid, "field recorded");
        field
    }

    /// Remember where a field's handle lives; only the first call per id counts
    pub fn record_ref(&mut self, id: &str, name: &str, handle_name: &str) -> &FieldRef {
        if !self.refs.contains_key(id) {
            self.ref_order.push(id.to_string());
        }
        self.refs
            .entry(id.to_string())
            .or_insert_with(|| FieldRef {
                name: name.to_string(),
                handle_name: handle_name.to_string(),
            })
    }

    /// False iff any required field is currently invalid
    pub fn is_form_valid(&self) -> bool {
        self.fields
            .values()
            .all(|field| !field.required || field.valid)
    }

    /// Put a field back to its captured default; `valid` is the validity of that default
    pub fn restore_default(&mut self, id: &str, valid: bool) -> Option<&Field> {
        let field = self.fields.get_mut(id)?;
        field.value = field.default_value.clone().unwrap_or(FieldValue::Null);
        field.valid = valid;
        Some(field)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn field_ref(&self, id: &str) -> Option<&FieldRef> {
        self.refs.get(id)
    }

    /// Fields in discovery order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldId, &Field)> {
        self.order
            .iter()
            .filter_map(|id| self.fields.get_key_value(id))
    }

    /// Field references in discovery order
    pub fn refs(&self) -> impl Iterator<Item = (&FieldId, &FieldRef)> {
        self.ref_order
            .iter()
            .filter_map(|id| self.refs.get_key_value(id))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
