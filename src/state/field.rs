//! Tracked field records

use super::value::FieldValue;
use crate::element::Validator;

/// Identifier of a tracked field: the `name` prop followed by the element key
pub type FieldId = String;

/// Build a field identifier from a name and an optional distinguishing key
pub fn field_id(name: &str, key: Option<&str>) -> FieldId {
    format!("{name}{}", key.unwrap_or_default())
}

/// A tracked form control
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
    pub required: bool,
    /// Registered type name the field was discovered with
    pub kind: String,
    /// First value ever recorded for this field
    pub default_value: Option<FieldValue>,
    pub validator: Option<Validator>,
    pub valid: bool,
}

/// Everything a single observation of a control reports
#[derive(Debug, Clone)]
pub struct FieldRecord {
    pub id: FieldId,
    pub name: String,
    pub kind: String,
    pub value: FieldValue,
    pub required: bool,
    pub validator: Option<Validator>,
}

/// Where to find the live handle of a tracked field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    /// Name the host registered the handle under
    pub handle_name: String,
}
