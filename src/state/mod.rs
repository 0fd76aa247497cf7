//! Form domain layer
//!
//! Tracked field values, validity and handle references for one form instance.

mod field;
mod form_state;
mod value;

pub use field::{field_id, Field, FieldId, FieldRecord, FieldRef};
pub use form_state::FormState;
pub use value::FieldValue;
