//! Field-type registry
//!
//! Maps a declared control type to the descriptor that tells the walker how
//! to read, bind and reset it. The built-in set covers the stock controls;
//! callers layer their own descriptors on top.

use crate::element::{Node, Validator};
use crate::host::ControlHandle;
use crate::state::{field_id, Field, FieldId, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Container type whose nested fields live under its `content` prop
pub const ACCORDION_TYPE: &str = "Accordion";

/// Imperative reset run against a control's live handle
pub type ResetFn = Rc<dyn Fn(&mut dyn ControlHandle, &Field)>;

/// Validity rule applied when a control has no validator of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityRule {
    /// Valid when the value is a non-empty string
    NonEmptyText,
    /// Valid when the value is `true`
    Truthy,
    #[default]
    Never,
}

impl ValidityRule {
    pub fn check(self, value: &FieldValue) -> bool {
        match self {
            ValidityRule::NonEmptyText => value.as_text().is_some_and(|s| !s.is_empty()),
            ValidityRule::Truthy => value.as_bool() == Some(true),
            ValidityRule::Never => false,
        }
    }
}

/// How to treat one control type
#[derive(Clone)]
pub struct FieldType {
    /// Prop the control reads its value from
    pub value_prop: String,
    /// Prop the control reports changes through
    pub callback_prop: String,
    /// Whether the tracked value has to be pushed back down on every render
    pub controlled: bool,
    pub default_value: Option<FieldValue>,
    pub validity: ValidityRule,
    pub reset: Option<ResetFn>,
}

impl FieldType {
    pub fn new(value_prop: impl Into<String>, callback_prop: impl Into<String>) -> Self {
        Self {
            value_prop: value_prop.into(),
            callback_prop: callback_prop.into(),
            controlled: false,
            default_value: None,
            validity: ValidityRule::Never,
            reset: None,
        }
    }

    pub fn controlled(mut self) -> Self {
        self.controlled = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn validity(mut self, rule: ValidityRule) -> Self {
        self.validity = rule;
        self
    }

    pub fn on_reset(mut self, reset: impl Fn(&mut dyn ControlHandle, &Field) + 'static) -> Self {
        self.reset = Some(Rc::new(reset));
        self
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldType")
            .field("value_prop", &self.value_prop)
            .field("callback_prop", &self.callback_prop)
            .field("controlled", &self.controlled)
            .field("default_value", &self.default_value)
            .field("validity", &self.validity)
            .field("reset", &self.reset.is_some())
            .finish()
    }
}

/// Stock control types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinControl {
    TextInput,
    Switch,
    SliderIos,
    Slider,
    Picker,
    PickerIos,
    DatePickerIos,
}

impl BuiltinControl {
    pub const ALL: [BuiltinControl; 7] = [
        BuiltinControl::TextInput,
        BuiltinControl::Switch,
        BuiltinControl::SliderIos,
        BuiltinControl::Slider,
        BuiltinControl::Picker,
        BuiltinControl::PickerIos,
        BuiltinControl::DatePickerIos,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Self::TextInput => "TextInput",
            Self::Switch => "Switch",
            Self::SliderIos => "SliderIOS",
            Self::Slider => "Slider",
            Self::Picker => "Picker",
            Self::PickerIos => "PickerIOS",
            Self::DatePickerIos => "DatePickerIOS",
        }
    }

    pub fn descriptor(self) -> FieldType {
        match self {
            Self::TextInput => FieldType::new("defaultValue", "onChangeText")
                .default_value("")
                .validity(ValidityRule::NonEmptyText)
                .on_reset(|handle, _| handle.clear()),
            Self::Switch => FieldType::new("value", "onValueChange")
                .controlled()
                .validity(ValidityRule::Truthy),
            Self::SliderIos | Self::Slider => FieldType::new("value", "onSlidingComplete"),
            Self::Picker | Self::PickerIos => {
                FieldType::new("selectedValue", "onValueChange").controlled()
            }
            Self::DatePickerIos => FieldType::new("date", "onDateChange").controlled(),
        }
    }
}

/// What the walker should do with a node
#[derive(Debug)]
pub enum ElementRole<'a> {
    /// A named node of a registered type
    Field {
        id: FieldId,
        name: String,
        field_type: &'a FieldType,
    },
    /// Unrecognized container whose nested elements live under `content`
    Accordion,
    /// Anything else; only its children are of interest
    Container,
}

/// Type name to descriptor mapping
#[derive(Debug, Clone)]
pub struct Registry {
    types: HashMap<String, FieldType>,
}

impl Registry {
    pub fn builtin() -> Self {
        let types = BuiltinControl::ALL
            .iter()
            .map(|control| (control.type_name().to_string(), control.descriptor()))
            .collect();
        Self { types }
    }

    /// Built-in set with the given descriptors layered over it
    pub fn with_custom(custom: impl IntoIterator<Item = (String, FieldType)>) -> Self {
        let mut registry = Self::builtin();
        registry.types.extend(custom);
        registry
    }

    pub fn lookup(&self, type_name: &str) -> Option<&FieldType> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn classify(&self, node: &Node) -> ElementRole<'_> {
        let declared = node.declared_type();
        match (node.field_name(), self.lookup(declared)) {
            (Some(name), Some(field_type)) => ElementRole::Field {
                id: field_id(name, node.key.as_deref()),
                name: name.to_string(),
                field_type,
            },
            _ if declared == ACCORDION_TYPE => ElementRole::Accordion,
            _ => ElementRole::Container,
        }
    }

    /// Validator if supplied, otherwise the type's rule
    pub fn validity(
        &self,
        type_name: &str,
        value: &FieldValue,
        validator: Option<&Validator>,
    ) -> bool {
        match validator {
            Some(validator) => validator.check(value),
            None => self
                .lookup(type_name)
                .map(|field_type| field_type.validity)
                .unwrap_or_default()
                .check(value),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
