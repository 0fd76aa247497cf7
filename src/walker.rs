//! Tree traversal and element wrapping
//!
//! Rebuilds a child tree so that every named control of a registered type is
//! bound to the form: its change callback records into the form state, its
//! reference slot points at the handle name the form remembers, and
//! controlled types get the tracked value pushed back down. Everything else
//! is cloned with its children processed the same way.

use crate::element::{
    ChangeCallback, Element, Node, Prop, Props, Validator, CONTENT_PROP, VALUE_PROP,
};
use crate::form::FormInner;
use crate::registry::{ElementRole, FieldType, ACCORDION_TYPE};
use crate::state::{FieldId, FieldRecord, FieldValue};
use std::rc::Rc;
use tracing::{debug, trace};

/// What a bound change callback needs to know about its control
#[derive(Debug, Clone)]
struct FieldBinding {
    id: FieldId,
    name: String,
    kind: String,
    required: bool,
    controlled: bool,
    validator: Option<Validator>,
    /// The control's own callback at the same prop
    forward: Option<ChangeCallback>,
}

pub(crate) fn process(inner: &Rc<FormInner>, elements: &[Element]) -> Vec<Element> {
    elements
        .iter()
        .map(|element| match element {
            Element::Node(node) => Element::Node(process_node(inner, node)),
            Element::Text(_) => element.clone(),
        })
        .collect()
}

fn process_node(inner: &Rc<FormInner>, node: &Node) -> Node {
    match inner.registry.classify(node) {
        ElementRole::Field {
            id,
            name,
            field_type,
        } => wrap_field(inner, node, id, name, field_type),
        ElementRole::Accordion => rebuild(inner, node, Props::new(), container_ref(node), true),
        ElementRole::Container => rebuild(inner, node, Props::new(), container_ref(node), false),
    }
}

/// Ref binding for a named element that is not a tracked field
fn container_ref(node: &Node) -> Option<String> {
    let name = node.field_name()?;
    Some(node.ref_name.clone().unwrap_or_else(|| name.to_string()))
}

fn wrap_field(
    inner: &Rc<FormInner>,
    node: &Node,
    id: FieldId,
    name: String,
    field_type: &FieldType,
) -> Node {
    let kind = node.declared_type().to_string();
    let required = node.is_required();
    let validator = node.validator().cloned();

    let handle_name = inner
        .state
        .borrow_mut()
        .record_ref(&id, &name, node.ref_name.as_deref().unwrap_or(&name))
        .handle_name
        .clone();

    let binding = FieldBinding {
        id: id.clone(),
        name: name.clone(),
        kind: kind.clone(),
        required,
        controlled: field_type.controlled,
        validator: validator.clone(),
        forward: node.callback(&field_type.callback_prop).cloned(),
    };

    let mut props = Props::new();
    props.insert(
        field_type.callback_prop.clone(),
        Prop::Callback(bind_change(inner, binding)),
    );

    let discovered = !inner.state.borrow().contains(&id);
    if discovered {
        debug!(field = %name, kind = %kind, required, "discovered field");
        let value = initial_value(node, field_type);
        let valid = inner.registry.validity(&kind, &value, validator.as_ref());
        inner.state.borrow_mut().record_field(
            FieldRecord {
                id: id.clone(),
                name,
                kind,
                value,
                required,
                validator,
            },
            valid,
        );
    }

    if field_type.controlled {
        if let Some(field) = inner.state.borrow().field(&id) {
            props.insert(
                field_type.value_prop.clone(),
                Prop::Value(field.value.clone()),
            );
        }
    }

    let accordion = node.declared_type() == ACCORDION_TYPE;
    rebuild(inner, node, props, Some(handle_name), accordion)
}

/// Clone `node` with `props` applied and its nested elements processed
fn rebuild(
    inner: &Rc<FormInner>,
    node: &Node,
    mut props: Props,
    ref_name: Option<String>,
    accordion: bool,
) -> Node {
    let children = if accordion {
        if let Some(content) = node.elements(CONTENT_PROP) {
            props.insert(
                CONTENT_PROP.to_string(),
                Prop::Elements(process(inner, content)),
            );
        }
        node.children.clone()
    } else {
        process(inner, &node.children)
    };
    node.clone_with(props, ref_name, children)
}

/// Type's value prop, then the generic value prop, then the type default
fn initial_value(node: &Node, field_type: &FieldType) -> FieldValue {
    node.value(&field_type.value_prop)
        .or_else(|| node.value(VALUE_PROP))
        .cloned()
        .or_else(|| field_type.default_value.clone())
        .unwrap_or_default()
}

fn bind_change(inner: &Rc<FormInner>, binding: FieldBinding) -> ChangeCallback {
    let form = Rc::downgrade(inner);
    ChangeCallback::new(move |value| match form.upgrade() {
        Some(inner) => apply_change(&inner, &binding, value),
        None => trace!(field = %binding.name, "change ignored, form dropped"),
    })
}

fn apply_change(inner: &FormInner, binding: &FieldBinding, value: FieldValue) {
    trace!(field = %binding.name, "value changed");
    let valid = inner
        .registry
        .validity(&binding.kind, &value, binding.validator.as_ref());
    inner.state.borrow_mut().record_field(
        FieldRecord {
            id: binding.id.clone(),
            name: binding.name.clone(),
            kind: binding.kind.clone(),
            value: value.clone(),
            required: binding.required,
            validator: binding.validator.clone(),
        },
        valid,
    );

    if binding.controlled {
        inner.host.request_render();
    }

    if binding.required {
        inner.notify_valid();
    }

    if let Some(forward) = &binding.forward {
        forward.call(value);
    }
}
