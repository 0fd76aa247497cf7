//! Host element tree
//!
//! A minimal declarative tree in the shape UI layers hand to a form: nodes
//! with a component tag, an optional key, a reference-binding slot, props and
//! children. The form never renders anything itself; it only clones nodes
//! with new props and maps over children.

use crate::state::FieldValue;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Prop carrying a node's declared field type
pub const TYPE_PROP: &str = "type";
/// Prop carrying a node's field name
pub const NAME_PROP: &str = "name";
/// Prop marking a field as required
pub const REQUIRED_PROP: &str = "required";
/// Prop carrying a per-control validator
pub const VALIDATE_PROP: &str = "validate";
/// Generic value prop, consulted after a type's own value prop
pub const VALUE_PROP: &str = "value";
/// Prop holding an accordion's nested elements
pub const CONTENT_PROP: &str = "content";

/// Callback a control invokes when its value changes
#[derive(Clone)]
pub struct ChangeCallback(Rc<dyn Fn(FieldValue)>);

impl ChangeCallback {
    pub fn new(f: impl Fn(FieldValue) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, value: FieldValue) {
        (self.0)(value)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ChangeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangeCallback(..)")
    }
}

/// Custom validity check attached to a single control
#[derive(Clone)]
pub struct Validator(Rc<dyn Fn(&FieldValue) -> bool>);

impl Validator {
    pub fn new(f: impl Fn(&FieldValue) -> bool + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn check(&self, value: &FieldValue) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// A single prop value
#[derive(Debug, Clone)]
pub enum Prop {
    Value(FieldValue),
    Callback(ChangeCallback),
    Validator(Validator),
    Elements(Vec<Element>),
}

/// Ordered prop map
pub type Props = BTreeMap<String, Prop>;

/// A child in the tree
#[derive(Debug, Clone)]
pub enum Element {
    /// Non-element child, passed through untouched
    Text(String),
    Node(Node),
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Element::Text(text.into())
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Text(_) => None,
        }
    }

    /// Depth-first search over children and accordion content
    pub fn find(&self, predicate: &dyn Fn(&Node) -> bool) -> Option<&Node> {
        let node = self.as_node()?;
        if predicate(node) {
            return Some(node);
        }
        node.nested()
            .find_map(|children| children.iter().find_map(|child| child.find(predicate)))
    }

    /// Depth-first visit of every node, parents before children
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        if let Element::Node(node) = self {
            visit(node);
            for children in node.nested() {
                for child in children {
                    child.walk(visit);
                }
            }
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

/// A component instance in the tree
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Component tag the host renders
    pub kind: String,
    pub key: Option<String>,
    /// Reference-binding slot: the name the host registers the live handle under
    pub ref_name: Option<String>,
    pub props: Props,
    pub children: Vec<Element>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.ref_name = Some(ref_name.into());
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.props.insert(name.into(), Prop::Value(value.into()));
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.prop(NAME_PROP, FieldValue::Text(name.into()))
    }

    pub fn field_type(self, type_name: impl Into<String>) -> Self {
        self.prop(TYPE_PROP, FieldValue::Text(type_name.into()))
    }

    pub fn required(self, required: bool) -> Self {
        self.prop(REQUIRED_PROP, required)
    }

    pub fn on(mut self, prop: impl Into<String>, f: impl Fn(FieldValue) + 'static) -> Self {
        self.props
            .insert(prop.into(), Prop::Callback(ChangeCallback::new(f)));
        self
    }

    pub fn validate(mut self, f: impl Fn(&FieldValue) -> bool + 'static) -> Self {
        self.props
            .insert(VALIDATE_PROP.to_string(), Prop::Validator(Validator::new(f)));
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn content(mut self, content: Vec<Element>) -> Self {
        self.props
            .insert(CONTENT_PROP.to_string(), Prop::Elements(content));
        self
    }

    /// Present (non-null) value prop
    pub fn value(&self, prop: &str) -> Option<&FieldValue> {
        match self.props.get(prop) {
            Some(Prop::Value(value)) if value.is_present() => Some(value),
            _ => None,
        }
    }

    pub fn text_prop(&self, prop: &str) -> Option<&str> {
        self.value(prop).and_then(FieldValue::as_text)
    }

    pub fn callback(&self, prop: &str) -> Option<&ChangeCallback> {
        match self.props.get(prop) {
            Some(Prop::Callback(callback)) => Some(callback),
            _ => None,
        }
    }

    pub fn validator(&self) -> Option<&Validator> {
        match self.props.get(VALIDATE_PROP) {
            Some(Prop::Validator(validator)) => Some(validator),
            _ => None,
        }
    }

    pub fn elements(&self, prop: &str) -> Option<&[Element]> {
        match self.props.get(prop) {
            Some(Prop::Elements(elements)) => Some(elements),
            _ => None,
        }
    }

    /// Non-empty `name` prop
    pub fn field_name(&self) -> Option<&str> {
        self.text_prop(NAME_PROP).filter(|name| !name.is_empty())
    }

    /// Declared `type` prop, falling back to the component tag
    pub fn declared_type(&self) -> &str {
        self.text_prop(TYPE_PROP).unwrap_or(&self.kind)
    }

    pub fn is_required(&self) -> bool {
        self.value(REQUIRED_PROP)
            .and_then(FieldValue::as_bool)
            .unwrap_or(false)
    }

    /// Clone with some props replaced, an optional new ref binding, and new children
    pub fn clone_with(
        &self,
        props: Props,
        ref_name: Option<String>,
        children: Vec<Element>,
    ) -> Node {
        let mut merged = self.props.clone();
        merged.extend(props);
        Node {
            kind: self.kind.clone(),
            key: self.key.clone(),
            ref_name: ref_name.or_else(|| self.ref_name.clone()),
            props: merged,
            children,
        }
    }

    /// Map over direct children
    pub fn map_children(&self, f: impl FnMut(&Element) -> Element) -> Vec<Element> {
        self.children.iter().map(f).collect()
    }

    /// Children plus any element-valued props such as accordion content
    fn nested(&self) -> impl Iterator<Item = &[Element]> {
        std::iter::once(self.children.as_slice()).chain(self.props.values().filter_map(
            |prop| match prop {
                Prop::Elements(elements) => Some(elements.as_slice()),
                _ => None,
            },
        ))
    }
}
