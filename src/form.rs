//! The form component
//!
//! A [`Form`] owns the tracked state of one form instance. Each render walks
//! the children it is given, wraps every recognized control, and returns the
//! rebuilt tree for the host to display. Reads, validation and reset work on
//! whatever has been discovered so far.

use crate::config::FormConfig;
use crate::element::{Element, Node};
use crate::host::{HandleRef, Host};
use crate::registry::{FieldType, Registry};
use crate::serialize::{serialize, Shaped};
use crate::state::{Field, FieldId, FieldValue, FormState};
use crate::walker;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Component tag of the container a form renders its children into
pub const ROOT_KIND: &str = "View";

/// Listener told about aggregate validity
pub type ValidListener = Rc<dyn Fn(bool)>;

/// Tracked values keyed by field name
pub type Values = Shaped<FieldValue>;

/// Live handles keyed by field name; `None` when the host has no such handle
pub type References = Shaped<Option<HandleRef>>;

/// Construction-time options
#[derive(Clone, Default)]
pub struct FormOptions {
    on_valid: Option<ValidListener>,
    custom_fields: Vec<(String, FieldType)>,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on mount and whenever a required field changes
    pub fn on_valid(mut self, listener: impl Fn(bool) + 'static) -> Self {
        self.on_valid = Some(Rc::new(listener));
        self
    }

    /// Add a field type, replacing a built-in one of the same name
    pub fn custom_field(mut self, type_name: impl Into<String>, field_type: FieldType) -> Self {
        self.custom_fields.push((type_name.into(), field_type));
        self
    }

    pub fn custom_fields(
        mut self,
        fields: impl IntoIterator<Item = (String, FieldType)>,
    ) -> Self {
        self.custom_fields.extend(fields);
        self
    }
}

impl From<&FormConfig> for FormOptions {
    fn from(config: &FormConfig) -> Self {
        FormOptions::new().custom_fields(config.field_types())
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("on_valid", &self.on_valid.is_some())
            .field("custom_fields", &self.custom_fields)
            .finish()
    }
}

/// State shared between a form and the callbacks it binds into the tree
pub(crate) struct FormInner {
    pub(crate) registry: Registry,
    pub(crate) state: RefCell<FormState>,
    pub(crate) host: Rc<dyn Host>,
    on_valid: Option<ValidListener>,
}

impl FormInner {
    pub(crate) fn notify_valid(&self) {
        if let Some(listener) = &self.on_valid {
            let valid = self.state.borrow().is_form_valid();
            listener(valid);
        }
    }
}

/// Aggregates the form controls found in a tree of elements
pub struct Form {
    inner: Rc<FormInner>,
}

impl Form {
    pub fn new(options: FormOptions, host: Rc<dyn Host>) -> Self {
        let FormOptions {
            on_valid,
            custom_fields,
        } = options;
        Self {
            inner: Rc::new(FormInner {
                registry: Registry::with_custom(custom_fields),
                state: RefCell::new(FormState::new()),
                host,
                on_valid,
            }),
        }
    }

    /// First render; also reports the initial validity
    pub fn mount(&self, children: &[Element]) -> Element {
        let root = self.render(children);
        self.inner.notify_valid();
        root
    }

    /// Wrap `children` and return them inside a root container
    pub fn render(&self, children: &[Element]) -> Element {
        Node::new(ROOT_KIND)
            .children(walker::process(&self.inner, children))
            .into()
    }

    /// All tracked values, keyed by field name
    pub fn get_values(&self) -> Values {
        let state = self.inner.state.borrow();
        serialize(
            state
                .fields()
                .map(|(_, field)| (field.name.clone(), field.value.clone())),
        )
    }

    pub fn values_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.get_values())
    }

    /// Live handles of all tracked fields, keyed by field name
    pub fn get_references(&self) -> References {
        let refs: Vec<(String, String)> = self
            .inner
            .state
            .borrow()
            .refs()
            .map(|(_, field_ref)| (field_ref.name.clone(), field_ref.handle_name.clone()))
            .collect();

        serialize(
            refs.into_iter()
                .map(|(name, handle_name)| (name, self.inner.host.resolve_ref(&handle_name))),
        )
    }

    /// Put every field back to its first observed value
    pub fn reset_form(&self) {
        let targets: Vec<(FieldId, Field, Option<String>)> = {
            let state = self.inner.state.borrow();
            state
                .fields()
                .map(|(id, field)| {
                    let handle_name = state.field_ref(id).map(|r| r.handle_name.clone());
                    (id.clone(), field.clone(), handle_name)
                })
                .collect()
        };

        for (id, field, handle_name) in targets {
            let reset = self
                .inner
                .registry
                .lookup(&field.kind)
                .and_then(|field_type| field_type.reset.clone());

            if let Some(reset) = reset {
                match handle_name.and_then(|name| self.inner.host.resolve_ref(&name)) {
                    Some(handle) => reset(&mut *handle.borrow_mut(), &field),
                    None => debug!(field = %field.name, "no live handle, skipping reset"),
                }
            }

            let default = field.default_value.clone().unwrap_or_default();
            let valid = self
                .inner
                .registry
                .validity(&field.kind, &default, field.validator.as_ref());
            self.inner.state.borrow_mut().restore_default(&id, valid);
        }

        debug!(fields = self.inner.state.borrow().len(), "form reset");
        self.inner.host.request_render();
        self.inner.notify_valid();
    }

    pub fn is_form_valid(&self) -> bool {
        self.inner.state.borrow().is_form_valid()
    }

    pub fn field(&self, id: &str) -> Option<Field> {
        self.inner.state.borrow().field(id).cloned()
    }

    /// Identifiers of tracked fields in discovery order
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.inner
            .state
            .borrow()
            .fields()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("state", &self.inner.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockControlHandle, MockHost, RecordingHost};
    use crate::serialize::NameTree;
    use serde_json::json;
    use std::cell::Cell;

    /// Form with a listener that records every validity report
    fn watched_form(host: Rc<dyn Host>) -> (Form, Rc<RefCell<Vec<bool>>>) {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        let options = FormOptions::new().on_valid(move |valid| sink.borrow_mut().push(valid));
        (Form::new(options, host), reports)
    }

    fn change(root: &Element, name: &str, prop: &str, value: impl Into<FieldValue>) {
        root.find(&|node| node.field_name() == Some(name))
            .and_then(|node| node.callback(prop))
            .unwrap_or_else(|| panic!("no {prop} on {name}"))
            .call(value.into());
    }

    fn signup_tree() -> Vec<Element> {
        vec![Node::new("View")
            .child(Node::new("TextInput").name("email").required(true))
            .child(Node::new("TextInput").name("nickname"))
            .child(
                Node::new("Accordion").content(vec![Node::new("Switch")
                    .name("terms")
                    .required(true)
                    .prop("value", false)
                    .into()]),
            )
            .child(
                Node::new("Section")
                    .name("prefs")
                    .child(Node::new("Slider").name("volume").prop("value", 0.3)),
            )
            .into()]
    }

    mod validity {
        use super::*;

        #[test]
        fn test_no_required_fields_is_always_valid() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&[
                Node::new("TextInput").name("a").into(),
                Node::new("Slider").name("b").into(),
                Node::new("Switch").name("c").prop("value", false).into(),
            ]);
            assert!(form.is_form_valid());
            change(&root, "a", "onChangeText", "");
            change(&root, "c", "onValueChange", false);
            assert!(form.is_form_valid());
        }

        #[test]
        fn test_required_text_is_valid_iff_non_empty() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&[Node::new("TextInput").name("t").required(true).into()]);
            assert!(!form.is_form_valid());
            change(&root, "t", "onChangeText", "x");
            assert!(form.is_form_valid());
            change(&root, "t", "onChangeText", "");
            assert!(!form.is_form_valid());
        }

        #[test]
        fn test_required_switch_follows_its_value() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&[Node::new("Switch").name("s").required(true).into()]);
            change(&root, "s", "onValueChange", true);
            assert!(form.field("s").unwrap().valid);
            change(&root, "s", "onValueChange", false);
            assert!(!form.field("s").unwrap().valid);
        }

        #[test]
        fn test_validator_overrides_rule_for_that_control_only() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&[
                Node::new("TextInput")
                    .name("code")
                    .required(true)
                    .validate(|v| v.as_text().is_some_and(|s| s.len() == 4))
                    .into(),
                Node::new("TextInput").name("other").required(true).into(),
            ]);
            change(&root, "code", "onChangeText", "abc");
            change(&root, "other", "onChangeText", "abc");
            assert!(!form.field("code").unwrap().valid);
            assert!(form.field("other").unwrap().valid);

            change(&root, "code", "onChangeText", "abcd");
            assert!(form.field("code").unwrap().valid);
            assert!(form.is_form_valid());
        }

        #[test]
        fn test_validator_can_accept_empty_text() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            form.mount(&[Node::new("TextInput")
                .name("optional")
                .required(true)
                .validate(|_| true)
                .into()]);
            assert!(form.is_form_valid());
        }
    }

    mod notifications {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_mount_reports_validity_once() {
            let (form, reports) = watched_form(Rc::new(RecordingHost::default()));
            form.mount(&signup_tree());
            assert_eq!(*reports.borrow(), vec![false]);
        }

        #[test]
        fn test_render_alone_does_not_report() {
            let (form, reports) = watched_form(Rc::new(RecordingHost::default()));
            form.render(&signup_tree());
            assert!(reports.borrow().is_empty());
        }

        #[test]
        fn test_only_required_changes_report() {
            let (form, reports) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&signup_tree());
            change(&root, "nickname", "onChangeText", "ada");
            change(&root, "volume", "onSlidingComplete", 0.9);
            assert_eq!(reports.borrow().len(), 1);

            change(&root, "email", "onChangeText", "ada@example.com");
            change(&root, "terms", "onValueChange", true);
            assert_eq!(*reports.borrow(), vec![false, false, true]);
        }

        #[test]
        fn test_listener_can_query_the_form() {
            let host = Rc::new(RecordingHost::default());
            let form = Rc::new_cyclic(|weak: &std::rc::Weak<Form>| {
                let weak = weak.clone();
                let options = FormOptions::new().on_valid(move |valid| {
                    if let Some(form) = weak.upgrade() {
                        assert_eq!(form.is_form_valid(), valid);
                    }
                });
                Form::new(options, host)
            });
            let root = form.mount(&[Node::new("TextInput").name("t").required(true).into()]);
            change(&root, "t", "onChangeText", "ok");
        }
    }

    mod reads {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_get_values_is_keyed_by_name() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&signup_tree());
            change(&root, "email", "onChangeText", "ada@example.com");

            assert_eq!(
                form.values_json().unwrap(),
                json!({
                    "email": "ada@example.com",
                    "nickname": "",
                    "terms": false,
                    "volume": 0.3,
                })
            );
        }

        #[test]
        fn test_bracket_names_are_shaped() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&[
                Node::new("TextInput").name("tags[]").key("a").into(),
                Node::new("TextInput").name("tags[]").key("b").into(),
                Node::new("TextInput").name("address[city]").into(),
            ]);
            change(&root, "address[city]", "onChangeText", "Lyon");
            assert_eq!(
                form.values_json().unwrap(),
                json!({"tags": ["", ""], "address": {"city": "Lyon"}})
            );
        }

        #[test]
        fn test_values_and_references_share_identifiers() {
            let host = Rc::new(RecordingHost::default());
            let (form, _) = watched_form(host.clone());
            form.mount(&signup_tree());

            let value_keys: Vec<_> = form.get_values().into_keys().collect();
            let ref_keys: Vec<_> = form.get_references().into_keys().collect();
            assert_eq!(value_keys, vec!["email", "nickname", "terms", "volume"]);
            assert_eq!(value_keys, ref_keys);
        }

        #[test]
        fn test_references_resolve_live_handles() {
            let host = Rc::new(RecordingHost::default());
            let handle: HandleRef = Rc::new(RefCell::new(MockControlHandle::new()));
            host.table.register("emailInput", handle.clone());

            let (form, _) = watched_form(host.clone());
            form.mount(&[
                Node::new("TextInput")
                    .name("email")
                    .ref_name("emailInput")
                    .into(),
                Node::new("Switch").name("unmounted").into(),
            ]);

            let refs = form.get_references();
            match &refs["email"] {
                NameTree::Leaf(Some(resolved)) => assert!(Rc::ptr_eq(resolved, &handle)),
                _ => panic!("email handle should resolve"),
            }
            assert!(matches!(&refs["unmounted"], NameTree::Leaf(None)));
        }

        #[test]
        fn test_references_ask_the_host_with_handle_names() {
            let mut host = MockHost::new();
            host.expect_resolve_ref().times(1).returning(|name| {
                assert_eq!(name, "pwd");
                None
            });
            let form = Form::new(FormOptions::new(), Rc::new(host));
            form.render(&[Node::new("TextInput").name("password").ref_name("pwd").into()]);

            let refs = form.get_references();
            assert_eq!(refs.len(), 1);
            assert!(refs.contains_key("password"));
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reset_restores_first_observed_values() {
            let (form, _) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&[
                Node::new("TextInput").name("t").prop("defaultValue", "start").into(),
                Node::new("Switch").name("s").prop("value", true).into(),
                Node::new("Slider").name("v").into(),
            ]);
            change(&root, "t", "onChangeText", "edited");
            change(&root, "s", "onValueChange", false);
            change(&root, "v", "onSlidingComplete", 0.7);

            form.reset_form();
            assert_eq!(
                form.values_json().unwrap(),
                json!({"t": "start", "s": true, "v": null})
            );
        }

        #[test]
        fn test_reset_reports_validity_exactly_once() {
            let (form, reports) = watched_form(Rc::new(RecordingHost::default()));
            let root = form.mount(&signup_tree());
            change(&root, "email", "onChangeText", "ada@example.com");
            change(&root, "terms", "onValueChange", true);
            reports.borrow_mut().clear();

            form.reset_form();
            assert_eq!(*reports.borrow(), vec![false]);
            assert!(!form.is_form_valid());
        }

        #[test]
        fn test_reset_runs_type_reset_on_live_handle() {
            let host = Rc::new(RecordingHost::default());
            let mut text = MockControlHandle::new();
            text.expect_clear().times(1).return_const(());
            let switch = MockControlHandle::new();
            host.table.register("t", Rc::new(RefCell::new(text)));
            host.table.register("s", Rc::new(RefCell::new(switch)));

            let (form, _) = watched_form(host.clone());
            form.mount(&[
                Node::new("TextInput").name("t").into(),
                Node::new("Switch").name("s").into(),
            ]);
            form.reset_form();
        }

        #[test]
        fn test_reset_skips_missing_handles() {
            let host = Rc::new(RecordingHost::default());
            let (form, reports) = watched_form(host.clone());
            let root = form.mount(&[Node::new("TextInput").name("t").required(true).into()]);
            change(&root, "t", "onChangeText", "typed");

            form.reset_form();
            assert_eq!(form.field("t").unwrap().value, FieldValue::from(""));
            assert_eq!(reports.borrow().last(), Some(&false));
        }

        #[test]
        fn test_custom_reset_receives_the_field() {
            let host = Rc::new(RecordingHost::default());
            let mut handle = MockControlHandle::new();
            handle
                .expect_set_value()
                .withf(|value| *value == FieldValue::from(1.0))
                .times(1)
                .return_const(());
            host.table.register("stars", Rc::new(RefCell::new(handle)));

            let seen = Rc::new(Cell::new(0));
            let counter = seen.clone();
            let rating = FieldType::new("stars", "onRate").on_reset(move |handle, field| {
                counter.set(counter.get() + 1);
                if let Some(default) = &field.default_value {
                    handle.set_value(default);
                }
            });
            let form = Form::new(FormOptions::new().custom_field("Rating", rating), host);
            let root = form.mount(&[Node::new("Rating").name("stars").prop("stars", 1.0).into()]);
            change(&root, "stars", "onRate", 4.0);

            form.reset_form();
            assert_eq!(seen.get(), 1);
            assert_eq!(form.field("stars").unwrap().value, FieldValue::from(1.0));
        }

        #[test]
        fn test_reset_requests_a_render() {
            let mut host = MockHost::new();
            host.expect_request_render().times(1).return_const(());
            host.expect_resolve_ref().returning(|_| None);
            let form = Form::new(FormOptions::new(), Rc::new(host));
            form.mount(&[Node::new("TextInput").name("t").into()]);
            form.reset_form();
        }

        #[test]
        fn test_reset_on_empty_form() {
            let (form, reports) = watched_form(Rc::new(RecordingHost::default()));
            form.reset_form();
            assert_eq!(*reports.borrow(), vec![true]);
        }
    }

    mod options {
        use super::*;
        use pretty_assertions::assert_eq;
        use crate::config::{CustomFieldSpec, FormConfig};
        use crate::registry::ValidityRule;

        #[test]
        fn test_options_from_config_register_custom_types() {
            let mut config = FormConfig::default();
            config.custom_fields.insert(
                "ColorWheel".to_string(),
                CustomFieldSpec {
                    value_prop: "hue".to_string(),
                    callback_prop: "onHueChange".to_string(),
                    controlled: true,
                    default_value: Some(FieldValue::from(0.0)),
                    validity: ValidityRule::Never,
                    clear_on_reset: false,
                },
            );
            let form = Form::new(
                FormOptions::from(&config),
                Rc::new(RecordingHost::default()),
            );
            assert!(form.registry().lookup("ColorWheel").unwrap().controlled);

            form.render(&[Node::new("ColorWheel").name("accent").into()]);
            assert_eq!(form.field("accent").unwrap().value, FieldValue::from(0.0));
        }

        #[test]
        fn test_options_debug_hides_listener() {
            let options = FormOptions::new().on_valid(|_| {});
            assert!(format!("{options:?}").contains("on_valid: true"));
        }
    }
}
