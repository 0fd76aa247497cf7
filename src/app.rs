//! Demo application: a terminal host for a form

use crate::platform::SHORTCUT_MODIFIER;
use chrono::{Duration, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use formtree::{
    BuiltinControl, ControlHandle, Element, ElementRole, FieldId, FieldValue, Form, FormConfig,
    FormOptions, HandleRef, Host, Node, RefTable, ACCORDION_TYPE,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Slider step per key press
const SLIDER_STEP: f64 = 0.1;

/// Live widget state owned by the demo host
#[derive(Debug, Default)]
pub struct WidgetHandle {
    pub text: String,
    pub value: FieldValue,
}

impl ControlHandle for WidgetHandle {
    fn clear(&mut self) {
        self.text.clear();
        self.value = FieldValue::Null;
    }

    fn set_value(&mut self, value: &FieldValue) {
        self.text = value.display_value();
        self.value = value.clone();
    }
}

/// Host side of the demo: widget handles and pending render requests
#[derive(Default)]
pub struct DemoHost {
    refs: RefTable,
    widgets: RefCell<HashMap<String, Rc<RefCell<WidgetHandle>>>>,
    render_requested: Cell<bool>,
}

impl Host for DemoHost {
    fn request_render(&self) {
        self.render_requested.set(true);
    }

    fn resolve_ref(&self, handle_name: &str) -> Option<HandleRef> {
        self.refs.resolve(handle_name)
    }
}

impl DemoHost {
    fn take_render_request(&self) -> bool {
        self.render_requested.replace(false)
    }

    /// Create a widget for every bound node that does not have one yet
    fn mount_widgets(&self, root: &Element) {
        root.walk(&mut |node| {
            let Some(handle_name) = node.ref_name.as_deref() else {
                return;
            };
            if self.refs.contains(handle_name) {
                return;
            }
            let seed = node
                .value("defaultValue")
                .or_else(|| node.value("value"))
                .cloned()
                .unwrap_or_default();
            let widget = Rc::new(RefCell::new(WidgetHandle {
                text: seed.display_value(),
                value: seed,
            }));
            self.refs.register(handle_name, widget.clone());
            self.widgets
                .borrow_mut()
                .insert(handle_name.to_string(), widget);
        });
    }

    pub fn widget(&self, handle_name: &str) -> Option<Rc<RefCell<WidgetHandle>>> {
        self.widgets.borrow().get(handle_name).cloned()
    }
}

/// A focusable control in the rendered tree
#[derive(Debug, Clone)]
pub struct Control {
    pub id: FieldId,
    pub handle_name: String,
    pub name: String,
    pub label: String,
    pub kind: Option<BuiltinControl>,
    pub required: bool,
}

/// Main application state
pub struct App {
    pub form: Form,
    pub host: Rc<DemoHost>,
    source: Vec<Element>,
    pub rendered: Element,
    pub focus: usize,
    /// Last aggregate validity reported by the form
    pub last_valid: Rc<Cell<Option<bool>>>,
    pub status_message: Option<String>,
    quit: bool,
}

impl App {
    pub fn new(config: &FormConfig) -> Self {
        let host = Rc::new(DemoHost::default());
        let last_valid = Rc::new(Cell::new(None));
        let sink = last_valid.clone();
        let options = FormOptions::from(config).on_valid(move |valid| sink.set(Some(valid)));
        let form = Form::new(options, host.clone());

        let source = demo_tree();
        let rendered = form.mount(&source);
        host.mount_widgets(&rendered);
        host.take_render_request();

        Self {
            form,
            host,
            source,
            rendered,
            focus: 0,
            last_valid,
            status_message: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Focusable controls in tree order
    pub fn controls(&self) -> Vec<Control> {
        let registry = self.form.registry();
        let mut controls = Vec::new();
        self.rendered.walk(&mut |node| {
            let ElementRole::Field { id, name, .. } = registry.classify(node) else {
                return;
            };
            let Some(handle_name) = node.ref_name.as_deref() else {
                return;
            };
            controls.push(Control {
                id,
                handle_name: handle_name.to_string(),
                label: node.text_prop("label").unwrap_or(&name).to_string(),
                name,
                kind: BuiltinControl::ALL
                    .into_iter()
                    .find(|c| c.type_name() == node.declared_type()),
                required: node.is_required(),
            });
        });
        controls
    }

    /// Rendered node bound to `handle_name`
    pub fn node(&self, handle_name: &str) -> Option<&Node> {
        self.rendered
            .find(&|node| node.ref_name.as_deref() == Some(handle_name))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        if key.modifiers.contains(SHORTCUT_MODIFIER) && key.code == KeyCode::Char('r') {
            self.form.reset_form();
            self.status_message = Some("Form reset".to_string());
            self.sync();
            return;
        }

        let controls = self.controls();
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab | KeyCode::Down => {
                if !controls.is_empty() {
                    self.focus = (self.focus + 1) % controls.len();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if !controls.is_empty() {
                    self.focus = (self.focus + controls.len() - 1) % controls.len();
                }
            }
            _ => {
                if let Some(control) = controls.get(self.focus) {
                    self.edit(control, key.code);
                }
            }
        }
    }

    /// Apply a key press to the focused control
    fn edit(&mut self, control: &Control, code: KeyCode) {
        let Some(kind) = control.kind else {
            return;
        };
        let Some(node) = self.node(&control.handle_name) else {
            return;
        };
        let field_type = kind.descriptor();

        let next = match kind {
            BuiltinControl::TextInput => self.edit_text(&control.handle_name, code),
            BuiltinControl::Switch => match code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let on = node
                        .value(&field_type.value_prop)
                        .and_then(FieldValue::as_bool)
                        .unwrap_or(false);
                    Some(FieldValue::from(!on))
                }
                _ => None,
            },
            BuiltinControl::Slider | BuiltinControl::SliderIos => {
                self.edit_slider(control, code)
            }
            BuiltinControl::Picker | BuiltinControl::PickerIos => {
                let current = node.value(&field_type.value_prop);
                cycle_option(node, current, code)
            }
            BuiltinControl::DatePickerIos => {
                let current = node
                    .value(&field_type.value_prop)
                    .and_then(FieldValue::as_date)
                    .unwrap_or_else(Utc::now);
                match code {
                    KeyCode::Left => Some(FieldValue::from(current - Duration::days(1))),
                    KeyCode::Right => Some(FieldValue::from(current + Duration::days(1))),
                    _ => None,
                }
            }
        };

        let Some(value) = next else {
            return;
        };
        let callback = self
            .node(&control.handle_name)
            .and_then(|node| node.callback(&field_type.callback_prop))
            .cloned();
        if let Some(callback) = callback {
            callback.call(value);
        }
        self.sync();
    }

    fn edit_text(&self, handle_name: &str, code: KeyCode) -> Option<FieldValue> {
        let widget = self.host.widget(handle_name)?;
        let mut widget = widget.borrow_mut();
        match code {
            KeyCode::Char(c) => widget.text.push(c),
            KeyCode::Backspace => {
                widget.text.pop()?;
            }
            _ => return None,
        }
        Some(FieldValue::from(widget.text.clone()))
    }

    /// Step from the tracked value, which a reset may have moved
    fn edit_slider(&self, control: &Control, code: KeyCode) -> Option<FieldValue> {
        let position = self
            .form
            .field(&control.id)
            .and_then(|field| field.value.as_number())
            .unwrap_or(0.0);
        let position = match code {
            KeyCode::Left => (position - SLIDER_STEP).max(0.0),
            KeyCode::Right => (position + SLIDER_STEP).min(1.0),
            _ => return None,
        };
        let value = FieldValue::from((position * 10.0).round() / 10.0);
        if let Some(widget) = self.host.widget(&control.handle_name) {
            widget.borrow_mut().set_value(&value);
        }
        Some(value)
    }

    /// Re-render when the form asked for it and mount any new widgets
    fn sync(&mut self) {
        if self.host.take_render_request() {
            self.rendered = self.form.render(&self.source);
            self.host.mount_widgets(&self.rendered);
        }
    }
}

/// Next or previous `Item` value of a picker
fn cycle_option(node: &Node, current: Option<&FieldValue>, code: KeyCode) -> Option<FieldValue> {
    let options: Vec<&FieldValue> = node
        .children
        .iter()
        .filter_map(Element::as_node)
        .filter_map(|item| item.value("value"))
        .collect();
    if options.is_empty() {
        return None;
    }
    let position = current.and_then(|value| options.iter().position(|option| *option == value));
    let len = options.len();
    let next = match (code, position) {
        (KeyCode::Right, Some(i)) => (i + 1) % len,
        (KeyCode::Left, Some(i)) => (i + len - 1) % len,
        (KeyCode::Right | KeyCode::Left, None) => 0,
        _ => return None,
    };
    Some(options[next].clone())
}

fn picker_item(label: &str, value: &str) -> Element {
    Node::new("Item")
        .prop("label", label)
        .prop("value", value)
        .into()
}

/// The form the demo renders
pub fn demo_tree() -> Vec<Element> {
    let birthday = Utc
        .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .map(FieldValue::from)
        .unwrap_or_default();

    vec![
        Node::new("Text").child(Element::text("Account")).into(),
        Node::new("TextInput")
            .name("email")
            .prop("label", "Email (required)")
            .required(true)
            .validate(|value| value.as_text().is_some_and(|s| s.contains('@')))
            .into(),
        Node::new("TextInput")
            .name("nickname")
            .prop("label", "Nickname")
            .into(),
        Node::new("Switch")
            .name("newsletter")
            .prop("label", "Newsletter")
            .prop("value", false)
            .into(),
        Node::new(ACCORDION_TYPE)
            .prop("title", "Preferences")
            .content(vec![
                Node::new("Picker")
                    .name("theme")
                    .prop("label", "Theme")
                    .prop("selectedValue", "dark")
                    .children([
                        picker_item("Light", "light"),
                        picker_item("Dark", "dark"),
                        picker_item("Solarized", "solarized"),
                    ])
                    .into(),
                Node::new("Slider")
                    .name("volume")
                    .prop("label", "Volume")
                    .prop("value", 0.5)
                    .into(),
                Node::new("DatePickerIOS")
                    .name("birthday")
                    .prop("label", "Birthday")
                    .prop("date", birthday)
                    .into(),
            ])
            .into(),
        Node::new("Section")
            .child(Node::new("Text").child(Element::text("Tags")))
            .child(
                Node::new("TextInput")
                    .name("tags[]")
                    .key("0")
                    .ref_name("tag0")
                    .prop("label", "Tag 1"),
            )
            .child(
                Node::new("TextInput")
                    .name("tags[]")
                    .key("1")
                    .ref_name("tag1")
                    .prop("label", "Tag 2"),
            )
            .into(),
        Node::new("Switch")
            .name("terms")
            .prop("label", "Accept terms (required)")
            .required(true)
            .into(),
    ]
}
