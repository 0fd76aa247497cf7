//! Seam between a form and the UI layer that renders it

use crate::state::FieldValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Live widget a host registers under a handle name
#[cfg_attr(test, mockall::automock)]
pub trait ControlHandle {
    /// Drop whatever the widget is currently displaying
    fn clear(&mut self);

    /// Replace the displayed value
    fn set_value(&mut self, value: &FieldValue);
}

/// Shared reference to a live widget
pub type HandleRef = Rc<RefCell<dyn ControlHandle>>;

/// Operations a form needs from the rendering layer
#[cfg_attr(test, mockall::automock)]
pub trait Host {
    /// Ask for the tree to be rendered again
    fn request_render(&self);

    /// Look up the live handle registered under `handle_name`
    fn resolve_ref(&self, handle_name: &str) -> Option<HandleRef>;
}

/// Handle-name to live-handle table hosts can embed
#[derive(Default)]
pub struct RefTable {
    handles: RefCell<HashMap<String, HandleRef>>,
}

impl RefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle, replacing any previous one under the same name
    pub fn register(&self, handle_name: impl Into<String>, handle: HandleRef) {
        self.handles.borrow_mut().insert(handle_name.into(), handle);
    }

    pub fn resolve(&self, handle_name: &str) -> Option<HandleRef> {
        self.handles.borrow().get(handle_name).cloned()
    }

    pub fn contains(&self, handle_name: &str) -> bool {
        self.handles.borrow().contains_key(handle_name)
    }

    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }
}

/// Host that counts render requests and resolves from a [`RefTable`]
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingHost {
    pub renders: std::cell::Cell<usize>,
    pub table: RefTable,
}

#[cfg(test)]
impl Host for RecordingHost {
    fn request_render(&self) {
        self.renders.set(self.renders.get() + 1);
    }

    fn resolve_ref(&self, handle_name: &str) -> Option<HandleRef> {
        self.table.resolve(handle_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let table = RefTable::new();
        let handle: HandleRef = Rc::new(RefCell::new(MockControlHandle::new()));
        table.register("email", handle.clone());

        let resolved = table.resolve("email").unwrap();
        assert!(Rc::ptr_eq(&resolved, &handle));
        assert!(table.resolve("missing").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_register_replaces_existing_handle() {
        let table = RefTable::new();
        let first: HandleRef = Rc::new(RefCell::new(MockControlHandle::new()));
        let second: HandleRef = Rc::new(RefCell::new(MockControlHandle::new()));
        table.register("email", first);
        table.register("email", second.clone());

        assert!(Rc::ptr_eq(&table.resolve("email").unwrap(), &second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_table() {
        let table = RefTable::new();
        assert!(table.is_empty());
        assert!(!table.contains("anything"));
    }
}
