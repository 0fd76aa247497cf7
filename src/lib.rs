//! formtree - declarative form aggregation over a tree of UI elements
//!
//! Hand a [`Form`] the children of a form container. It finds every named
//! control of a registered type, however deeply nested, binds its change
//! callback, tracks value and validity, and gives back the rebuilt tree for
//! the host to render.
//!
//! ```
//! use formtree::{Element, Form, FormOptions, Host, HandleRef, Node};
//! use std::rc::Rc;
//!
//! struct NoopHost;
//!
//! impl Host for NoopHost {
//!     fn request_render(&self) {}
//!     fn resolve_ref(&self, _: &str) -> Option<HandleRef> {
//!         None
//!     }
//! }
//!
//! let form = Form::new(FormOptions::new(), Rc::new(NoopHost));
//! let root = form.mount(&[Node::new("TextInput").name("email").required(true).into()]);
//! assert!(!form.is_form_valid());
//!
//! let input = root.find(&|n| n.field_name() == Some("email")).unwrap();
//! input.callback("onChangeText").unwrap().call("me@example.com".into());
//! assert!(form.is_form_valid());
//! # let _: &Element = &root;
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod form;
pub mod host;
pub mod registry;
pub mod serialize;
pub mod state;
mod walker;

pub use config::{CustomFieldSpec, FormConfig};
pub use element::{ChangeCallback, Element, Node, Prop, Props, Validator};
pub use error::ConfigError;
pub use form::{Form, FormOptions, References, ValidListener, Values};
pub use host::{ControlHandle, HandleRef, Host, RefTable};
pub use registry::{BuiltinControl, ElementRole, FieldType, Registry, ValidityRule, ACCORDION_TYPE};
pub use serialize::{serialize, NameTree, Shaped};
pub use state::{Field, FieldId, FieldValue, FormState};
