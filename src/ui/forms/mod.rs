//! Form rendering module

mod field_renderer;

pub use field_renderer::{draw_control, draw_help_text, FIELD_HEIGHT};
