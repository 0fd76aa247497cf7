//! Reusable UI components

mod badge;

pub use badge::{render_badge, BADGE_WIDTH};
