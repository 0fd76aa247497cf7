//! Badge component for TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

/// Badge width in columns
pub const BADGE_WIDTH: u16 = 11;

/// Label and color for a validity state
fn badge(valid: Option<bool>) -> (&'static str, Color) {
    match valid {
        Some(true) => ("VALID", Color::Green),
        Some(false) => ("INVALID", Color::Red),
        None => ("UNKNOWN", Color::DarkGray),
    }
}

/// Render the form validity badge
pub fn render_badge(frame: &mut Frame, area: Rect, valid: Option<bool>) {
    let (label, color) = badge(valid);
    let style = Style::default()
        .fg(Color::Black)
        .bg(color)
        .add_modifier(Modifier::BOLD);
    frame.render_widget(Paragraph::new(format!(" {label} ")).style(style), area);
}
