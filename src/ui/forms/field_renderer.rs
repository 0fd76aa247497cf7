//! Field rendering utilities for forms

use crate::app::Control;
use formtree::{BuiltinControl, Field};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one control (top border + content + bottom border)
pub const FIELD_HEIGHT: u16 = 3;

/// Width of the slider track in cells
const SLIDER_WIDTH: usize = 20;

/// Text shown for a control's current value
pub fn display_value(control: &Control, field: Option<&Field>) -> String {
    let Some(field) = field else {
        return String::new();
    };
    match control.kind {
        Some(BuiltinControl::Switch) => {
            if field.value.as_bool().unwrap_or(false) {
                "[x]".to_string()
            } else {
                "[ ]".to_string()
            }
        }
        Some(BuiltinControl::Slider | BuiltinControl::SliderIos) => {
            let position = field.value.as_number().unwrap_or(0.0).clamp(0.0, 1.0);
            let filled = (position * SLIDER_WIDTH as f64).round() as usize;
            format!(
                "{}{} {position:.1}",
                "█".repeat(filled),
                "░".repeat(SLIDER_WIDTH - filled)
            )
        }
        Some(BuiltinControl::Picker | BuiltinControl::PickerIos | BuiltinControl::DatePickerIos) => {
            format!("‹ {} ›", field.value.display_value())
        }
        _ => field.value.display_value(),
    }
}

/// Draw one form control
pub fn draw_control(
    frame: &mut Frame,
    area: Rect,
    control: &Control,
    field: Option<&Field>,
    is_active: bool,
) {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border_style = match field {
        Some(field) if control.required && !field.valid => Style::default().fg(Color::Red),
        _ if is_active => Style::default().fg(Color::Cyan),
        _ => Style::default().fg(Color::DarkGray),
    };

    let display_value = display_value(control, field);
    let display_str = if display_value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        display_value
    };

    let cursor = if is_active && control.kind == Some(BuiltinControl::TextInput) {
        "▌"
    } else {
        ""
    };

    let content = Paragraph::new(Line::from(vec![
        Span::styled(display_str, style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));

    let block = Block::default()
        .title(format!(" {} ", control.label))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(content.block(block), area);
}

/// Draw a single line of help text
pub fn draw_help_text(frame: &mut Frame, area: Rect, help: &str) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!(" {help}"),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(paragraph, area);
}
