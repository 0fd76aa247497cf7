//! UI module for rendering the demo

mod components;
mod forms;

use crate::app::App;
use crate::platform::{QUIT_SHORTCUT, RESET_SHORTCUT};
use components::{render_badge, BADGE_WIDTH};
use forms::{draw_control, draw_help_text, FIELD_HEIGHT};
use formtree::{HandleRef, NameTree};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    draw_form(frame, columns[0], app);
    draw_inspector(frame, columns[1], app);
    draw_status_bar(frame, rows[1], app);
}

fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Form ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let controls = app.controls();
    let visible = (inner.height / FIELD_HEIGHT).max(1) as usize;
    // Keep the focused control on screen
    let offset = (app.focus + 1).saturating_sub(visible);

    for (slot, (index, control)) in controls
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .enumerate()
    {
        let field_area = Rect {
            x: inner.x,
            y: inner.y + slot as u16 * FIELD_HEIGHT,
            width: inner.width,
            height: FIELD_HEIGHT.min(inner.height),
        };
        let field = app.form.field(&control.id);
        draw_control(frame, field_area, control, field.as_ref(), index == app.focus);
    }
}

fn draw_inspector(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let values = app
        .form
        .values_json()
        .and_then(|json| serde_json::to_string_pretty(&json))
        .unwrap_or_else(|err| format!("serialization failed: {err}"));
    frame.render_widget(
        Paragraph::new(values)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" getValues ").borders(Borders::ALL)),
        chunks[0],
    );

    let references = app.form.get_references();
    let bound = references
        .values()
        .flat_map(NameTree::leaves)
        .filter(|handle| handle.is_some())
        .count();
    let mut lines = Vec::new();
    for (name, node) in &references {
        reference_lines(name, node, &mut lines);
    }
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(format!(" getReferences ({bound} bound) "))
                .borders(Borders::ALL),
        ),
        chunks[1],
    );
}

/// Flatten a reference tree into `path bound|unbound` lines
fn reference_lines(path: &str, node: &NameTree<Option<HandleRef>>, lines: &mut Vec<Line<'static>>) {
    match node {
        NameTree::Leaf(handle) => {
            let (label, color) = match handle {
                Some(_) => ("bound", Color::Green),
                None => ("unbound", Color::Red),
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{path} ")),
                Span::styled(label, Style::default().fg(color)),
            ]));
        }
        NameTree::List(items) => {
            for (index, item) in items.iter().enumerate() {
                reference_lines(&format!("{path}[{index}]"), item, lines);
            }
        }
        NameTree::Branch(map) => {
            for (key, item) in map {
                reference_lines(&format!("{path}[{key}]"), item, lines);
            }
        }
    }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BADGE_WIDTH), Constraint::Min(0)])
        .split(area);

    render_badge(frame, chunks[0], app.last_valid.get());

    let help = format!(
        "Tab: next | Shift+Tab: prev | Space: toggle | ←/→: adjust | {RESET_SHORTCUT}: reset | {QUIT_SHORTCUT}: quit"
    );
    match &app.status_message {
        Some(message) => frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(Color::Yellow),
            ))),
            chunks[1],
        ),
        None => draw_help_text(frame, chunks[1], &help),
    }
}
