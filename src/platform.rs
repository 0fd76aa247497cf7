//! Platform-specific key bindings

use crossterm::event::KeyModifiers;

/// Modifier for form-wide shortcuts
/// Terminals do not forward Cmd on macOS, so Ctrl is used everywhere
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Reset shortcut display for help text
pub const RESET_SHORTCUT: &str = "Ctrl+R";

/// Quit shortcut display
pub const QUIT_SHORTCUT: &str = "Esc";
