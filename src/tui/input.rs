// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into `Command`s executed by the TUI loop,
// or into local `ViewState` mutations (hover movement, quit confirmation).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Command, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(Command)` when the key press must be executed against the
/// session (a pick) or ends the loop (quit). Returns `None` when the key was
/// handled locally by mutating `ViewState`, or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<Command> {
    // Only process key press events. On Windows, crossterm emits both Press
    // and Release events for each physical keypress; ignoring non-Press
    // events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(Command::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match key_event.code {
        // Digit keys pick directly through the binding table built for the
        // current sub-draw; digits past the table are dead keys.
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let index = view_state.bindings.iter().position(|&b| b == c)?;
            Some(Command::Pick(index))
        }

        // Hover movement
        KeyCode::Left | KeyCode::Char('h') => {
            view_state.move_cursor_left();
            None
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
            view_state.move_cursor_right();
            None
        }

        // Enter picks the hovered option
        KeyCode::Enter => {
            if view_state.options.is_empty() {
                None
            } else {
                Some(Command::Pick(view_state.cursor))
            }
        }

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit
/// - `n` or `Esc` cancels (returns to normal mode)
/// - All other keys are blocked
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<Command> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(Command::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
