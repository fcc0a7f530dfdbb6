//! Key mapping from terminal events to cursor commands.
//!
//! Up moves the cursor toward the top of the board (increasing `y`).

use crate::cursor::CursorCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to cursor commands.
///
/// Arrow keys and `hjkl`/`wasd` move the cursor; holding Shift on an arrow
/// (or using the capital letter) swaps toward that neighbor directly.
pub fn handle_key_event(key: KeyEvent) -> Option<CursorCommand> {
    let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
    let (dx, dy, upper) = match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => (-1, 0, false),
        KeyCode::Char('H') | KeyCode::Char('A') => (-1, 0, true),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => (1, 0, false),
        KeyCode::Char('L') | KeyCode::Char('D') => (1, 0, true),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => (0, 1, false),
        KeyCode::Char('K') | KeyCode::Char('W') => (0, 1, true),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => (0, -1, false),
        KeyCode::Char('J') | KeyCode::Char('S') => (0, -1, true),

        KeyCode::Char(' ') | KeyCode::Enter => return Some(CursorCommand::Select),
        KeyCode::Esc => return Some(CursorCommand::Cancel),
        KeyCode::Char('r') | KeyCode::Char('R') => return Some(CursorCommand::Restart),

        _ => return None,
    };

    let arrow = matches!(
        key.code,
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down
    );
    if upper || (arrow && shifted) {
        Some(CursorCommand::SwapToward { dx, dy })
    } else {
        Some(CursorCommand::Move { dx, dy })
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
