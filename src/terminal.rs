//! Interactive terminal session
//!
//! Alternate screen, hidden cursor and raw-mode keyboard input via crossterm.
//! Keys map onto the same [`Command`]s the socket accepts, so space pauses,
//! 1-5 pick a color mode and `+`/`=`/`-` change speed.

use crate::control::parse_command;
use crate::driver::Command;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::tty::IsTty;
use crossterm::{cursor, execute, style, terminal};
use std::io;
use std::time::Duration;

/// Something the terminal told the host between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalInput {
    Command(Command),
    Resize { width: usize, height: usize },
}

/// Grid size for a terminal of `columns` x `rows`.
///
/// The last line stays free so writing the final row never scrolls.
pub fn grid_size(columns: u16, rows: u16) -> (usize, usize) {
    (columns as usize, (rows as usize).saturating_sub(1).max(1))
}

/// Grid size of the controlling terminal, if there is one
pub fn current_grid_size() -> Option<(usize, usize)> {
    terminal::size()
        .ok()
        .filter(|&(columns, rows)| columns > 0 && rows > 0)
        .map(|(columns, rows)| grid_size(columns, rows))
}

/// True when both ends of the session are a terminal
pub fn is_interactive() -> bool {
    io::stdout().is_tty() && io::stdin().is_tty()
}

/// Map a key press onto a driver command
pub fn key_command(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Raw mode swallows SIGINT
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(Command::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char(c) => parse_command(&c.to_string()),
        _ => None,
    }
}

pub fn translate(event: &Event) -> Option<TerminalInput> {
    match event {
        Event::Key(key) => key_command(key).map(TerminalInput::Command),
        Event::Resize(columns, rows) => {
            let (width, height) = grid_size(*columns, *rows);
            Some(TerminalInput::Resize { width, height })
        },
        _ => None,
    }
}

/// Alternate screen with a hidden cursor and raw keyboard input.
///
/// Dropping the session restores the terminal, so every exit path out of
/// the host loop (quit, frame limit, write error) leaves it usable.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        // Built before raw mode so a failure below still restores the screen
        let session = Self { _private: () };
        terminal::enable_raw_mode()?;
        log::debug!("Terminal session started");
        Ok(session)
    }

    /// Drain every pending terminal event without blocking
    pub fn poll_inputs(&self) -> io::Result<Vec<TerminalInput>> {
        let mut inputs = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Some(input) = translate(&event::read()?) {
                inputs.push(input);
            }
        }
        Ok(inputs)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Failed to leave raw mode: {}", e);
        }
        if let Err(e) = execute!(
            io::stdout(),
            style::ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        ) {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}
