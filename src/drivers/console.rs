use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};

use super::{InputDriver, OutputDriver, coalesce_drags};

/// Reads crossterm events for the widget desktop.
///
/// Key releases and repeats are dropped, Shift+Tab arrives as BackTab, and
/// bursts of drag events are collapsed to the newest pointer position.
#[derive(Default)]
pub struct ConsoleInputDriver {
    pending: VecDeque<Event>,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Raw crossterm input with key filtering applied.
struct Filtered;

impl InputDriver for Filtered {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        loop {
            if let Some(event) = filter_keys(crossterm::event::read()?) {
                return Ok(event);
            }
        }
    }
}

fn filter_keys(event: Event) -> Option<Event> {
    let Event::Key(mut key) = event else {
        return Some(event);
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
        key.code = KeyCode::BackTab;
        key.modifiers.remove(KeyModifiers::SHIFT);
    }
    Some(Event::Key(key))
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        Ok(!self.pending.is_empty() || Filtered.poll(timeout)?)
    }

    fn read(&mut self) -> io::Result<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }
        let first = Filtered.read()?;
        coalesce_drags(&mut Filtered, first, &mut self.pending)
    }
}

/// Full-screen ratatui terminal on stdout. Restores the terminal on drop so
/// a panic in the UI loop does not leave the shell in raw mode.
pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
            active: false,
        })
    }
}

impl OutputDriver for ConsoleOutputDriver {
    fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        self.terminal.clear()?;
        self.active = true;
        tracing::debug!("terminal taken over");
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.terminal.backend_mut(),
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        tracing::debug!("terminal restored");
        Ok(())
    }

    fn grid_size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            tracing::warn!(error = %err, "terminal not restored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};

    #[test]
    fn parked_events_are_read_before_the_terminal() {
        let mut driver = ConsoleInputDriver::new();
        driver.pending.push_back(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 4,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }));
        assert!(driver.poll(Duration::ZERO).unwrap());
        let Event::Mouse(up) = driver.read().unwrap() else {
            panic!("expected the parked mouse event");
        };
        assert_eq!((up.column, up.row), (4, 7));
    }

    #[test]
    fn shift_tab_is_folded_into_backtab() {
        let event = Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT));
        let Some(Event::Key(key)) = filter_keys(event) else {
            panic!("expected a key");
        };
        assert_eq!(key.code, KeyCode::BackTab);
        assert!(key.modifiers.is_empty());
    }

    #[test]
    fn only_key_presses_survive() {
        let mut repeat = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        repeat.kind = KeyEventKind::Repeat;
        assert_eq!(filter_keys(Event::Key(repeat)), None);
        assert_eq!(filter_keys(Event::FocusGained), Some(Event::FocusGained));
    }
}
