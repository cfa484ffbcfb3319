//! Terminal input and output behind two small traits, so the UI loop can be
//! fed scripted events in tests.

pub mod console;

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, MouseEventKind};
use ratatui::Frame;

pub use console::{ConsoleInputDriver, ConsoleOutputDriver};

pub trait InputDriver {
    /// Whether an event can be read without blocking past `timeout`.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }
}

pub trait OutputDriver {
    /// Take over the terminal: alternate screen, raw mode, mouse capture.
    fn enter(&mut self) -> io::Result<()>;
    /// Hand the terminal back. Safe to call twice.
    fn exit(&mut self) -> io::Result<()>;
    /// Current grid as `(columns, rows)`.
    fn grid_size(&self) -> io::Result<(u16, u16)>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame<'_>);
}

fn is_drag(event: &Event) -> bool {
    matches!(event, Event::Mouse(m) if matches!(m.kind, MouseEventKind::Drag(_)))
}

/// Collapse a run of queued drag events into the newest one.
///
/// A pointer drag can deliver dozens of events per frame; only the last
/// position matters for the moving window. The first non-drag event that
/// ends the run is parked in `pending` so it is delivered next, in order.
pub fn coalesce_drags<D: InputDriver>(
    driver: &mut D,
    first: Event,
    pending: &mut VecDeque<Event>,
) -> io::Result<Event> {
    if !is_drag(&first) {
        return Ok(first);
    }
    let mut latest = first;
    while driver.poll(Duration::ZERO)? {
        let next = driver.read()?;
        if is_drag(&next) {
            latest = next;
        } else {
            pending.push_back(next);
            break;
        }
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent};

    struct Script(VecDeque<Event>);

    impl InputDriver for Script {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.0.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.0.pop_front().ok_or_else(|| io::Error::other("drained"))
        }
    }

    fn mouse(kind: MouseEventKind, column: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row: 0,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn drag(column: u16) -> Event {
        mouse(MouseEventKind::Drag(MouseButton::Left), column)
    }

    #[test]
    fn drag_run_collapses_to_last_position() {
        let up = mouse(MouseEventKind::Up(MouseButton::Left), 9);
        let mut script = Script(VecDeque::from([drag(2), drag(3), up.clone(), drag(7)]));
        let mut pending = VecDeque::new();

        let got = coalesce_drags(&mut &mut script, drag(1), &mut pending).unwrap();
        assert_eq!(got, drag(3));
        assert_eq!(pending, VecDeque::from([up]));
        assert_eq!(script.0, VecDeque::from([drag(7)]));
    }

    #[test]
    fn other_events_pass_through_untouched() {
        let mut script = Script(VecDeque::from([drag(2)]));
        let mut pending = VecDeque::new();
        let resize = Event::Resize(80, 24);
        assert_eq!(
            coalesce_drags(&mut script, resize.clone(), &mut pending).unwrap(),
            resize
        );
        assert!(pending.is_empty());
        assert_eq!(script.0.len(), 1);
    }
}
