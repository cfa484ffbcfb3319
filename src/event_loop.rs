use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Input(Event),
    /// The tick interval elapsed; carries the time it fired.
    Tick(Instant),
    /// A poll interval passed with nothing to report.
    Idle,
}

/// The single UI loop: every input read, tick and redraw happens on the
/// thread that calls [`EventLoop::run`].
///
/// Bursts of queued input (pointer drags mostly) are drained in one pass so
/// drawing never falls behind the input stream.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
    tick_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration, tick_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
            tick_interval,
        }
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(LoopEvent) -> io::Result<ControlFlow>,
    {
        let mut last_tick = Instant::now();
        if let ControlFlow::Quit = handler(LoopEvent::Tick(last_tick))? {
            return Ok(());
        }
        loop {
            let now = Instant::now();
            if now.saturating_duration_since(last_tick) >= self.tick_interval {
                last_tick = now;
                if let ControlFlow::Quit = handler(LoopEvent::Tick(now))? {
                    return Ok(());
                }
            }

            if self.driver.poll(self.poll_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(LoopEvent::Input(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            } else if let ControlFlow::Quit = handler(LoopEvent::Idle)? {
                return Ok(());
            }
        }
    }
}
