use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind};
use indoc::indoc;
use tracing::Level;

use desk_widgets::config::{DataPaths, clamp_snap_threshold};
use desk_widgets::constants::CONTENT_TICK;
use desk_widgets::drivers::{ConsoleInputDriver, ConsoleOutputDriver, OutputDriver};
use desk_widgets::event_loop::{ControlFlow, EventLoop, LoopEvent};
use desk_widgets::error::WidgetError;
use desk_widgets::host::{CellScale, Compositor, SharedCompositor, TermDesktop, render};
use desk_widgets::layout::PointerOutcome;
use desk_widgets::persistence::LayoutPersistence;
use desk_widgets::renderer::{BasicRendererFactory, RendererState};
use desk_widgets::state::HostState;
use desk_widgets::tracing_sub::{self, LogSink};
use desk_widgets::window::{
    PointerEvent, SizeClass, WidgetId, WidgetKind, WidgetManager, ZBand,
};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const THRESHOLD_STEP: i32 = 5;
const OPACITY_STEP: f32 = 0.05;

const KEYS: &str = indoc! {"
    Keys:
      1-6      add clock, system monitor, timer, notes, image, web widget
      Tab      cycle focus (Shift+Tab backwards)
      c        toggle click-through on the focused widget
      p        pin the focused widget above others / unpin
      b        send the focused widget to the bottom
      x / X    close the focused widget / close all widgets
      u        disable click-through on every widget
      s        toggle snapping
      + / -    raise / lower the snap threshold
      [ / ]    lower / raise the global opacity
      l        toggle light and dark theme
      q        quit
"};

#[derive(Parser, Debug)]
#[command(
    name = "desk-widgets",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating desktop widgets with snapping, hosted on a terminal desktop",
    after_help = KEYS
)]
struct Cli {
    /// Layout document to load and save instead of ~/.desk-widgets/config.json.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Most verbose tracing level written to the log.
    #[arg(long, value_name = "LEVEL", default_value_t = Level::INFO)]
    log_level: Level,

    /// Log to stderr instead of the log file.
    #[arg(long)]
    log_stderr: bool,

    /// Start with snapping disabled for this session.
    #[arg(long)]
    no_snap: bool,

    /// Snap threshold in desktop pixels for this session.
    #[arg(long, value_name = "PX")]
    snap_threshold: Option<i32>,

    /// Desktop pixels covered by one terminal column.
    #[arg(long, value_name = "PX", default_value_t = 10,
          value_parser = clap::value_parser!(i32).range(1..=100))]
    cell_width: i32,

    /// Desktop pixels covered by one terminal row.
    #[arg(long, value_name = "PX", default_value_t = 20,
          value_parser = clap::value_parser!(i32).range(1..=100))]
    cell_height: i32,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let paths = DataPaths::resolve(cli.config.as_deref()).map_err(io::Error::other)?;
    let sink = if cli.log_stderr {
        LogSink::Stderr
    } else {
        LogSink::file_in(&paths.logs_dir)?
    };
    tracing_sub::init(cli.log_level, sink);
    tracing::info!(document = %paths.document.display(), "starting");

    let compositor = Rc::new(RefCell::new(Compositor::new(CellScale {
        width: cli.cell_width,
        height: cli.cell_height,
    })));
    let mut output = ConsoleOutputDriver::new()?;
    let (cols, rows) = output.grid_size()?;
    compositor.borrow_mut().set_grid(cols, rows.saturating_sub(1));

    let mut manager = WidgetManager::new(
        Box::new(TermDesktop::new(Rc::clone(&compositor))),
        Box::new(BasicRendererFactory),
        LayoutPersistence::new(paths.document.clone()),
    );
    if let Err(err) = manager.restore() {
        tracing::error!(error = %err, "layout not restored, starting empty");
    }
    if cli.no_snap {
        manager.settings_mut().snap_enabled = false;
    }
    if let Some(threshold) = cli.snap_threshold {
        manager.settings_mut().snap_threshold = clamp_snap_threshold(threshold);
    }

    let mut app = App {
        manager,
        compositor,
        state: HostState::new(),
    };
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), POLL_INTERVAL, CONTENT_TICK);
    let result = event_loop.run(|event| {
        let mut redraw = app.manager.tick(Instant::now());
        match event {
            LoopEvent::Input(Event::Key(key)) => {
                if app.handle_key(key) == ControlFlow::Quit {
                    return Ok(ControlFlow::Quit);
                }
                redraw = true;
            }
            LoopEvent::Input(Event::Mouse(mouse)) => {
                redraw |= app.handle_mouse(mouse.kind, mouse.column, mouse.row);
            }
            LoopEvent::Input(Event::Resize(cols, rows)) => {
                app.compositor
                    .borrow_mut()
                    .set_grid(cols, rows.saturating_sub(1));
                redraw = true;
            }
            LoopEvent::Tick(_) => redraw = true,
            LoopEvent::Input(_) | LoopEvent::Idle => {}
        }
        if redraw {
            output.draw(|frame| {
                render::draw(frame, &app.manager, &app.compositor.borrow(), &app.state)
            })?;
        }
        Ok(ControlFlow::Continue)
    });
    output.exit()?;
    tracing::info!("stopped");
    result
}

struct App {
    manager: WidgetManager,
    compositor: SharedCompositor,
    state: HostState,
}

impl App {
    fn handle_key(&mut self, key: KeyEvent) -> ControlFlow {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return ControlFlow::Quit;
        }
        let focused = self.state.focused().cloned();
        match key.code {
            KeyCode::Char('q') => return ControlFlow::Quit,
            KeyCode::Char(c @ '1'..='6') => {
                let kind = WidgetKind::ALL[usize::from(c as u8 - b'1')];
                match self
                    .manager
                    .add_widget(RendererState::empty(kind), SizeClass::Medium)
                {
                    Ok(id) => {
                        self.state.set_status(format!("added {} ({id})", kind.display_name()));
                        self.state.set_focus(Some(id));
                    }
                    Err(err) => self.report("add failed", &err),
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let order = self.manager.registry().ids();
                let forward = key.code == KeyCode::Tab;
                if let Some(id) = self.state.cycle_focus(&order, forward).cloned()
                    && let Err(err) = self.manager.raise(&id)
                {
                    self.report("raise failed", &err);
                }
                self.manager.reassert_pinned();
            }
            KeyCode::Char('c') => {
                if let Some(id) = focused {
                    match self.manager.toggle_click_through(&id) {
                        Ok(on) => self.state.set_status(format!(
                            "click-through {} for {id}",
                            if on { "on" } else { "off" }
                        )),
                        Err(err) => self.report("click-through failed", &err),
                    }
                }
            }
            KeyCode::Char('p') => {
                if let Some(id) = focused {
                    let pinned = self
                        .manager
                        .registry()
                        .get(&id)
                        .is_some_and(|w| w.z_band == ZBand::PinnedAbove);
                    let band = if pinned {
                        ZBand::Normal
                    } else {
                        ZBand::PinnedAbove
                    };
                    if let Err(err) = self.manager.set_z_band(&id, band) {
                        self.report("pin failed", &err);
                    }
                }
            }
            KeyCode::Char('b') => {
                if let Some(id) = focused
                    && let Err(err) = self.manager.set_z_band(&id, ZBand::SentToBottom)
                {
                    self.report("send to bottom failed", &err);
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = focused {
                    match self.manager.close_widget(&id) {
                        Ok(()) => self.state.set_status(format!("closed {id}")),
                        Err(err) => self.report("close failed", &err),
                    }
                    self.state.forget(&id);
                }
            }
            KeyCode::Char('X') => {
                let closed = self.manager.close_all();
                self.state = HostState::new();
                self.state.set_status(format!("closed {closed} widgets"));
            }
            KeyCode::Char('u') => {
                let changed = self.manager.broadcast_disable_click_through();
                self.state
                    .set_status(format!("click-through disabled on {changed} widgets"));
            }
            KeyCode::Char('s') => {
                let enabled = !self.manager.settings().snap_enabled;
                self.manager.set_snap_enabled(enabled);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let t = self.manager.settings().snap_threshold + THRESHOLD_STEP;
                self.manager.set_snap_threshold(t);
            }
            KeyCode::Char('-') => {
                let t = self.manager.settings().snap_threshold - THRESHOLD_STEP;
                self.manager.set_snap_threshold(t);
            }
            KeyCode::Char('[') => {
                let o = self.manager.settings().widget_opacity - OPACITY_STEP;
                self.manager.set_global_opacity(o);
            }
            KeyCode::Char(']') => {
                let o = self.manager.settings().widget_opacity + OPACITY_STEP;
                self.manager.set_global_opacity(o);
            }
            KeyCode::Char('l') => {
                self.manager.toggle_light_mode();
            }
            _ => {}
        }
        ControlFlow::Continue
    }

    /// Returns whether the screen needs a redraw.
    fn handle_mouse(&mut self, kind: MouseEventKind, col: u16, row: u16) -> bool {
        let point = self.compositor.borrow().cell_to_desktop(col, row);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self.compositor.borrow().hit_test(point);
                let Some(id) = hit else {
                    self.state.set_focus(None);
                    return true;
                };
                self.state.set_focus(Some(id.clone()));
                if let Err(err) = self.manager.raise(&id) {
                    self.report("raise failed", &err);
                }
                self.manager.reassert_pinned();
                match self
                    .manager
                    .pointer(&id, PointerEvent::down(point.x, point.y))
                {
                    Ok(PointerOutcome::DragStarted | PointerOutcome::ResizeStarted) => {
                        self.state.capture(id);
                    }
                    Ok(_) => {}
                    Err(err) => self.report("pointer failed", &err),
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(id) = self.state.captured().cloned() else {
                    return false;
                };
                self.send_pointer(&id, PointerEvent::moved(point.x, point.y))
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(id) = self.state.release() else {
                    return false;
                };
                self.send_pointer(&id, PointerEvent::up(point.x, point.y))
            }
            MouseEventKind::Moved => {
                let hit = self.compositor.borrow().hit_test(point);
                let mut changed = false;
                // The widget left behind sees a move outside its frame and
                // drops its hover state.
                if let Some(left) = self.state.hover(hit.clone()) {
                    changed |= self.send_pointer(&left, PointerEvent::moved(point.x, point.y));
                }
                if let Some(id) = hit {
                    changed |= self.send_pointer(&id, PointerEvent::moved(point.x, point.y));
                }
                changed
            }
            _ => false,
        }
    }

    fn send_pointer(&mut self, id: &WidgetId, event: PointerEvent) -> bool {
        match self.manager.pointer(id, event) {
            Ok(PointerOutcome::Ignored) => false,
            Ok(_) => true,
            Err(err) => {
                self.report("pointer failed", &err);
                true
            }
        }
    }

    fn report(&mut self, what: &str, err: &WidgetError) {
        tracing::warn!(error = %err, "{what}");
        self.state.set_status(format!("{what}: {err}"));
    }
}
