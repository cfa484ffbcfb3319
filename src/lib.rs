//! Floating desktop widget engine.
//!
//! Widgets are frameless windows the user drags, resizes, layers and makes
//! click-through. Drags snap to screen edges and to sibling widgets, and the
//! whole layout is written to a JSON document after every settled change.
//!
//! [`window::WidgetManager`] is the entry point. It talks to real windows
//! only through [`window::DesktopHost`] and [`window::NativeWindowCapability`];
//! the [`host`] module implements both on top of a terminal.

pub mod animation;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod persistence;
pub mod renderer;
pub mod state;
pub mod tracing_sub;
pub mod window;

pub use error::{Result, WidgetError};
