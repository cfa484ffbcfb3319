//! Shared crate-wide constants.

use std::time::Duration;

/// Transparent margin drawn around every widget card for its drop shadow.
///
/// The native window frame is the content size plus this margin on each side.
/// Units: desktop pixels.
pub const SHADOW_MARGIN: i32 = 10;

/// Side length of the square resize hot-zone anchored at the bottom-right
/// corner of the card (inside the shadow margin).
pub const RESIZE_HANDLE_SIZE: i32 = 16;

/// Gap between the card corner and the painted resize grip triangle.
pub const RESIZE_GRIP_INSET: i32 = 4;

/// Thickness of the strip painted along the matched edge while a drag snaps.
pub const SNAP_INDICATOR_THICKNESS: i32 = 3;

pub const MIN_CONTENT_WIDTH: i32 = 200;
pub const MAX_CONTENT_WIDTH: i32 = 800;
pub const MIN_CONTENT_HEIGHT: i32 = 150;
pub const MAX_CONTENT_HEIGHT: i32 = 600;

pub const MIN_OPACITY: f32 = 0.5;
pub const MAX_OPACITY: f32 = 1.0;
pub const DEFAULT_OPACITY: f32 = 0.95;

pub const DEFAULT_SNAP_THRESHOLD: i32 = 20;
/// Range accepted for the user-configurable snap threshold.
pub const SNAP_THRESHOLD_RANGE: std::ops::RangeInclusive<i32> = 5..=50;

/// Largest absolute origin coordinate accepted from the layout document.
/// Units: desktop pixels.
pub const MAX_WIDGET_COORD: i32 = 1_000_000;

/// Where a freshly added widget appears before the user moves it.
pub const DEFAULT_WIDGET_POSITION: (i32, i32) = (100, 100);

/// Interval of the per-window content tick that drives renderer redraws.
pub const CONTENT_TICK: Duration = Duration::from_secs(1);

/// Duration of the opacity fade played when a widget is shown.
pub const FADE_IN_DURATION: Duration = Duration::from_millis(200);

/// Number of hex characters kept from a generated UUID for widget ids.
pub const WIDGET_ID_LEN: usize = 8;
