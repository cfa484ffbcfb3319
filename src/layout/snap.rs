//! Drag-time snapping against screen edges and sibling widgets.
//!
//! Each axis is resolved independently. Screen edges are checked first and a
//! sibling match on the same axis overrides them. Between siblings the nearest
//! edge wins; siblings at an equal distance resolve to the one visited last.

use crate::constants::{DEFAULT_SNAP_THRESHOLD, SNAP_INDICATOR_THICKNESS};
use crate::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapSettings {
    pub enabled: bool,
    /// Maximum distance in pixels (exclusive) at which an edge attracts.
    pub threshold: i32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

/// Side of the *moving* window that ended up flush with something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapSide {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapSource {
    Screen,
    /// Index into the sibling slice passed with the query.
    Sibling(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapMatch {
    pub side: SnapSide,
    pub source: SnapSource,
    /// Snapped coordinate of the window origin on this axis.
    pub value: i32,
    pub distance: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct SnapQuery<'a> {
    /// Unsnapped top-left derived from the pointer.
    pub candidate: Point,
    /// Size of the moving window frame.
    pub size: Size,
    /// Available bounds of the monitor under the pointer.
    pub screen: Rect,
    /// Frames of the other visible widgets.
    pub siblings: &'a [Rect],
    pub settings: SnapSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapResult {
    pub x: Option<SnapMatch>,
    pub y: Option<SnapMatch>,
    /// Strip in window-local coordinates along the matched edge.
    pub indicator: Rect,
}

impl SnapResult {
    pub fn snap_x(&self) -> Option<i32> {
        self.x.map(|m| m.value)
    }

    pub fn snap_y(&self) -> Option<i32> {
        self.y.map(|m| m.value)
    }

    /// Replace the snapped axes of `candidate`, leaving the others untouched.
    pub fn apply(&self, candidate: Point) -> Point {
        Point::new(
            self.snap_x().unwrap_or(candidate.x),
            self.snap_y().unwrap_or(candidate.y),
        )
    }
}

/// Resolve a drag candidate. Returns `None` when snapping is disabled or no
/// edge lies within the threshold on either axis.
pub fn snap_position(query: &SnapQuery<'_>) -> Option<SnapResult> {
    if !query.settings.enabled {
        return None;
    }
    let threshold = query.settings.threshold;
    let cand = query.candidate;
    let size = query.size;
    let screen = query.screen;
    let near = |distance: i32| distance < threshold;

    let mut x = screen_match(
        cand.x,
        size.width,
        screen.x,
        screen.right(),
        SnapSide::Left,
        SnapSide::Right,
        threshold,
    );
    let mut y = screen_match(
        cand.y,
        size.height,
        screen.y,
        screen.bottom(),
        SnapSide::Top,
        SnapSide::Bottom,
        threshold,
    );

    let moving = Rect::from_parts(cand, size);
    let mut sibling_x: Option<SnapMatch> = None;
    let mut sibling_y: Option<SnapMatch> = None;
    for (idx, other) in query.siblings.iter().enumerate() {
        if ranges_overlap(moving.y, moving.bottom(), other.y, other.bottom()) {
            let to_left = (moving.right() - other.x).abs();
            if near(to_left) {
                keep_nearest(
                    &mut sibling_x,
                    SnapMatch {
                        side: SnapSide::Right,
                        source: SnapSource::Sibling(idx),
                        value: other.x - size.width,
                        distance: to_left,
                    },
                );
            }
            let to_right = (moving.x - other.right()).abs();
            if near(to_right) {
                keep_nearest(
                    &mut sibling_x,
                    SnapMatch {
                        side: SnapSide::Left,
                        source: SnapSource::Sibling(idx),
                        value: other.right(),
                        distance: to_right,
                    },
                );
            }
        }
        if ranges_overlap(moving.x, moving.right(), other.x, other.right()) {
            let to_top = (moving.bottom() - other.y).abs();
            if near(to_top) {
                keep_nearest(
                    &mut sibling_y,
                    SnapMatch {
                        side: SnapSide::Bottom,
                        source: SnapSource::Sibling(idx),
                        value: other.y - size.height,
                        distance: to_top,
                    },
                );
            }
            let to_bottom = (moving.y - other.bottom()).abs();
            if near(to_bottom) {
                keep_nearest(
                    &mut sibling_y,
                    SnapMatch {
                        side: SnapSide::Top,
                        source: SnapSource::Sibling(idx),
                        value: other.bottom(),
                        distance: to_bottom,
                    },
                );
            }
        }
    }
    if sibling_x.is_some() {
        x = sibling_x;
    }
    if sibling_y.is_some() {
        y = sibling_y;
    }

    let side = x.or(y)?.side;
    Some(SnapResult {
        x,
        y,
        indicator: indicator_strip(side, size),
    })
}

fn screen_match(
    origin: i32,
    extent: i32,
    low: i32,
    high: i32,
    low_side: SnapSide,
    high_side: SnapSide,
    threshold: i32,
) -> Option<SnapMatch> {
    let to_low = (origin - low).abs();
    if to_low < threshold {
        return Some(SnapMatch {
            side: low_side,
            source: SnapSource::Screen,
            value: low,
            distance: to_low,
        });
    }
    let to_high = (origin + extent - high).abs();
    if to_high < threshold {
        return Some(SnapMatch {
            side: high_side,
            source: SnapSource::Screen,
            value: high - extent,
            distance: to_high,
        });
    }
    None
}

fn keep_nearest(best: &mut Option<SnapMatch>, candidate: SnapMatch) {
    match best {
        Some(current) if current.distance < candidate.distance => {}
        _ => *best = Some(candidate),
    }
}

/// Closed-interval intersection: windows that merely touch still count as
/// aligned so corner-stacked widgets can snap side by side.
pub fn ranges_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start <= b_end && b_start <= a_end
}

pub fn indicator_strip(side: SnapSide, size: Size) -> Rect {
    let t = SNAP_INDICATOR_THICKNESS;
    match side {
        SnapSide::Left => Rect::new(0, 0, t, size.height),
        SnapSide::Right => Rect::new(size.width - t, 0, t, size.height),
        SnapSide::Top => Rect::new(0, 0, size.width, t),
        SnapSide::Bottom => Rect::new(0, size.height - t, size.width, t),
    }
}
