use crate::constants::{
    MAX_CONTENT_HEIGHT, MAX_CONTENT_WIDTH, MIN_CONTENT_HEIGHT, MIN_CONTENT_WIDTH,
    RESIZE_GRIP_INSET, RESIZE_HANDLE_SIZE, SHADOW_MARGIN,
};
use crate::geometry::{Point, Rect, Size};

use super::snap::{SnapQuery, SnapResult, SnapSettings, snap_position};

/// Pointer-to-origin offset captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragCapture {
    pub offset: Point,
}

/// Press point and content size captured when a resize starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeCapture {
    pub press: Point,
    pub anchor: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragCapture),
    Resizing(ResizeCapture),
    /// The window was closed; every later pointer event is dropped.
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    /// Pointer moved without a button held; reports the cursor affordance.
    Hover { on_resize_handle: bool },
    DragStarted,
    ResizeStarted,
    Moved {
        origin: Point,
        snap: Option<SnapResult>,
    },
    Resized {
        content: Size,
    },
    Settled(SettleKind),
}

/// Inputs a drag step needs besides the pointer itself.
#[derive(Debug, Clone, Copy)]
pub struct DragEnv<'a> {
    /// Current frame of the moving window (content plus shadow margin).
    pub frame: Rect,
    pub screen: Rect,
    pub siblings: &'a [Rect],
    pub settings: SnapSettings,
}

/// Per-window drag/resize controller.
///
/// Drag and resize are mutually exclusive for one window; separate windows
/// each own an independent `Interaction`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            InteractionState::Dragging(_) | InteractionState::Resizing(_)
        )
    }

    pub fn is_terminated(&self) -> bool {
        self.state == InteractionState::Terminated
    }

    /// `pointer` is in desktop coordinates; `frame` is the window frame and
    /// `content` its current card size.
    pub fn pointer_down(&mut self, pointer: Point, frame: Rect, content: Size) -> PointerOutcome {
        if self.state != InteractionState::Idle || !frame.contains(pointer) {
            return PointerOutcome::Ignored;
        }
        let local = pointer - frame.origin();
        if is_on_resize_handle(frame.size(), local) {
            self.state = InteractionState::Resizing(ResizeCapture {
                press: pointer,
                anchor: content,
            });
            PointerOutcome::ResizeStarted
        } else {
            self.state = InteractionState::Dragging(DragCapture { offset: local });
            PointerOutcome::DragStarted
        }
    }

    pub fn pointer_move(&mut self, pointer: Point, env: &DragEnv<'_>) -> PointerOutcome {
        match self.state {
            InteractionState::Idle => PointerOutcome::Hover {
                on_resize_handle: env.frame.contains(pointer)
                    && is_on_resize_handle(env.frame.size(), pointer - env.frame.origin()),
            },
            InteractionState::Dragging(capture) => {
                let candidate = pointer - capture.offset;
                let snap = snap_position(&SnapQuery {
                    candidate,
                    size: env.frame.size(),
                    screen: env.screen,
                    siblings: env.siblings,
                    settings: env.settings,
                });
                let origin = snap.map_or(candidate, |s| s.apply(candidate));
                PointerOutcome::Moved { origin, snap }
            }
            InteractionState::Resizing(capture) => {
                let delta = pointer - capture.press;
                PointerOutcome::Resized {
                    content: clamp_content_size(Size::new(
                        capture.anchor.width.saturating_add(delta.x),
                        capture.anchor.height.saturating_add(delta.y),
                    )),
                }
            }
            InteractionState::Terminated => PointerOutcome::Ignored,
        }
    }

    pub fn pointer_up(&mut self) -> PointerOutcome {
        let kind = match self.state {
            InteractionState::Dragging(_) => SettleKind::Drag,
            InteractionState::Resizing(_) => SettleKind::Resize,
            InteractionState::Idle | InteractionState::Terminated => {
                return PointerOutcome::Ignored;
            }
        };
        self.state = InteractionState::Idle;
        PointerOutcome::Settled(kind)
    }

    /// Drop any capture without settling. Returns whether a drag or resize
    /// was in flight.
    pub fn terminate(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = InteractionState::Terminated;
        was_active
    }
}

pub fn clamp_content_size(size: Size) -> Size {
    Size::new(
        size.width.clamp(MIN_CONTENT_WIDTH, MAX_CONTENT_WIDTH),
        size.height.clamp(MIN_CONTENT_HEIGHT, MAX_CONTENT_HEIGHT),
    )
}

/// Native frame size for a card of `content` size.
pub fn frame_size(content: Size) -> Size {
    Size::new(
        content.width + SHADOW_MARGIN * 2,
        content.height + SHADOW_MARGIN * 2,
    )
}

/// Square hot-zone at the card's bottom-right corner, in frame-local
/// coordinates.
pub fn resize_hot_zone(frame: Size) -> Rect {
    Rect::new(
        frame.width - SHADOW_MARGIN - RESIZE_HANDLE_SIZE,
        frame.height - SHADOW_MARGIN - RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
    )
}

pub fn is_on_resize_handle(frame: Size, local: Point) -> bool {
    resize_hot_zone(frame).contains(local)
}

/// Vertices of the grip triangle painted inside the hot-zone, in frame-local
/// coordinates: right-angle corner first.
pub fn resize_grip(frame: Size) -> [Point; 3] {
    let corner_x = frame.width - SHADOW_MARGIN - RESIZE_GRIP_INSET;
    let corner_y = frame.height - SHADOW_MARGIN - RESIZE_GRIP_INSET;
    [
        Point::new(corner_x, corner_y),
        Point::new(corner_x - RESIZE_HANDLE_SIZE, corner_y),
        Point::new(corner_x, corner_y - RESIZE_HANDLE_SIZE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: Size = Size::new(220, 220);
    const FRAME: Rect = Rect::new(100, 100, 240, 240);
    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    fn env(frame: Rect, siblings: &[Rect]) -> DragEnv<'_> {
        DragEnv {
            frame,
            screen: SCREEN,
            siblings,
            settings: SnapSettings::default(),
        }
    }

    #[test]
    fn clamp_limits_both_directions() {
        assert_eq!(clamp_content_size(Size::new(900, 700)), Size::new(800, 600));
        assert_eq!(clamp_content_size(Size::new(50, 50)), Size::new(200, 150));
        assert_eq!(clamp_content_size(Size::new(300, 300)), Size::new(300, 300));
    }

    #[test]
    fn hot_zone_sits_inside_shadow_margin() {
        let zone = resize_hot_zone(Size::new(240, 240));
        assert_eq!(zone, Rect::new(214, 214, 16, 16));
        assert!(is_on_resize_handle(Size::new(240, 240), Point::new(229, 229)));
        // Inside the shadow margin, not on the card.
        assert!(!is_on_resize_handle(Size::new(240, 240), Point::new(232, 232)));
    }

    #[test]
    fn press_on_corner_starts_resize_and_clamps() {
        let mut it = Interaction::new();
        let press = Point::new(100 + 220, 100 + 220);
        assert_eq!(
            it.pointer_down(press, FRAME, CONTENT),
            PointerOutcome::ResizeStarted
        );
        let out = it.pointer_move(Point::new(press.x + 900, press.y + 900), &env(FRAME, &[]));
        assert_eq!(
            out,
            PointerOutcome::Resized {
                content: Size::new(800, 600)
            }
        );
        let out = it.pointer_move(Point::new(press.x - 500, press.y - 500), &env(FRAME, &[]));
        assert_eq!(
            out,
            PointerOutcome::Resized {
                content: Size::new(200, 150)
            }
        );
        assert_eq!(it.pointer_up(), PointerOutcome::Settled(SettleKind::Resize));
        assert_eq!(it.state(), InteractionState::Idle);
    }

    #[test]
    fn press_elsewhere_drags_with_captured_offset() {
        let mut it = Interaction::new();
        assert_eq!(
            it.pointer_down(Point::new(150, 130), FRAME, CONTENT),
            PointerOutcome::DragStarted
        );
        assert_eq!(
            it.state(),
            InteractionState::Dragging(DragCapture {
                offset: Point::new(50, 30)
            })
        );
        let out = it.pointer_move(Point::new(650, 530), &env(FRAME, &[]));
        assert_eq!(
            out,
            PointerOutcome::Moved {
                origin: Point::new(600, 500),
                snap: None
            }
        );
    }

    #[test]
    fn drag_passes_through_snapping() {
        let mut it = Interaction::new();
        it.pointer_down(Point::new(150, 130), FRAME, CONTENT);
        let PointerOutcome::Moved { origin, snap } =
            it.pointer_move(Point::new(62, 530), &env(FRAME, &[]))
        else {
            panic!("expected a move");
        };
        assert_eq!(origin, Point::new(0, 500));
        assert!(snap.is_some());
    }

    #[test]
    fn second_press_while_captured_is_ignored() {
        let mut it = Interaction::new();
        it.pointer_down(Point::new(150, 130), FRAME, CONTENT);
        assert_eq!(
            it.pointer_down(Point::new(320, 320), FRAME, CONTENT),
            PointerOutcome::Ignored
        );
        assert!(matches!(it.state(), InteractionState::Dragging(_)));
    }

    #[test]
    fn idle_move_reports_hover_affordance() {
        let mut it = Interaction::new();
        assert_eq!(
            it.pointer_move(Point::new(325, 325), &env(FRAME, &[])),
            PointerOutcome::Hover {
                on_resize_handle: true
            }
        );
        assert_eq!(
            it.pointer_move(Point::new(150, 150), &env(FRAME, &[])),
            PointerOutcome::Hover {
                on_resize_handle: false
            }
        );
    }

    #[test]
    fn terminate_mid_drag_discards_capture() {
        let mut it = Interaction::new();
        it.pointer_down(Point::new(150, 130), FRAME, CONTENT);
        assert!(it.terminate());
        assert!(it.is_terminated());
        assert_eq!(it.pointer_up(), PointerOutcome::Ignored);
        assert_eq!(
            it.pointer_move(Point::new(10, 10), &env(FRAME, &[])),
            PointerOutcome::Ignored
        );
        assert_eq!(
            it.pointer_down(Point::new(150, 130), FRAME, CONTENT),
            PointerOutcome::Ignored
        );
    }

    #[test]
    fn release_without_capture_is_ignored() {
        let mut it = Interaction::new();
        assert_eq!(it.pointer_up(), PointerOutcome::Ignored);
        assert!(!it.terminate());
    }
}
