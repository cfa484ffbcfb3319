pub mod floating;
pub mod snap;

pub use floating::{
    DragEnv, Interaction, InteractionState, PointerOutcome, SettleKind, clamp_content_size,
    frame_size, is_on_resize_handle, resize_grip, resize_hot_zone,
};
pub use snap::{
    SnapMatch, SnapQuery, SnapResult, SnapSettings, SnapSide, SnapSource, snap_position,
};
