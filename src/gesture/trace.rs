use crate::{
    gesture::types::{RejectReason, SwipeStatus},
    types::TouchId,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SwipeTraceSample {
    pub now_ms: u64,
    pub status: SwipeStatus,
    pub reject_reason: RejectReason,
    pub touch_id: Option<TouchId>,
    /// Raw displacement from the press point projected onto the gesture axis.
    pub axis_travel: f32,
    pub owns_touch: bool,
}
