use super::*;
use crate::gesture::{
    damped::DampedPositionFilter, direction::DirectionVector, timer::RecognitionTimer,
};
use statig::prelude::*;

mod policy;

pub(super) struct SwipeHsm {
    status: SwipeStatus,
    touch_id: Option<TouchId>,
    start_pos: Point,
    start_scene_pos: Point,
    damped_scene: DampedPositionFilter,
    previous_damped_scene_pos: Point,
    public_filter: DampedPositionFilter,
    public_scene_filter: DampedPositionFilter,
    public_pos: Point,
    public_scene_pos: Point,
    distance: f32,
    scene_distance: f32,
    direction: DirectionVector,
    pool: ActiveTouchPool,
    timer: RecognitionTimer,
    ownership_granted: bool,
    axis_travel: f32,
}

impl SwipeHsm {
    pub(super) fn new() -> Self {
        Self {
            status: SwipeStatus::WaitingForTouch,
            touch_id: None,
            start_pos: Point::ZERO,
            start_scene_pos: Point::ZERO,
            damped_scene: DampedPositionFilter::default(),
            previous_damped_scene_pos: Point::ZERO,
            public_filter: DampedPositionFilter::default(),
            public_scene_filter: DampedPositionFilter::default(),
            public_pos: Point::ZERO,
            public_scene_pos: Point::ZERO,
            distance: 0.0,
            scene_distance: 0.0,
            direction: DirectionVector::default(),
            pool: ActiveTouchPool::new(),
            timer: RecognitionTimer::new(),
            ownership_granted: false,
            axis_travel: 0.0,
        }
    }

    pub(super) fn status(&self) -> SwipeStatus {
        self.status
    }

    pub(super) fn touch_id(&self) -> Option<TouchId> {
        self.touch_id
    }

    pub(super) fn public_pos(&self) -> Point {
        self.public_pos
    }

    pub(super) fn public_scene_pos(&self) -> Point {
        self.public_scene_pos
    }

    pub(super) fn distance(&self) -> f32 {
        self.distance
    }

    pub(super) fn scene_distance(&self) -> f32 {
        self.scene_distance
    }

    pub(super) fn pool(&self) -> &ActiveTouchPool {
        &self.pool
    }

    pub(super) fn trace(&self, now_ms: u64, reject_reason: RejectReason) -> SwipeTraceSample {
        SwipeTraceSample {
            now_ms,
            status: self.status,
            reject_reason,
            touch_id: self.touch_id,
            axis_travel: self.axis_travel,
            owns_touch: self.ownership_granted,
        }
    }
}

#[state_machine(initial = "State::waiting_for_touch()")]
impl SwipeHsm {
    #[state]
    fn waiting_for_touch(
        &mut self,
        context: &mut DispatchContext,
        event: &SwipeHsmEvent,
    ) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Sample { snapshot, stream } => {
                let outcome = self.offer_press(context, snapshot, *stream);
                self.settle_pool(context, snapshot);
                outcome
            }
            SwipeHsmEvent::Ownership { touch_id, gained } => {
                log::debug!(
                    "{:?}: ignoring ownership event for untracked touch {} (gained={})",
                    context.recognizer,
                    touch_id,
                    gained
                );
                Handled
            }
            SwipeHsmEvent::Timer { .. } | SwipeHsmEvent::Cancel => Handled,
        }
    }

    #[state(superstate = "tracking")]
    fn undecided(&mut self, context: &mut DispatchContext, event: &SwipeHsmEvent) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Sample { snapshot, stream } => {
                let outcome = self.evaluate_candidate(context, snapshot, *stream);
                self.settle_pool(context, snapshot);
                outcome
            }
            SwipeHsmEvent::Timer { now_ms } => {
                if self.timer.poll(*now_ms) {
                    log::debug!(
                        "{:?}: undecided for {}ms, timing out",
                        context.recognizer,
                        context.config.max_time_ms
                    );
                    return self.reject(context, RejectReason::Timeout);
                }
                Handled
            }
            _ => Super,
        }
    }

    #[state(superstate = "tracking")]
    fn recognized(
        &mut self,
        context: &mut DispatchContext,
        event: &SwipeHsmEvent,
    ) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Sample { snapshot, stream } => {
                let outcome = self.follow_touch(context, snapshot, *stream);
                self.settle_pool(context, snapshot);
                outcome
            }
            SwipeHsmEvent::Ownership {
                touch_id,
                gained: true,
            } if self.touch_id == Some(*touch_id) => {
                log::debug!("{:?}: owns touch {}", context.recognizer, touch_id);
                self.ownership_granted = true;
                Handled
            }
            SwipeHsmEvent::Timer { .. } => Handled,
            _ => Super,
        }
    }

    #[superstate]
    fn tracking(&mut self, context: &mut DispatchContext, event: &SwipeHsmEvent) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Ownership {
                touch_id,
                gained: false,
            } if self.touch_id == Some(*touch_id) => self.yield_touch(context),
            SwipeHsmEvent::Ownership { touch_id, gained } => {
                log::debug!(
                    "{:?}: ignoring ownership event for touch {} (gained={}) while tracking {:?}",
                    context.recognizer,
                    touch_id,
                    gained,
                    self.touch_id
                );
                Handled
            }
            SwipeHsmEvent::Cancel => self.reject(context, RejectReason::Cancelled),
            _ => Handled,
        }
    }
}
