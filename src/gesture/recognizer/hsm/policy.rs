use super::*;
use crate::{
    config::SwipeConfig,
    gesture::types::Diagnostic,
    types::{fuzzy_eq, TouchPoint, TouchPointState},
};

impl SwipeHsm {
    /// Decides whether a press seen while waiting becomes the new candidate.
    pub(super) fn offer_press(
        &mut self,
        context: &mut DispatchContext,
        snapshot: &TouchSnapshot,
        stream: SampleStream,
    ) -> Outcome<State> {
        if stream == SampleStream::Unowned || !snapshot.has_pressed() {
            return Handled;
        }

        if !context.accepts_touches {
            log::debug!("{:?}: inactive, ignoring press", context.recognizer);
            watch_presses(context, snapshot);
            return Handled;
        }

        if self.composition_window_open(&context.config, snapshot.t_ms) {
            log::debug!(
                "{:?}: press at {}ms inside composition window",
                context.recognizer,
                snapshot.t_ms
            );
            context.reject(RejectReason::CompositionWindow);
            watch_presses(context, snapshot);
            return Handled;
        }

        if snapshot.pressed().count() > 1 {
            log::debug!(
                "{:?}: several touches pressed at {}ms",
                context.recognizer,
                snapshot.t_ms
            );
            context.reject(RejectReason::MultiFinger);
            watch_presses(context, snapshot);
            return Handled;
        }

        let Some(point) = snapshot.pressed().next().copied() else {
            return Handled;
        };

        if let Err(violation) = context.config.check_recognition_invariants() {
            log::warn!(
                "{:?}: refusing touch {}: {}",
                context.recognizer,
                point.id,
                violation
            );
            context.emit(SwipeSignal::Diagnostic(Diagnostic::InvalidConfiguration {
                touch_id: point.id,
                violation,
            }));
            context.reject(RejectReason::InvalidConfiguration);
            context
                .registry
                .add_touch_watcher(point.id, context.recognizer);
            return Handled;
        }

        self.begin_candidate(context, &point);

        if context.config.recognition_disabled() {
            context
                .registry
                .request_touch_ownership(point.id, context.recognizer);
            self.set_status(context, SwipeStatus::Recognized);
            return Transition(State::recognized());
        }

        self.timer.start(snapshot.t_ms, context.config.max_time_ms);
        self.set_status(context, SwipeStatus::Undecided);
        Transition(State::undecided())
    }

    /// Runs the disambiguation policy for one sample of the candidate touch.
    pub(super) fn evaluate_candidate(
        &mut self,
        context: &mut DispatchContext,
        snapshot: &TouchSnapshot,
        stream: SampleStream,
    ) -> Outcome<State> {
        let Some(touch_id) = self.touch_id else {
            return self.enter_waiting(context);
        };

        if snapshot.pressed().any(|point| point.id != touch_id) {
            log::debug!(
                "{:?}: another finger pressed while touch {} undecided",
                context.recognizer,
                touch_id
            );
            watch_presses(context, snapshot);
            return self.reject(context, RejectReason::MultiFinger);
        }

        let Some(point) = snapshot.point(touch_id).copied() else {
            if stream == SampleStream::Unowned {
                return self.vanish(context, touch_id);
            }
            return Handled;
        };

        if point.state == TouchPointState::Released {
            log::debug!(
                "{:?}: touch {} released before recognition",
                context.recognizer,
                touch_id
            );
            context
                .registry
                .remove_candidate_owner_for_touch(touch_id, context.recognizer);
            context.reject(RejectReason::ReleasedEarly);
            return self.enter_waiting(context);
        }

        let movement = point.scene_pos - self.start_scene_pos;
        self.axis_travel = self.direction.project(movement);

        let damped = self.damped_scene.update(point.scene_pos);
        let step = damped - self.previous_damped_scene_pos;
        self.previous_damped_scene_pos = damped;

        let sign_free = self.direction.direction().is_sign_free();
        if !sign_free && self.direction.project(step) < 0.0 {
            return self.reject(context, RejectReason::WrongDirection);
        }

        if self.composition_window_open(&context.config, snapshot.t_ms) {
            return Handled;
        }

        let travel = if sign_free {
            self.axis_travel.abs()
        } else {
            self.axis_travel
        };
        if travel > context.config.distance_threshold() {
            log::debug!(
                "{:?}: touch {} recognized after {:.1}px",
                context.recognizer,
                touch_id,
                travel
            );
            context
                .registry
                .request_touch_ownership(touch_id, context.recognizer);
            self.timer.stop();
            self.set_status(context, SwipeStatus::Recognized);
            self.publish(context, point.pos, point.scene_pos, false);
            return Transition(State::recognized());
        }

        if movement.length() > context.config.max_distance() {
            return self.reject(context, RejectReason::PastMaxDistance);
        }

        Handled
    }

    /// Publishes the recognized touch until it ends.
    pub(super) fn follow_touch(
        &mut self,
        context: &mut DispatchContext,
        snapshot: &TouchSnapshot,
        stream: SampleStream,
    ) -> Outcome<State> {
        let Some(touch_id) = self.touch_id else {
            return self.enter_waiting(context);
        };

        if snapshot.pressed().any(|point| point.id != touch_id) {
            log::debug!(
                "{:?}: watching extra fingers beside touch {}",
                context.recognizer,
                touch_id
            );
            watch_others(context, snapshot, touch_id);
        }

        let Some(point) = snapshot.point(touch_id).copied() else {
            let carrier = if self.ownership_granted {
                SampleStream::Direct
            } else {
                SampleStream::Unowned
            };
            if stream == carrier {
                return self.vanish(context, touch_id);
            }
            return Handled;
        };

        self.axis_travel = self.direction.project(point.scene_pos - self.start_scene_pos);
        if point.state == TouchPointState::Released {
            log::debug!("{:?}: touch {} finished", context.recognizer, touch_id);
            self.publish(context, point.pos, point.scene_pos, false);
            return self.enter_waiting(context);
        }

        let smooth = !context.config.recognition_disabled();
        self.publish(context, point.pos, point.scene_pos, smooth);
        Handled
    }

    /// Applies the snapshot's presses and releases to the touch pool.
    pub(super) fn settle_pool(&mut self, context: &mut DispatchContext, snapshot: &TouchSnapshot) {
        for evicted in self.pool.update(snapshot) {
            log::warn!(
                "{:?}: touch pool full, evicted touch {}",
                context.recognizer,
                evicted.id
            );
            context.emit(SwipeSignal::Diagnostic(Diagnostic::PoolExhausted {
                evicted: evicted.id,
            }));
        }
    }

    /// Withdraws candidacy and keeps watching the touch so its release
    /// still reaches the pool.
    pub(super) fn reject(
        &mut self,
        context: &mut DispatchContext,
        reason: RejectReason,
    ) -> Outcome<State> {
        if let Some(touch_id) = self.touch_id {
            log::debug!(
                "{:?}: rejecting touch {}: {:?}",
                context.recognizer,
                touch_id,
                reason
            );
            context
                .registry
                .remove_candidate_owner_for_touch(touch_id, context.recognizer);
            context.registry.add_touch_watcher(touch_id, context.recognizer);
        }
        context.reject(reason);
        self.enter_waiting(context)
    }

    /// Another recognizer won the touch; the registry already dropped us.
    pub(super) fn yield_touch(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        if let Some(touch_id) = self.touch_id {
            log::debug!("{:?}: lost touch {}", context.recognizer, touch_id);
            context.registry.add_touch_watcher(touch_id, context.recognizer);
        }
        context.reject(RejectReason::OwnershipLost);
        self.enter_waiting(context)
    }

    fn vanish(&mut self, context: &mut DispatchContext, touch_id: TouchId) -> Outcome<State> {
        log::warn!(
            "{:?}: touch {} disappeared without a release",
            context.recognizer,
            touch_id
        );
        context.emit(SwipeSignal::Diagnostic(Diagnostic::TouchVanished { touch_id }));
        context
            .registry
            .remove_candidate_owner_for_touch(touch_id, context.recognizer);
        context.reject(RejectReason::TouchVanished);
        self.enter_waiting(context)
    }

    fn begin_candidate(&mut self, context: &mut DispatchContext, point: &TouchPoint) {
        self.touch_id = Some(point.id);
        self.start_pos = point.pos;
        self.start_scene_pos = point.scene_pos;
        self.damped_scene.reset(point.scene_pos);
        self.previous_damped_scene_pos = point.scene_pos;
        self.direction = DirectionVector::new(context.config.direction, &context.scene_transform);
        self.ownership_granted = false;
        self.axis_travel = 0.0;
        self.publish(context, point.pos, point.scene_pos, false);

        log::debug!(
            "{:?}: candidate touch {} at ({:.1}, {:.1})",
            context.recognizer,
            point.id,
            point.scene_pos.x,
            point.scene_pos.y
        );
        context
            .registry
            .add_candidate_owner_for_touch(point.id, context.recognizer);
    }

    fn enter_waiting(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.timer.stop();
        self.touch_id = None;
        self.ownership_granted = false;
        self.set_status(context, SwipeStatus::WaitingForTouch);
        Transition(State::waiting_for_touch())
    }

    fn composition_window_open(&self, config: &SwipeConfig, now_ms: u64) -> bool {
        config.composition_time_ms > 0
            && self
                .pool
                .most_recent_start_time()
                .is_some_and(|start| now_ms <= start.saturating_add(config.composition_time_ms))
    }

    fn set_status(&mut self, context: &mut DispatchContext, status: SwipeStatus) {
        let previous = self.status;
        if previous == status {
            return;
        }
        self.status = status;
        context.emit(SwipeSignal::StatusChanged(status));
        if previous.is_pressed() != status.is_pressed() {
            context.emit(SwipeSignal::PressedChanged(status.is_pressed()));
        }
        if previous.is_dragging() != status.is_dragging() {
            context.emit(SwipeSignal::DraggingChanged(status.is_dragging()));
        }
    }

    /// Moves the public position towards the raw one, or onto it when
    /// `smooth` is false, and derives both distances from it.
    fn publish(&mut self, context: &mut DispatchContext, pos: Point, scene_pos: Point, smooth: bool) {
        let (pos, scene_pos) = if smooth {
            (
                self.public_filter.update(pos),
                self.public_scene_filter.update(scene_pos),
            )
        } else {
            self.public_filter.reset(pos);
            self.public_scene_filter.reset(scene_pos);
            (pos, scene_pos)
        };

        if !pos.fuzzy_eq(self.public_pos) {
            self.public_pos = pos;
            context.emit(SwipeSignal::TouchPositionChanged(pos));
        }
        if !scene_pos.fuzzy_eq(self.public_scene_pos) {
            self.public_scene_pos = scene_pos;
            context.emit(SwipeSignal::TouchScenePositionChanged(scene_pos));
        }

        let distance = self.direction.project_local(self.public_pos - self.start_pos);
        if !fuzzy_eq(distance, self.distance) {
            self.distance = distance;
            context.emit(SwipeSignal::DistanceChanged(distance));
        }
        let scene_distance = self
            .direction
            .project(self.public_scene_pos - self.start_scene_pos);
        if !fuzzy_eq(scene_distance, self.scene_distance) {
            self.scene_distance = scene_distance;
            context.emit(SwipeSignal::SceneDistanceChanged(scene_distance));
        }
    }
}

fn watch_presses(context: &mut DispatchContext, snapshot: &TouchSnapshot) {
    for point in snapshot.pressed() {
        context
            .registry
            .add_touch_watcher(point.id, context.recognizer);
    }
}

fn watch_others(context: &mut DispatchContext, snapshot: &TouchSnapshot, touch_id: TouchId) {
    for point in snapshot.pressed().filter(|point| point.id != touch_id) {
        context
            .registry
            .add_touch_watcher(point.id, context.recognizer);
    }
}
