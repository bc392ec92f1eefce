//! Directional swipe recognizer.
//!
//! A [`SwipeRecognizer`] follows at most one touch. It stays `Undecided`
//! until the touch has clearly moved along the configured axis, then claims
//! the touch through the [`TouchOwnershipRegistry`] and starts publishing its
//! position. Anything ambiguous (a second finger, the wrong direction, too
//! much travel, too much time) hands the touch back.

use std::rc::Rc;

use statig::blocking::IntoStateMachineExt as _;

use crate::{
    config::SwipeConfig,
    gesture::{
        direction::{Direction, SceneTransform},
        pool::ActiveTouchPool,
        trace::SwipeTraceSample,
        types::{RejectReason, SignalBuffer, SwipeSignal, SwipeStatus},
    },
    registry::TouchOwnershipRegistry,
    types::{Point, RecognizerId, TouchId, TouchSnapshot},
};

mod hsm;

use hsm::SwipeHsm;

/// Input delivered to a recognizer by its host.
#[derive(Clone, Debug, PartialEq)]
pub enum SwipeMessage {
    /// Fresh presses in the recognizer's area plus touches it owns.
    Sample(TouchSnapshot),
    /// Touches the recognizer follows as an undecided candidate or a watcher.
    UnownedSample(TouchSnapshot),
    OwnershipGained(TouchId),
    OwnershipLost(TouchId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SampleStream {
    Direct,
    Unowned,
}

#[derive(Clone, Debug)]
enum SwipeHsmEvent {
    Sample {
        snapshot: TouchSnapshot,
        stream: SampleStream,
    },
    Ownership {
        touch_id: TouchId,
        gained: bool,
    },
    Timer {
        now_ms: u64,
    },
    Cancel,
}

struct DispatchContext {
    recognizer: RecognizerId,
    registry: Rc<dyn TouchOwnershipRegistry>,
    config: SwipeConfig,
    scene_transform: SceneTransform,
    accepts_touches: bool,
    reject_reason: RejectReason,
    signals: SignalBuffer,
}

impl DispatchContext {
    fn emit(&mut self, signal: SwipeSignal) {
        self.signals.push(signal);
    }

    fn reject(&mut self, reason: RejectReason) {
        self.reject_reason = reason;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwipeOutput {
    pub signals: SignalBuffer,
    pub trace: SwipeTraceSample,
}

pub struct SwipeRecognizer {
    id: RecognizerId,
    registry: Rc<dyn TouchOwnershipRegistry>,
    config: SwipeConfig,
    scene_transform: SceneTransform,
    enabled: bool,
    visible: bool,
    last_now_ms: u64,
    machine: statig::blocking::StateMachine<SwipeHsm>,
}

impl SwipeRecognizer {
    pub fn new(
        id: RecognizerId,
        config: SwipeConfig,
        registry: Rc<dyn TouchOwnershipRegistry>,
    ) -> Self {
        Self {
            id,
            registry,
            config,
            scene_transform: SceneTransform::IDENTITY,
            enabled: true,
            visible: true,
            last_now_ms: 0,
            machine: SwipeHsm::new().state_machine(),
        }
    }

    pub fn id(&self) -> RecognizerId {
        self.id
    }

    pub fn handle(&mut self, message: SwipeMessage) -> SwipeOutput {
        let mut context = self.context();
        match message {
            SwipeMessage::Sample(snapshot) => {
                self.dispatch_sample(snapshot, SampleStream::Direct, &mut context)
            }
            SwipeMessage::UnownedSample(snapshot) => {
                self.dispatch_sample(snapshot, SampleStream::Unowned, &mut context)
            }
            SwipeMessage::OwnershipGained(touch_id) => self.machine.handle_with_context(
                &SwipeHsmEvent::Ownership {
                    touch_id,
                    gained: true,
                },
                &mut context,
            ),
            SwipeMessage::OwnershipLost(touch_id) => self.machine.handle_with_context(
                &SwipeHsmEvent::Ownership {
                    touch_id,
                    gained: false,
                },
                &mut context,
            ),
        }
        self.finish(context)
    }

    /// Lets the recognition timer observe `now_ms` without a new sample.
    pub fn advance_time(&mut self, now_ms: u64) -> SwipeOutput {
        self.last_now_ms = self.last_now_ms.max(now_ms);
        let mut context = self.context();
        self.machine
            .handle_with_context(&SwipeHsmEvent::Timer { now_ms }, &mut context);
        self.finish(context)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling abandons the current touch; the pool keeps being updated.
    pub fn set_enabled(&mut self, enabled: bool, now_ms: u64) -> SwipeOutput {
        self.enabled = enabled;
        self.host_changed(now_ms)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool, now_ms: u64) -> SwipeOutput {
        self.visible = visible;
        self.host_changed(now_ms)
    }

    pub fn scene_transform(&self) -> SceneTransform {
        self.scene_transform
    }

    /// Takes effect for the next accepted touch.
    pub fn set_scene_transform(&mut self, transform: SceneTransform) {
        self.scene_transform = transform;
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Replaces the tuning. Thresholds apply from the next sample, the
    /// direction from the next accepted touch.
    pub fn set_config(&mut self, config: SwipeConfig) {
        self.config = config;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.config.direction = direction;
    }

    pub fn set_distance_threshold(&mut self, pixels: f32) {
        self.config.set_distance_threshold(pixels);
    }

    pub fn set_max_distance(&mut self, pixels: f32) {
        self.config.set_max_distance(pixels);
    }

    pub fn set_immediate_recognition(&mut self, immediate: bool) {
        self.config.immediate_recognition = immediate;
    }

    pub fn remove_time_constraints(&mut self) {
        self.config.remove_time_constraints();
    }

    pub fn status(&self) -> SwipeStatus {
        self.machine.inner().status()
    }

    pub fn pressed(&self) -> bool {
        self.status().is_pressed()
    }

    pub fn dragging(&self) -> bool {
        self.status().is_dragging()
    }

    pub fn touch_id(&self) -> Option<TouchId> {
        self.machine.inner().touch_id()
    }

    pub fn touch_position(&self) -> Point {
        self.machine.inner().public_pos()
    }

    pub fn touch_scene_position(&self) -> Point {
        self.machine.inner().public_scene_pos()
    }

    pub fn distance(&self) -> f32 {
        self.machine.inner().distance()
    }

    pub fn scene_distance(&self) -> f32 {
        self.machine.inner().scene_distance()
    }

    pub fn active_touches(&self) -> &ActiveTouchPool {
        self.machine.inner().pool()
    }

    fn dispatch_sample(
        &mut self,
        snapshot: TouchSnapshot,
        stream: SampleStream,
        context: &mut DispatchContext,
    ) {
        self.last_now_ms = self.last_now_ms.max(snapshot.t_ms);
        self.machine.handle_with_context(
            &SwipeHsmEvent::Timer {
                now_ms: snapshot.t_ms,
            },
            context,
        );
        self.machine
            .handle_with_context(&SwipeHsmEvent::Sample { snapshot, stream }, context);
    }

    fn host_changed(&mut self, now_ms: u64) -> SwipeOutput {
        self.last_now_ms = self.last_now_ms.max(now_ms);
        let mut context = self.context();
        if !context.accepts_touches {
            self.machine
                .handle_with_context(&SwipeHsmEvent::Cancel, &mut context);
        }
        self.finish(context)
    }

    fn context(&self) -> DispatchContext {
        DispatchContext {
            recognizer: self.id,
            registry: Rc::clone(&self.registry),
            config: self.config,
            scene_transform: self.scene_transform,
            accepts_touches: self.enabled && self.visible,
            reject_reason: RejectReason::None,
            signals: SignalBuffer::new(),
        }
    }

    fn finish(&self, context: DispatchContext) -> SwipeOutput {
        SwipeOutput {
            trace: self
                .machine
                .inner()
                .trace(self.last_now_ms, context.reject_reason),
            signals: context.signals,
        }
    }
}
