use heapless::Vec;

use crate::{
    config::ConfigViolation,
    types::{Point, TouchId},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SwipeStatus {
    #[default]
    WaitingForTouch = 0,
    Undecided = 1,
    Recognized = 2,
}

impl SwipeStatus {
    pub const fn is_pressed(self) -> bool {
        !matches!(self, SwipeStatus::WaitingForTouch)
    }

    pub const fn is_dragging(self) -> bool {
        matches!(self, SwipeStatus::Recognized)
    }

    pub const fn label(self) -> &'static str {
        match self {
            SwipeStatus::WaitingForTouch => "waiting_for_touch",
            SwipeStatus::Undecided => "undecided",
            SwipeStatus::Recognized => "recognized",
        }
    }
}

/// Why the last dispatch refused or abandoned a touch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    #[default]
    None = 0,
    CompositionWindow = 1,
    MultiFinger = 2,
    InvalidConfiguration = 3,
    WrongDirection = 4,
    ReleasedEarly = 5,
    TouchVanished = 6,
    PastMaxDistance = 7,
    Timeout = 8,
    OwnershipLost = 9,
    Cancelled = 10,
}

impl RejectReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            RejectReason::None => "none",
            RejectReason::CompositionWindow => "composition_window",
            RejectReason::MultiFinger => "multi_finger",
            RejectReason::InvalidConfiguration => "invalid_configuration",
            RejectReason::WrongDirection => "wrong_direction",
            RejectReason::ReleasedEarly => "released_early",
            RejectReason::TouchVanished => "touch_vanished",
            RejectReason::PastMaxDistance => "past_max_distance",
            RejectReason::Timeout => "timeout",
            RejectReason::OwnershipLost => "ownership_lost",
            RejectReason::Cancelled => "cancelled",
        }
    }
}

/// Recoverable anomaly surfaced to the embedding application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    InvalidConfiguration {
        touch_id: TouchId,
        violation: ConfigViolation,
    },
    TouchVanished {
        touch_id: TouchId,
    },
    PoolExhausted {
        evicted: TouchId,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SwipeSignal {
    StatusChanged(SwipeStatus),
    PressedChanged(bool),
    DraggingChanged(bool),
    TouchPositionChanged(Point),
    TouchScenePositionChanged(Point),
    DistanceChanged(f32),
    SceneDistanceChanged(f32),
    Diagnostic(Diagnostic),
}

const SIGNAL_CAPACITY: usize = 24;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalBuffer {
    signals: Vec<SwipeSignal, SIGNAL_CAPACITY>,
}

impl SignalBuffer {
    pub const MAX: usize = SIGNAL_CAPACITY;

    pub const fn new() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    pub fn push(&mut self, signal: SwipeSignal) {
        if self.signals.push(signal).is_err() {
            log::warn!("signal buffer full; dropping {:?}", signal);
        }
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SwipeSignal> {
        self.signals.iter()
    }

    pub fn contains(&self, signal: &SwipeSignal) -> bool {
        self.signals.contains(signal)
    }

    pub fn statuses(&self) -> impl Iterator<Item = SwipeStatus> + '_ {
        self.iter().filter_map(|signal| match signal {
            SwipeSignal::StatusChanged(status) => Some(*status),
            _ => None,
        })
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.iter().filter_map(|signal| match signal {
            SwipeSignal::Diagnostic(diagnostic) => Some(*diagnostic),
            _ => None,
        })
    }

    pub fn publishes_position(&self) -> bool {
        self.iter().any(|signal| {
            matches!(
                signal,
                SwipeSignal::TouchPositionChanged(_) | SwipeSignal::TouchScenePositionChanged(_)
            )
        })
    }
}
