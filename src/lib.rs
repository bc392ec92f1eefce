//! Single-finger directional swipe recognition.
//!
//! A [`SwipeRecognizer`] watches the touch stream of one screen item, picks
//! at most one candidate touch and decides whether it is a swipe in the
//! configured [`Direction`]. Several recognizers may sit over the same region;
//! they settle who owns a touch through a shared [`TouchOwnershipRegistry`].

pub mod config;
pub mod gesture;
pub mod registry;
pub mod types;

pub use config::{ConfigError, ConfigViolation, SwipeConfig};
pub use gesture::{
    ActiveTouchPool, DampedPositionFilter, Diagnostic, Direction, DirectionVector,
    RecognitionTimer, RejectReason, SceneTransform, SignalBuffer, SwipeMessage, SwipeOutput,
    SwipeRecognizer, SwipeSignal, SwipeStatus, SwipeTraceSample,
};
pub use registry::{Delivery, TouchOwnershipRegistry, TouchRegistry};
pub use types::{Point, RecognizerId, TouchId, TouchPoint, TouchPointState, TouchSnapshot};
