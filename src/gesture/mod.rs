pub mod damped;
pub mod direction;
pub mod pool;
pub mod recognizer;
pub mod timer;
pub mod trace;
pub mod types;

pub use damped::DampedPositionFilter;
pub use direction::{Direction, DirectionVector, SceneTransform};
pub use pool::{ActiveTouch, ActiveTouchPool};
pub use recognizer::{SwipeMessage, SwipeOutput, SwipeRecognizer};
pub use timer::RecognitionTimer;
pub use trace::SwipeTraceSample;
pub use types::{Diagnostic, RejectReason, SignalBuffer, SwipeSignal, SwipeStatus};
