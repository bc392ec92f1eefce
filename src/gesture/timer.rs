/// Single-shot countdown driven by the caller's clock.
///
/// The recognizer never sleeps; the host reports time through samples or
/// explicit ticks and the timer fires on the first report at or past its deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecognitionTimer {
    deadline_ms: Option<u64>,
}

impl RecognitionTimer {
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    pub fn start(&mut self, now_ms: u64, interval_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(interval_ms));
    }

    pub fn stop(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Fires at most once per `start`; a fired timer stops itself.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
