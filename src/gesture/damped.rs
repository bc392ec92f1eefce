use crate::types::Point;

/// Share of the remaining gap closed by each update.
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.4;

/// Exponential smoothing of a 2-D position: `value += factor * (raw - value)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DampedPositionFilter {
    value: Point,
    factor: f32,
}

impl Default for DampedPositionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DAMPING_FACTOR)
    }
}

impl DampedPositionFilter {
    pub fn new(factor: f32) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            DEFAULT_DAMPING_FACTOR
        };
        Self {
            value: Point::ZERO,
            factor,
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn value(&self) -> Point {
        self.value
    }

    /// Jumps straight to `value`, discarding history.
    pub fn reset(&mut self, value: Point) {
        self.value = value;
    }

    pub fn update(&mut self, raw: Point) -> Point {
        self.value = self.value + (raw - self.value) * self.factor;
        self.value
    }
}
