use core::ops::{Add, Mul, Sub};

use heapless::Vec;

/// Upper bound of simultaneously reported touch points in one snapshot.
pub const MAX_TOUCH_POINTS: usize = 10;

pub type TouchId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn fuzzy_eq(self, other: Self) -> bool {
        fuzzy_eq(self.x, other.x) && fuzzy_eq(self.y, other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Relative float comparison used to suppress signals for unchanged values.
pub fn fuzzy_eq(a: f32, b: f32) -> bool {
    let scale = 1.0_f32.max(a.abs()).max(b.abs());
    (a - b).abs() <= scale * 1e-5
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPointState {
    Pressed,
    Moved,
    Stationary,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: TouchId,
    /// Position in the recognizer item's own coordinates.
    pub pos: Point,
    pub scene_pos: Point,
    pub state: TouchPointState,
}

impl TouchPoint {
    pub const fn new(id: TouchId, pos: Point, scene_pos: Point, state: TouchPointState) -> Self {
        Self {
            id,
            pos,
            scene_pos,
            state,
        }
    }

    /// Point whose local and scene coordinates coincide.
    pub const fn at(id: TouchId, x: f32, y: f32, state: TouchPointState) -> Self {
        let pos = Point::new(x, y);
        Self::new(id, pos, pos, state)
    }
}

/// One frame of the touch stream.
///
/// A snapshot lists every touch that is active for its recipient, with
/// `Stationary` points included; a tracked id missing from a snapshot means
/// the touch ended without a release being reported.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchSnapshot {
    pub t_ms: u64,
    pub points: Vec<TouchPoint, MAX_TOUCH_POINTS>,
}

impl TouchSnapshot {
    pub fn new(t_ms: u64) -> Self {
        Self {
            t_ms,
            points: Vec::new(),
        }
    }

    pub fn with_point(mut self, point: TouchPoint) -> Self {
        self.push(point);
        self
    }

    pub fn push(&mut self, point: TouchPoint) {
        if self.points.push(point).is_err() {
            log::warn!(
                "snapshot at {}ms: dropping touch {}, more than {} points",
                self.t_ms,
                point.id,
                MAX_TOUCH_POINTS
            );
        }
    }

    pub fn point(&self, id: TouchId) -> Option<&TouchPoint> {
        self.points.iter().find(|point| point.id == id)
    }

    pub fn pressed(&self) -> impl Iterator<Item = &TouchPoint> {
        self.points
            .iter()
            .filter(|point| point.state == TouchPointState::Pressed)
    }

    pub fn has_pressed(&self) -> bool {
        self.pressed().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy of this snapshot keeping only the points accepted by `keep`.
    pub fn filtered(&self, mut keep: impl FnMut(&TouchPoint) -> bool) -> Self {
        let mut out = Self::new(self.t_ms);
        for point in self.points.iter().filter(|point| keep(point)) {
            out.push(*point);
        }
        out
    }
}
