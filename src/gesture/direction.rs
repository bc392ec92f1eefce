use serde::Deserialize;

use crate::types::Point;

const DEGENERATE_LENGTH: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Rightwards,
    Leftwards,
    Downwards,
    Upwards,
    Horizontal,
    Vertical,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Rightwards,
        Direction::Leftwards,
        Direction::Downwards,
        Direction::Upwards,
        Direction::Horizontal,
        Direction::Vertical,
    ];

    /// Horizontal and Vertical accept motion of either sign along their axis.
    pub const fn is_sign_free(self) -> bool {
        matches!(self, Direction::Horizontal | Direction::Vertical)
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(
            self,
            Direction::Rightwards | Direction::Leftwards | Direction::Horizontal
        )
    }

    /// Unit vector of the direction in the item's own coordinates (y grows downwards).
    pub const fn local_unit_vector(self) -> Point {
        match self {
            Direction::Rightwards | Direction::Horizontal => Point::new(1.0, 0.0),
            Direction::Leftwards => Point::new(-1.0, 0.0),
            Direction::Downwards | Direction::Vertical => Point::new(0.0, 1.0),
            Direction::Upwards => Point::new(0.0, -1.0),
        }
    }

    /// Same spelling as the config file.
    pub const fn label(self) -> &'static str {
        match self {
            Direction::Rightwards => "rightwards",
            Direction::Leftwards => "leftwards",
            Direction::Downwards => "downwards",
            Direction::Upwards => "upwards",
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|direction| direction.label().eq_ignore_ascii_case(label))
    }
}

/// Affine map from item coordinates to scene coordinates.
///
/// Uses the row-vector convention: `x' = m11*x + m21*y + dx`,
/// `y' = m12*x + m22*y + dy`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTransform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SceneTransform {
    pub const IDENTITY: Self = Self {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m11: sx,
            m22: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation on screen, as y points down.
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            m11: cos,
            m12: sin,
            m21: -sin,
            m22: cos,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn map_point(&self, point: Point) -> Point {
        self.map_vector(point) + Point::new(self.dx, self.dy)
    }

    pub fn map_vector(&self, vector: Point) -> Point {
        Point::new(
            self.m11 * vector.x + self.m21 * vector.y,
            self.m12 * vector.x + self.m22 * vector.y,
        )
    }
}

/// Gesture axis in scene coordinates, captured when a candidate touch is accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionVector {
    direction: Direction,
    local: Point,
    scene: Point,
}

impl Default for DirectionVector {
    fn default() -> Self {
        Self::new(Direction::default(), &SceneTransform::IDENTITY)
    }
}

impl DirectionVector {
    pub fn new(direction: Direction, transform: &SceneTransform) -> Self {
        let local = direction.local_unit_vector();
        let mapped = transform.map_vector(local);
        let length = mapped.length();
        let scene = if length.is_finite() && length > DEGENERATE_LENGTH {
            mapped * (1.0 / length)
        } else {
            log::warn!(
                "degenerate scene transform {:?}; using the local {:?} axis",
                transform,
                direction
            );
            local
        };
        Self {
            direction,
            local,
            scene,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn local(&self) -> Point {
        self.local
    }

    pub fn scene(&self) -> Point {
        self.scene
    }

    /// Scalar projection of a scene-space movement onto the gesture axis.
    pub fn project(&self, movement: Point) -> f32 {
        movement.dot(self.scene)
    }

    pub fn project_local(&self, movement: Point) -> f32 {
        movement.dot(self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < 1e-5 && (actual.y - expected.y).abs() < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn identity_keeps_local_axis() {
        for direction in Direction::ALL {
            let vector = DirectionVector::new(direction, &SceneTransform::IDENTITY);
            assert_close(vector.scene(), direction.local_unit_vector());
        }
    }

    #[test]
    fn rotation_turns_upwards_into_rightwards_scene_axis() {
        let vector = DirectionVector::new(
            Direction::Upwards,
            &SceneTransform::rotation_degrees(90.0),
        );
        assert_close(vector.scene(), Point::new(1.0, 0.0));
        assert!((vector.project(Point::new(12.0, 3.0)) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn scaled_transform_still_yields_unit_vector() {
        let vector = DirectionVector::new(Direction::Leftwards, &SceneTransform::scale(3.0, 0.5));
        assert_close(vector.scene(), Point::new(-1.0, 0.0));
        assert!((vector.scene().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn translation_does_not_affect_axis() {
        let transform = SceneTransform::translation(250.0, -40.0);
        let vector = DirectionVector::new(Direction::Downwards, &transform);
        assert_close(vector.scene(), Point::new(0.0, 1.0));
        assert_close(
            transform.map_point(Point::new(1.0, 1.0)),
            Point::new(251.0, -39.0),
        );
    }

    #[test]
    fn labels_round_trip_case_insensitively() {
        assert_eq!(Direction::from_label(" Vertical "), Some(Direction::Vertical));
        assert_eq!(Direction::from_label("upwards"), Some(Direction::Upwards));
        assert_eq!(Direction::from_label("diagonal"), None);
    }

    #[test]
    fn collapsed_transform_falls_back_to_local_axis() {
        let vector = DirectionVector::new(Direction::Vertical, &SceneTransform::scale(1.0, 0.0));
        assert_close(vector.scene(), Point::new(0.0, 1.0));
    }
}
