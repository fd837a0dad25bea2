//! Geometry helpers: points, distances, swipe direction and velocity.
//!
//! Everything here is a pure function of its inputs.
use serde::Deserialize;
use strum::{Display, EnumString};

/// Milliseconds on the host's clock.
pub type Timestamp = u64;

/// Identifier of a single contact (finger, stylus, mouse button).
pub type PointerId = u32;

/// A normalized, timestamped pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub t: Timestamp,
}

impl Point {
    pub fn new(x: f64, y: f64, t: Timestamp) -> Self {
        Self { x, y, t }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(self, other)
    }
}

/// Swipe direction in screen coordinates (`y` grows downward).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Euclidean distance between two points, ignoring time.
pub fn distance(a: &Point, b: &Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Pick the axis with the larger displacement and return its direction.
///
/// Ties (`|dx| == |dy|`, including no movement at all) go to the vertical
/// axis; zero vertical displacement counts as `Down`.
pub fn dominant_axis_direction(dx: f64, dy: f64) -> Direction {
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy < 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Pixels per millisecond. Same-millisecond events are treated as 1 ms apart.
pub fn velocity(distance: f64, duration_ms: Timestamp) -> f64 {
    distance / duration_ms.max(1) as f64
}
