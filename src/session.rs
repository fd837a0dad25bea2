//! Per-interaction touch state owned by a [`GestureRecognizer`](crate::recognizer::GestureRecognizer).
use std::collections::HashMap;

use strum::Display;

use crate::geometry::{Point, PointerId, Timestamp, distance};

/// Where an interaction currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Idle,
    Tracking,
    PinchTracking,
    /// A long press already fired; the release will not emit anything.
    Resolved,
}

/// Handle of an armed long-press timer.
///
/// Generations are unique per recognizer, so a handle kept by the host after
/// its timer was cancelled never matches a later timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub generation: u64,
    pub deadline: Timestamp,
}

/// The two pointers a pinch is measured between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    pub pair: (PointerId, PointerId),
    /// Distance when the pinch started; divisor for the reported scale.
    pub anchor_distance: f64,
    /// Distance at the last emitted update.
    pub reference_distance: f64,
}

/// State of one continuous interaction, from first contact until every
/// pointer is released.
#[derive(Debug, Clone)]
pub struct TouchSession {
    pub anchor: Point,
    pub active_points: HashMap<PointerId, Point>,
    /// Active pointer ids in arrival order.
    arrival: Vec<PointerId>,
    pub long_press_timer: Option<TimerHandle>,
    pub pinch: Option<PinchState>,
    pub phase: Phase,
}

impl TouchSession {
    /// Start a session at the first contact.
    pub fn begin(id: PointerId, point: Point) -> Self {
        Self {
            anchor: point,
            active_points: HashMap::from([(id, point)]),
            arrival: vec![id],
            long_press_timer: None,
            pinch: None,
            phase: Phase::Tracking,
        }
    }

    pub fn is_active(&self, id: PointerId) -> bool {
        self.active_points.contains_key(&id)
    }

    pub fn pointer_count(&self) -> usize {
        self.active_points.len()
    }

    /// Active pointers in arrival order.
    pub fn pointers(&self) -> impl Iterator<Item = (PointerId, Point)> + '_ {
        self.arrival
            .iter()
            .filter_map(|id| self.active_points.get(id).map(|p| (*id, *p)))
    }

    pub fn track(&mut self, id: PointerId, point: Point) {
        if self.active_points.insert(id, point).is_none() {
            self.arrival.push(id);
        }
    }

    /// Update a known pointer. Returns `false` for unknown ids.
    pub fn update(&mut self, id: PointerId, point: Point) -> bool {
        match self.active_points.get_mut(&id) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    /// Remove a pointer, returning its last recorded point.
    pub fn release(&mut self, id: PointerId) -> Option<Point> {
        let point = self.active_points.remove(&id)?;
        self.arrival.retain(|p| *p != id);
        Some(point)
    }

    pub fn disarm_long_press(&mut self) -> Option<TimerHandle> {
        self.long_press_timer.take()
    }

    /// Measure a pinch between the first two active pointers.
    pub fn start_pinch(&mut self) {
        let (first, second) = {
            let mut pointers = self.pointers();
            (pointers.next(), pointers.next())
        };
        let (Some((a, pa)), Some((b, pb))) = (first, second) else {
            return;
        };
        let d = distance(&pa, &pb);
        self.pinch = Some(PinchState {
            pair: (a, b),
            anchor_distance: d,
            reference_distance: d,
        });
        self.phase = Phase::PinchTracking;
    }

    pub fn in_pinch_pair(&self, id: PointerId) -> bool {
        self.pinch
            .is_some_and(|pinch| pinch.pair.0 == id || pinch.pair.1 == id)
    }

    /// Recompute the pinch distance and return the new scale once it moved
    /// at least `min_scale_delta` away from the last reported distance.
    pub fn pinch_scale(&mut self, min_scale_delta: f64) -> Option<f64> {
        let pinch = self.pinch.as_mut()?;
        let a = self.active_points.get(&pinch.pair.0)?;
        let b = self.active_points.get(&pinch.pair.1)?;
        let current = distance(a, b);

        // Both fingers started on the same spot: measure from here on.
        if pinch.reference_distance <= f64::EPSILON {
            pinch.reference_distance = current;
            if pinch.anchor_distance <= f64::EPSILON {
                pinch.anchor_distance = current;
            }
            return None;
        }

        if (current / pinch.reference_distance - 1.0).abs() >= min_scale_delta {
            pinch.reference_distance = current;
            Some(current / pinch.anchor_distance)
        } else {
            None
        }
    }
}
