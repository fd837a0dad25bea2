//! Threshold policy separating tap, long-press, swipe and pinch.
use std::collections::BTreeSet;

use crate::config::TouchgestError;
use crate::geometry::{Direction, Timestamp};

/// Maximum movement and duration for a release to count as a tap.
#[derive(Debug, Clone, PartialEq)]
pub struct TapPolicy {
    pub max_distance: f64,
    pub max_duration: Timestamp,
}

/// Hold time before a stationary contact becomes a long press, and how far
/// the contact may drift before the candidate is abandoned.
#[derive(Debug, Clone, PartialEq)]
pub struct LongPressPolicy {
    pub duration: Timestamp,
    pub max_distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwipePolicy {
    pub min_distance: f64,
    /// Pixels per millisecond.
    pub min_velocity: f64,
    /// Directions that may be reported. Swipes along other directions are dropped.
    pub axes: BTreeSet<Direction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinchPolicy {
    /// Relative change in finger distance needed before another update fires.
    pub min_scale_delta: f64,
}

/// Complete set of recognition thresholds.
///
/// Build one with [`Default`] and override fields, then hand it to
/// [`GestureRecognizer::new`](crate::recognizer::GestureRecognizer::new),
/// which validates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    pub tap: TapPolicy,
    pub long_press: LongPressPolicy,
    pub swipe: SwipePolicy,
    pub pinch: PinchPolicy,
}

impl Default for TapPolicy {
    fn default() -> Self {
        Self {
            max_distance: 10.0,
            max_duration: 300,
        }
    }
}

impl Default for LongPressPolicy {
    fn default() -> Self {
        Self {
            duration: 500,
            max_distance: 10.0,
        }
    }
}

impl Default for SwipePolicy {
    fn default() -> Self {
        Self {
            min_distance: 50.0,
            min_velocity: 0.3,
            axes: Direction::ALL.into_iter().collect(),
        }
    }
}

impl Default for PinchPolicy {
    fn default() -> Self {
        Self {
            min_scale_delta: 0.1,
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            tap: TapPolicy::default(),
            long_press: LongPressPolicy::default(),
            swipe: SwipePolicy::default(),
            pinch: PinchPolicy::default(),
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), TouchgestError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TouchgestError::InvalidThreshold { field, value })
    }
}

impl ThresholdPolicy {
    /// Reject policies that would make classification ambiguous.
    ///
    /// Every numeric field must be finite and non-negative, and the tap
    /// window must close strictly before the long-press timer fires.
    pub fn validate(self) -> Result<Self, TouchgestError> {
        non_negative("tap.max_distance", self.tap.max_distance)?;
        non_negative("long_press.max_distance", self.long_press.max_distance)?;
        non_negative("swipe.min_distance", self.swipe.min_distance)?;
        non_negative("swipe.min_velocity", self.swipe.min_velocity)?;
        non_negative("pinch.min_scale_delta", self.pinch.min_scale_delta)?;

        if self.tap.max_duration >= self.long_press.duration {
            return Err(TouchgestError::OverlappingWindows {
                tap_max_duration: self.tap.max_duration,
                long_press_duration: self.long_press.duration,
            });
        }

        Ok(self)
    }

    /// Whether swipes in `direction` are reported.
    pub fn allows_swipe(&self, direction: Direction) -> bool {
        self.swipe.axes.contains(&direction)
    }
}
