//! Gesture recognition engine for pointer events.
//!
//! [`GestureRecognizer`] is a state machine over one [`TouchSession`] at a
//! time. Pointer events arrive strictly in order; the long-press timer is the
//! only thing that can change state without one. Hosts either schedule a
//! wakeup for [`GestureRecognizer::armed_timer`] and call
//! [`GestureRecognizer::on_long_press_timer`], or just keep delivering events:
//! every event first fires a timer whose deadline has already passed.
use std::fmt;

use log::{debug, trace};
use strum::Display;

use crate::config::TouchgestError;
use crate::geometry::{
    Direction, Point, PointerId, Timestamp, distance, dominant_axis_direction, velocity,
};
use crate::policy::ThresholdPolicy;
use crate::session::{Phase, TimerHandle, TouchSession};

/// Payload of a recognized swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub direction: Direction,
    pub distance: f64,
    /// Pixels per millisecond.
    pub velocity: f64,
    pub duration: Timestamp,
}

/// Everything the engine can report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Tap,
    LongPress,
    Swipe(Swipe),
    PinchUpdate { scale: f64 },
    PinchEnd,
}

/// Gesture names as used in logs and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GestureKind {
    Tap,
    LongPress,
    Swipe,
    PinchUpdate,
    PinchEnd,
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureEvent::Tap => GestureKind::Tap,
            GestureEvent::LongPress => GestureKind::LongPress,
            GestureEvent::Swipe(_) => GestureKind::Swipe,
            GestureEvent::PinchUpdate { .. } => GestureKind::PinchUpdate,
            GestureEvent::PinchEnd => GestureKind::PinchEnd,
        }
    }

    /// Tap, long press and swipe end an interaction; pinch events do not.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GestureEvent::Tap | GestureEvent::LongPress | GestureEvent::Swipe(_)
        )
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureEvent::Swipe(s) => write!(
                f,
                "swipe {} distance={:.1} velocity={:.3} duration={}ms",
                s.direction, s.distance, s.velocity, s.duration
            ),
            GestureEvent::PinchUpdate { scale } => write!(f, "pinch_update scale={scale:.3}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

type Callback = Box<dyn FnMut()>;

/// Optional callbacks invoked when a gesture is recognized.
///
/// ```
/// use touchgest::recognizer::GestureHandlers;
///
/// let handlers = GestureHandlers::new()
///     .on_tap(|| println!("tap"))
///     .on_swipe(|swipe| println!("swipe {}", swipe.direction));
/// ```
#[derive(Default)]
pub struct GestureHandlers {
    tap: Option<Callback>,
    long_press: Option<Callback>,
    swipe: Option<Box<dyn FnMut(&Swipe)>>,
    pinch_update: Option<Box<dyn FnMut(f64)>>,
    pinch_end: Option<Callback>,
}

impl GestureHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_tap(mut self, f: impl FnMut() + 'static) -> Self {
        self.tap = Some(Box::new(f));
        self
    }

    pub fn on_long_press(mut self, f: impl FnMut() + 'static) -> Self {
        self.long_press = Some(Box::new(f));
        self
    }

    pub fn on_swipe(mut self, f: impl FnMut(&Swipe) + 'static) -> Self {
        self.swipe = Some(Box::new(f));
        self
    }

    pub fn on_pinch_update(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.pinch_update = Some(Box::new(f));
        self
    }

    pub fn on_pinch_end(mut self, f: impl FnMut() + 'static) -> Self {
        self.pinch_end = Some(Box::new(f));
        self
    }

    fn dispatch(&mut self, event: &GestureEvent) {
        match event {
            GestureEvent::Tap => {
                if let Some(f) = self.tap.as_mut() {
                    f();
                }
            }
            GestureEvent::LongPress => {
                if let Some(f) = self.long_press.as_mut() {
                    f();
                }
            }
            GestureEvent::Swipe(swipe) => {
                if let Some(f) = self.swipe.as_mut() {
                    f(swipe);
                }
            }
            GestureEvent::PinchUpdate { scale } => {
                if let Some(f) = self.pinch_update.as_mut() {
                    f(*scale);
                }
            }
            GestureEvent::PinchEnd => {
                if let Some(f) = self.pinch_end.as_mut() {
                    f();
                }
            }
        }
    }
}

impl fmt::Debug for GestureHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureHandlers")
            .field("tap", &self.tap.is_some())
            .field("long_press", &self.long_press.is_some())
            .field("swipe", &self.swipe.is_some())
            .field("pinch_update", &self.pinch_update.is_some())
            .field("pinch_end", &self.pinch_end.is_some())
            .finish()
    }
}

/// Recognizes gestures from pointer events on a single surface.
#[derive(Debug)]
pub struct GestureRecognizer {
    policy: ThresholdPolicy,
    handlers: GestureHandlers,
    session: Option<TouchSession>,
    timer_generation: u64,
}

impl GestureRecognizer {
    /// Validate `policy` and build an idle recognizer.
    pub fn new(policy: ThresholdPolicy, handlers: GestureHandlers) -> Result<Self, TouchgestError> {
        Ok(Self {
            policy: policy.validate()?,
            handlers,
            session: None,
            timer_generation: 0,
        })
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn session(&self) -> Option<&TouchSession> {
        self.session.as_ref()
    }

    /// The long-press timer currently armed, if any.
    pub fn armed_timer(&self) -> Option<TimerHandle> {
        self.session.as_ref().and_then(|s| s.long_press_timer)
    }

    pub fn on_pointer_down(&mut self, id: PointerId, point: Point) -> Option<GestureEvent> {
        let fired = self.advance_to(point.t);

        if self.session.is_none() {
            let mut session = TouchSession::begin(id, point);
            self.timer_generation += 1;
            session.long_press_timer = Some(TimerHandle {
                generation: self.timer_generation,
                deadline: point.t.saturating_add(self.policy.long_press.duration),
            });
            debug!("Pointer {id} down at ({}, {}): tracking", point.x, point.y);
            self.session = Some(session);
            return fired;
        }
        let Some(session) = self.session.as_mut() else {
            return fired;
        };

        if session.is_active(id) {
            trace!("Duplicate down for active pointer {id} ignored");
            return fired;
        }

        session.track(id, point);
        if session.phase == Phase::Tracking {
            session.disarm_long_press();
            session.start_pinch();
            debug!("Pointer {id} joined: pinch tracking");
        } else {
            trace!("Pointer {id} tracked in phase {}", session.phase);
        }
        fired
    }

    pub fn on_pointer_move(&mut self, id: PointerId, point: Point) -> Option<GestureEvent> {
        let fired = self.advance_to(point.t);

        let event = {
            let Some(session) = self.session.as_mut() else {
                return fired;
            };
            if !session.update(id, point) {
                trace!("Move for unknown pointer {id} ignored");
                return fired;
            }

            match session.phase {
                Phase::Tracking => {
                    if session.long_press_timer.is_some()
                        && distance(&session.anchor, &point) > self.policy.long_press.max_distance
                    {
                        session.disarm_long_press();
                        debug!("Pointer {id} moved too far: long press cancelled");
                    }
                    None
                }
                Phase::PinchTracking if session.in_pinch_pair(id) => session
                    .pinch_scale(self.policy.pinch.min_scale_delta)
                    .map(|scale| GestureEvent::PinchUpdate { scale }),
                _ => None,
            }
        };

        fired.or(event.map(|e| self.emit(e)))
    }

    pub fn on_pointer_up(&mut self, id: PointerId, point: Point) -> Option<GestureEvent> {
        let fired = self.advance_to(point.t);

        let Some(session) = self.session.as_mut() else {
            return fired;
        };
        if session.release(id).is_none() {
            trace!("Up for unknown pointer {id} ignored");
            return fired;
        }

        let event = match session.pointer_count() {
            0 => {
                let Some(session) = self.session.take() else {
                    return fired;
                };
                debug!("Last pointer {id} released in phase {}", session.phase);
                match session.phase {
                    Phase::Tracking => self.classify_release(&session, &point),
                    _ => None,
                }
            }
            1 if session.phase == Phase::PinchTracking => {
                let Some((_, remaining)) = session.pointers().next() else {
                    return fired;
                };
                session.pinch = None;
                session.anchor = remaining;
                session.phase = Phase::Tracking;
                debug!("Pinch ended: re-anchored on remaining pointer");
                Some(GestureEvent::PinchEnd)
            }
            _ => {
                if session.phase == Phase::PinchTracking && session.in_pinch_pair(id) {
                    session.start_pinch();
                    debug!("Pinch pointer {id} lifted: measuring next pair");
                }
                None
            }
        };

        fired.or(event.map(|e| self.emit(e)))
    }

    /// Timer callback for a handle obtained from [`armed_timer`](Self::armed_timer).
    ///
    /// Stale handles, and handles for a session that already moved on, are
    /// ignored.
    pub fn on_long_press_timer(&mut self, handle: TimerHandle) -> Option<GestureEvent> {
        let session = self.session.as_mut()?;
        if session.phase != Phase::Tracking || session.long_press_timer != Some(handle) {
            trace!("Stale long-press timer {} ignored", handle.generation);
            return None;
        }
        session.long_press_timer = None;
        session.phase = Phase::Resolved;
        Some(self.emit(GestureEvent::LongPress))
    }

    /// Fire the armed timer if `now` reached its deadline.
    pub fn advance_to(&mut self, now: Timestamp) -> Option<GestureEvent> {
        let handle = self.armed_timer()?;
        if now >= handle.deadline {
            self.on_long_press_timer(handle)
        } else {
            None
        }
    }

    /// Abort the current interaction without emitting anything.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Interaction cancelled in phase {}", session.phase);
        }
    }

    fn classify_release(&self, session: &TouchSession, release: &Point) -> Option<GestureEvent> {
        let anchor = &session.anchor;
        let d = distance(anchor, release);
        let dt = release.t.saturating_sub(anchor.t);
        let v = velocity(d, dt);
        let tap = &self.policy.tap;
        let swipe = &self.policy.swipe;

        if d <= tap.max_distance && dt <= tap.max_duration {
            return Some(GestureEvent::Tap);
        }

        if d >= swipe.min_distance && v >= swipe.min_velocity {
            let direction = dominant_axis_direction(release.x - anchor.x, release.y - anchor.y);
            if self.policy.allows_swipe(direction) {
                return Some(GestureEvent::Swipe(Swipe {
                    direction,
                    distance: d,
                    velocity: v,
                    duration: dt,
                }));
            }
            trace!("Swipe {direction} not enabled");
        }

        debug!("Release dropped: distance={d:.1} duration={dt}ms velocity={v:.3}");
        None
    }

    fn emit(&mut self, event: GestureEvent) -> GestureEvent {
        debug!("Recognized {event}");
        self.handlers.dispatch(&event);
        event
    }
}
