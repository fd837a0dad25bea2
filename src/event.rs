//! Pointer event stream processing - no I/O, fully testable.
//!
//! This module holds the normalized [`PointerEvent`] every surface delivers,
//! the dispatcher that feeds such events into a recognizer, and the parser
//! for recorded traces.  Everything here is a plain function.

use std::str::{FromStr, SplitWhitespace};

use crate::config::TouchgestError;
use crate::geometry::{Point, PointerId, Timestamp};
use crate::recognizer::{GestureEvent, GestureRecognizer};

// -- PointerEvent ---------------------------------------------

/// A normalized input notification, as delivered by an input surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { id: PointerId, point: Point },
    Move { id: PointerId, point: Point },
    Up { id: PointerId, point: Point },
    /// The host took the interaction over (scroll, unmount, ...).
    Cancel,
    /// The host's clock reached `t` with no pointer activity.
    Tick(Timestamp),
}

// -- Core processing ------------------------------------------

/// Route one event to the matching recognizer method.
pub fn dispatch(recognizer: &mut GestureRecognizer, event: PointerEvent) -> Option<GestureEvent> {
    match event {
        PointerEvent::Down { id, point } => recognizer.on_pointer_down(id, point),
        PointerEvent::Move { id, point } => recognizer.on_pointer_move(id, point),
        PointerEvent::Up { id, point } => recognizer.on_pointer_up(id, point),
        PointerEvent::Cancel => {
            recognizer.cancel();
            None
        }
        PointerEvent::Tick(t) => recognizer.advance_to(t),
    }
}

/// Feed a sequence of [`PointerEvent`]s into a recognizer and collect every
/// gesture that fires, in order.
pub fn process_pointer_events(
    recognizer: &mut GestureRecognizer,
    events: &[PointerEvent],
) -> Vec<GestureEvent> {
    events
        .iter()
        .filter_map(|event| dispatch(recognizer, *event))
        .collect()
}

// -- Trace format ---------------------------------------------

fn field<T: FromStr>(parts: &mut SplitWhitespace<'_>, name: &str) -> Result<T, String> {
    let raw = parts.next().ok_or_else(|| format!("missing {name}"))?;
    raw.parse().map_err(|_| format!("invalid {name} '{raw}'"))
}

/// Parse one trace line.
///
/// Accepted forms are `down|move|up <id> <x> <y> <t>`, `tick <t>` and
/// `cancel`.  Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_trace_line(line: &str) -> Result<Option<PointerEvent>, String> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };

    let event = match verb.to_lowercase().as_str() {
        "cancel" => PointerEvent::Cancel,
        "tick" => PointerEvent::Tick(field(&mut parts, "timestamp")?),
        kind @ ("down" | "move" | "up") => {
            let id: PointerId = field(&mut parts, "pointer id")?;
            let x: f64 = field(&mut parts, "x")?;
            let y: f64 = field(&mut parts, "y")?;
            if !x.is_finite() || !y.is_finite() {
                return Err(format!("non-finite coordinates ({x}, {y})"));
            }
            let point = Point::new(x, y, field(&mut parts, "timestamp")?);
            match kind {
                "down" => PointerEvent::Down { id, point },
                "move" => PointerEvent::Move { id, point },
                _ => PointerEvent::Up { id, point },
            }
        }
        other => return Err(format!("unknown event '{other}'")),
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected trailing '{extra}'"));
    }
    Ok(Some(event))
}

/// Parse a whole trace, reporting the 1-based line number of the first error.
pub fn parse_trace(contents: &str) -> Result<Vec<PointerEvent>, TouchgestError> {
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        match parse_trace_line(line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(message) => {
                return Err(TouchgestError::TraceParseError {
                    line: index + 1,
                    message,
                });
            }
        }
    }
    Ok(events)
}
