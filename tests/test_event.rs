//! Integration tests for the event-processing logic in `event`.
//!
//! Tests feed `PointerEvent` sequences straight into a recognizer and parse
//! recorded traces.
use touchgest::config::TouchgestError;
use touchgest::event::{PointerEvent, parse_trace, parse_trace_line, process_pointer_events};
use touchgest::geometry::{Direction, Point};
use touchgest::policy::ThresholdPolicy;
use touchgest::recognizer::{GestureEvent, GestureHandlers, GestureRecognizer};

// -- Helpers --------------------------------------------------

fn down(id: u32, x: f64, y: f64, t: u64) -> PointerEvent {
    PointerEvent::Down {
        id,
        point: Point::new(x, y, t),
    }
}

fn mv(id: u32, x: f64, y: f64, t: u64) -> PointerEvent {
    PointerEvent::Move {
        id,
        point: Point::new(x, y, t),
    }
}

fn up(id: u32, x: f64, y: f64, t: u64) -> PointerEvent {
    PointerEvent::Up {
        id,
        point: Point::new(x, y, t),
    }
}

/// Shorthand: feed events into a default recognizer, return gestures.
fn feed(events: &[PointerEvent]) -> Vec<GestureEvent> {
    let mut rec = GestureRecognizer::new(ThresholdPolicy::default(), GestureHandlers::new()).unwrap();
    process_pointer_events(&mut rec, events)
}

// -- process_pointer_events -----------------------------------

#[test]
fn test_tap_sequence() {
    assert_eq!(
        feed(&[down(1, 0.0, 0.0, 0), up(1, 5.0, 5.0, 100)]),
        vec![GestureEvent::Tap]
    );
}

#[test]
fn test_long_press_sequence() {
    assert_eq!(
        feed(&[down(1, 0.0, 0.0, 0), mv(1, 0.0, 0.0, 600)]),
        vec![GestureEvent::LongPress]
    );
}

#[test]
fn test_long_press_then_release_emits_once() {
    assert_eq!(
        feed(&[
            down(1, 0.0, 0.0, 0),
            mv(1, 0.0, 0.0, 600),
            up(1, 0.0, 0.0, 900)
        ]),
        vec![GestureEvent::LongPress]
    );
}

#[test]
fn test_tick_fires_long_press() {
    assert_eq!(
        feed(&[
            down(1, 0.0, 0.0, 0),
            PointerEvent::Tick(400),
            PointerEvent::Tick(500),
            PointerEvent::Tick(600),
        ]),
        vec![GestureEvent::LongPress]
    );
}

#[test]
fn test_swipe_sequence() {
    let gestures = feed(&[
        down(1, 0.0, 0.0, 0),
        mv(1, 40.0, 0.0, 80),
        up(1, 100.0, 0.0, 200),
    ]);
    assert_eq!(gestures.len(), 1);
    match gestures[0] {
        GestureEvent::Swipe(swipe) => {
            assert_eq!(swipe.direction, Direction::Right);
            assert_eq!(swipe.distance, 100.0);
            assert_eq!(swipe.velocity, 0.5);
            assert_eq!(swipe.duration, 200);
        }
        other => panic!("expected swipe, got {other:?}"),
    }
}

#[test]
fn test_pinch_sequence() {
    let gestures = feed(&[
        down(1, 0.0, 0.0, 0),
        down(2, 100.0, 0.0, 5),
        mv(2, 115.0, 0.0, 20),
        up(2, 115.0, 0.0, 40),
        up(1, 0.0, 0.0, 60),
    ]);
    assert_eq!(gestures.len(), 3);
    assert!(matches!(gestures[0], GestureEvent::PinchUpdate { scale } if (scale - 1.15).abs() < 1e-9));
    assert_eq!(gestures[1], GestureEvent::PinchEnd);
    // Pointer 1 never moved: released on its anchor within the tap window.
    assert_eq!(gestures[2], GestureEvent::Tap);
}

#[test]
fn test_dropped_interaction() {
    assert!(feed(&[down(1, 0.0, 0.0, 0), up(1, 20.0, 0.0, 400)]).is_empty());
}

#[test]
fn test_cancel_event() {
    assert!(
        feed(&[
            down(1, 0.0, 0.0, 0),
            PointerEvent::Cancel,
            up(1, 5.0, 5.0, 100),
            PointerEvent::Tick(1_000),
        ])
        .is_empty()
    );
}

#[test]
fn test_consecutive_interactions() {
    let gestures = feed(&[
        down(1, 0.0, 0.0, 0),
        up(1, 0.0, 0.0, 50),
        down(1, 0.0, 0.0, 1_000),
        up(1, 0.0, 0.0, 1_050),
        down(2, 10.0, 10.0, 2_000),
        up(2, 10.0, 10.0, 2_900),
    ]);
    assert_eq!(
        gestures,
        vec![GestureEvent::Tap, GestureEvent::Tap, GestureEvent::LongPress]
    );
}

// -- parse_trace_line -----------------------------------------

#[test]
fn test_parse_down() {
    assert_eq!(
        parse_trace_line("down 1 10.5 20 300"),
        Ok(Some(down(1, 10.5, 20.0, 300)))
    );
}

#[test]
fn test_parse_move_and_up() {
    assert_eq!(parse_trace_line("move 2 -5 7 10"), Ok(Some(mv(2, -5.0, 7.0, 10))));
    assert_eq!(parse_trace_line("UP 2 0 0 11"), Ok(Some(up(2, 0.0, 0.0, 11))));
}

#[test]
fn test_parse_tick_and_cancel() {
    assert_eq!(parse_trace_line("tick 600"), Ok(Some(PointerEvent::Tick(600))));
    assert_eq!(parse_trace_line("  cancel  "), Ok(Some(PointerEvent::Cancel)));
}

#[test]
fn test_parse_blank_and_comment() {
    assert_eq!(parse_trace_line(""), Ok(None));
    assert_eq!(parse_trace_line("   "), Ok(None));
    assert_eq!(parse_trace_line("# a comment"), Ok(None));
    assert_eq!(
        parse_trace_line("down 1 0 0 0 # first finger"),
        Ok(Some(down(1, 0.0, 0.0, 0)))
    );
}

#[test]
fn test_parse_errors() {
    assert!(parse_trace_line("hover 1 0 0 0").unwrap_err().contains("unknown event"));
    assert!(parse_trace_line("down 1 0 0").unwrap_err().contains("missing timestamp"));
    assert!(parse_trace_line("down x 0 0 0").unwrap_err().contains("pointer id"));
    assert!(parse_trace_line("down 1 0 0 -5").unwrap_err().contains("timestamp"));
    assert!(parse_trace_line("down 1 NaN 0 0").unwrap_err().contains("non-finite"));
    assert!(parse_trace_line("tick 1 2").unwrap_err().contains("trailing"));
}

// -- parse_trace ----------------------------------------------

#[test]
fn test_parse_trace() {
    let trace = "\
# swipe right
down 1 0 0 0
move 1 50 0 100

up 1 100 0 200
";
    let events = parse_trace(trace).unwrap();
    assert_eq!(
        events,
        vec![down(1, 0.0, 0.0, 0), mv(1, 50.0, 0.0, 100), up(1, 100.0, 0.0, 200)]
    );
}

#[test]
fn test_parse_trace_reports_line() {
    let err = parse_trace("down 1 0 0 0\n\nwiggle\n").unwrap_err();
    assert!(matches!(err, TouchgestError::TraceParseError { line: 3, .. }));
    assert!(err.to_string().starts_with("Trace line 3:"));
}
