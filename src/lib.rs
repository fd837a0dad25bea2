//! touchgest - touch gesture recognition engine.
//!
//! Turns ordered pointer events into taps, long presses, swipes and pinches.
pub mod config;
pub mod event;
pub mod geometry;
pub mod policy;
pub mod recognizer;
pub mod session;
pub mod surface;
