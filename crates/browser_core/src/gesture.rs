//! Gesture events and tap arbitration
//!
//! Pan, tap, double-tap and long-press share one surface. A double tap
//! wins over the single tap it starts with, so a single tap is only
//! reported once the double-tap interval has run out.

use egui::{Pos2, Vec2};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanPhase {
    Began,
    Changed,
    Ended,
    /// Interrupted by the system or another recognizer
    Cancelled,
}

/// Pan recognizer sample. `translation` is measured from the gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanEvent {
    pub phase: PanPhase,
    pub translation: Vec2,
    pub location: Pos2,
    pub velocity: Vec2,
}

impl PanEvent {
    pub fn began(location: Pos2) -> Self {
        Self {
            phase: PanPhase::Began,
            translation: Vec2::ZERO,
            location,
            velocity: Vec2::ZERO,
        }
    }

    pub fn changed(start: Pos2, location: Pos2) -> Self {
        Self {
            phase: PanPhase::Changed,
            translation: location - start,
            location,
            velocity: Vec2::ZERO,
        }
    }

    pub fn ended(start: Pos2, location: Pos2, velocity: Vec2) -> Self {
        Self {
            phase: PanPhase::Ended,
            translation: location - start,
            location,
            velocity,
        }
    }

    pub fn cancelled(start: Pos2, location: Pos2) -> Self {
        Self {
            phase: PanPhase::Cancelled,
            translation: location - start,
            location,
            velocity: Vec2::ZERO,
        }
    }
}

/// Recognised tap
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tap {
    Single(Pos2),
    Double(Pos2),
}

/// Holds a single tap back until it can no longer become a double tap
#[derive(Debug, Clone)]
pub struct TapArbiter {
    interval: Duration,
    pending: Option<(Pos2, Instant)>,
}

impl TapArbiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    /// Feed a raw tap. Returns a tap as soon as it is decided.
    pub fn tap(&mut self, location: Pos2, now: Instant) -> Option<Tap> {
        match self.pending.take() {
            Some((_, at)) if now.saturating_duration_since(at) <= self.interval => {
                Some(Tap::Double(location))
            }
            Some((previous, _)) => {
                // Too late to pair up: the old tap stands alone
                self.pending = Some((location, now));
                Some(Tap::Single(previous))
            }
            None => {
                self.pending = Some((location, now));
                None
            }
        }
    }

    /// Release a pending single tap once the interval has passed
    pub fn poll(&mut self, now: Instant) -> Option<Tap> {
        match self.pending {
            Some((location, at)) if now.saturating_duration_since(at) > self.interval => {
                self.pending = None;
                Some(Tap::Single(location))
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
