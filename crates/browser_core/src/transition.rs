//! Open / drag / cancel / dismiss state machine
//!
//! ```text
//! Closed -> Opening -> Presented <-> Dragging -> Cancelling -> Presented
//!                          |                  \-> Dismissing -> Closed
//!                          \-> Dismissing (tap / close)
//! ```
//!
//! The controller only tracks phase and drag geometry. The browser runs the
//! animations and side effects each transition asks for.

use crate::config::GestureConfig;
use crate::geometry::scale_about_anchor;
use egui::{Pos2, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Presented,
    Dragging,
    Cancelling,
    Dismissing,
}

impl Phase {
    /// Phases in which the pager is on screen and settled enough to report
    /// page changes
    pub fn is_interactive(self) -> bool {
        matches!(self, Phase::Presented | Phase::Dragging | Phase::Cancelling)
    }
}

/// Pointer and image frame captured when a dismiss drag begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    pub location: Pos2,
    pub frame: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dismiss,
    Cancel,
}

/// Image frame and fade level for one drag sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFrame {
    pub frame: Rect,
    /// 1.0 at the start position, falling toward 0.0 as the drag grows
    pub percent: f32,
}

/// Tuning for the dismiss drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DismissThresholds {
    pub distance: f32,
    pub velocity: f32,
    pub min_scale: f32,
}

impl From<&GestureConfig> for DismissThresholds {
    fn from(config: &GestureConfig) -> Self {
        Self {
            distance: config.dismiss_distance,
            velocity: config.dismiss_velocity,
            min_scale: config.min_drag_scale,
        }
    }
}

impl DismissThresholds {
    /// Far enough or fast enough
    pub fn should_dismiss(&self, dy: f32, velocity_y: f32) -> bool {
        dy.abs() > self.distance || velocity_y.abs() > self.velocity
    }
}

pub fn drag_percent(dy: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 {
        return 1.0;
    }
    (1.0 - dy.abs() / viewport_height).clamp(0.0, 1.0)
}

pub struct TransitionController {
    phase: Phase,
    drag_start: Option<DragStart>,
    status_bar_hidden: bool,
    thresholds: DismissThresholds,
}

impl TransitionController {
    pub fn new(thresholds: DismissThresholds) -> Self {
        Self {
            phase: Phase::Closed,
            drag_start: None,
            status_bar_hidden: false,
            thresholds,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status_bar_hidden(&self) -> bool {
        self.status_bar_hidden
    }

    pub fn drag_start(&self) -> Option<DragStart> {
        self.drag_start
    }

    pub fn begin_opening(&mut self) -> bool {
        self.transition(Phase::Closed, Phase::Opening)
    }

    pub fn finish_opening(&mut self) -> bool {
        let moved = self.transition(Phase::Opening, Phase::Presented);
        if moved {
            self.status_bar_hidden = true;
        }
        moved
    }

    /// A dismiss drag may only start on an unzoomed tile while presented
    pub fn can_begin_drag(&self, zoom_scale: f32, epsilon: f32) -> bool {
        self.phase == Phase::Presented && zoom_scale <= 1.0 + epsilon
    }

    pub fn begin_drag(&mut self, location: Pos2, frame: Rect) -> bool {
        if !self.transition(Phase::Presented, Phase::Dragging) {
            return false;
        }
        self.drag_start = Some(DragStart { location, frame });
        self.status_bar_hidden = false;
        true
    }

    /// Image frame for the pointer at `location`, `dy` below where it started
    pub fn drag_update(&self, location: Pos2, dy: f32, viewport_height: f32) -> Option<DragFrame> {
        if self.phase != Phase::Dragging {
            return None;
        }
        let start = self.drag_start?;
        let percent = drag_percent(dy, viewport_height);
        let scale = percent.max(self.thresholds.min_scale);
        Some(DragFrame {
            frame: scale_about_anchor(start.frame, start.location, location, scale),
            percent,
        })
    }

    /// Resolve a finished drag. An interrupted gesture always cancels.
    pub fn end_drag(&mut self, dy: f32, velocity_y: f32, interrupted: bool) -> Option<DragOutcome> {
        if self.phase != Phase::Dragging {
            return None;
        }
        let outcome = if !interrupted && self.thresholds.should_dismiss(dy, velocity_y) {
            self.phase = Phase::Dismissing;
            DragOutcome::Dismiss
        } else {
            self.phase = Phase::Cancelling;
            DragOutcome::Cancel
        };
        tracing::debug!("Drag ended ({:?}) dy={:.1} vy={:.1}", outcome, dy, velocity_y);
        Some(outcome)
    }

    /// Dismiss without a drag (tap or close)
    pub fn begin_dismissing(&mut self) -> bool {
        self.transition(Phase::Presented, Phase::Dismissing)
    }

    pub fn finish_cancelling(&mut self) -> bool {
        let moved = self.transition(Phase::Cancelling, Phase::Presented);
        if moved {
            self.drag_start = None;
            self.status_bar_hidden = true;
        }
        moved
    }

    pub fn finish_dismissing(&mut self) -> bool {
        let moved = self.transition(Phase::Dismissing, Phase::Closed);
        if moved {
            self.drag_start = None;
            self.status_bar_hidden = false;
        }
        moved
    }

    fn transition(&mut self, from: Phase, to: Phase) -> bool {
        if self.phase != from {
            tracing::trace!("Ignoring {:?} -> {:?} while {:?}", from, to, self.phase);
            return false;
        }
        self.phase = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn controller() -> TransitionController {
        TransitionController::new(DismissThresholds::from(&GestureConfig::default()))
    }

    fn dragging() -> TransitionController {
        let mut c = controller();
        c.begin_opening();
        c.finish_opening();
        c.begin_drag(
            pos2(200.0, 400.0),
            Rect::from_min_size(pos2(0.0, 300.0), vec2(400.0, 200.0)),
        );
        c
    }

    #[test]
    fn test_dismiss_thresholds() {
        let t = DismissThresholds::from(&GestureConfig::default());
        assert!(!t.should_dismiss(50.0, 100.0));
        assert!(t.should_dismiss(150.0, 0.0));
        assert!(t.should_dismiss(10.0, 600.0));
        assert!(t.should_dismiss(-150.0, 0.0));
        assert!(!t.should_dismiss(100.0, 500.0));
    }

    #[test]
    fn test_end_drag_outcomes() {
        let mut c = dragging();
        assert_eq!(c.end_drag(50.0, 100.0, false), Some(DragOutcome::Cancel));
        assert_eq!(c.phase(), Phase::Cancelling);

        let mut c = dragging();
        assert_eq!(c.end_drag(150.0, 0.0, false), Some(DragOutcome::Dismiss));
        assert_eq!(c.phase(), Phase::Dismissing);

        let mut c = dragging();
        assert_eq!(c.end_drag(10.0, 600.0, false), Some(DragOutcome::Dismiss));
    }

    #[test]
    fn test_interrupted_drag_cancels() {
        let mut c = dragging();
        assert_eq!(c.end_drag(400.0, 2000.0, true), Some(DragOutcome::Cancel));
        assert_eq!(c.phase(), Phase::Cancelling);
        assert!(c.finish_cancelling());
        assert_eq!(c.phase(), Phase::Presented);
        assert!(c.status_bar_hidden());
    }

    #[test]
    fn test_open_and_status_bar() {
        let mut c = controller();
        assert!(!c.finish_opening());
        assert!(c.begin_opening());
        assert!(!c.begin_opening());
        assert!(!c.status_bar_hidden());
        assert!(c.finish_opening());
        assert!(c.status_bar_hidden());

        c.begin_drag(pos2(0.0, 0.0), Rect::ZERO);
        assert!(!c.status_bar_hidden());
    }

    #[test]
    fn test_drag_requires_unzoomed_presented() {
        let mut c = controller();
        assert!(!c.can_begin_drag(1.0, 0.1));
        c.begin_opening();
        c.finish_opening();
        assert!(c.can_begin_drag(1.05, 0.1));
        assert!(!c.can_begin_drag(1.5, 0.1));
    }

    #[test]
    fn test_drag_frame_tracks_finger() {
        let c = dragging();
        // Viewport 800 tall, dragged down 200: percent 0.75
        let drag = c.drag_update(pos2(200.0, 600.0), 200.0, 800.0).unwrap();
        assert!((drag.percent - 0.75).abs() < 1e-4);
        assert_eq!(drag.frame.size(), vec2(300.0, 150.0));
        // Grab point was the frame centre, so the centre follows the finger
        assert_eq!(drag.frame.center(), pos2(200.0, 600.0));
    }

    #[test]
    fn test_drag_scale_floor() {
        let c = dragging();
        let drag = c.drag_update(pos2(200.0, 1400.0), 1000.0, 800.0).unwrap();
        assert_eq!(drag.percent, 0.0);
        assert!((drag.frame.width() - 120.0).abs() < 1e-3);
        assert!((drag.frame.height() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_tap_dismiss_only_when_presented() {
        let mut c = controller();
        assert!(!c.begin_dismissing());
        c.begin_opening();
        assert!(!c.begin_dismissing());
        c.finish_opening();
        assert!(c.begin_dismissing());
        assert!(c.finish_dismissing());
        assert_eq!(c.phase(), Phase::Closed);
        assert!(!c.status_bar_hidden());
    }
}
