//! Per-property animation tracks
//!
//! Every animated property has at most one live track. Starting an
//! animation on a property supersedes the previous track for it, and the
//! superseded animation's completion never fires.

use crate::geometry::{lerp, lerp_rect};
use crate::tile::TileId;
use egui::Rect;
use std::time::{Duration, Instant};

/// Animatable property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTarget {
    /// Image surface frame of a tile
    TileFrame(TileId),
    /// Black backdrop opacity
    Backdrop,
    /// Page indicator opacity
    Indicator,
    /// Caption opacity
    Caption,
    /// Opacity of the whole browser surface
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
    Scalar(f32),
    Frame(Rect),
}

impl AnimValue {
    fn interpolate(self, to: AnimValue, t: f32) -> AnimValue {
        if t >= 1.0 {
            return to;
        }
        match (self, to) {
            (AnimValue::Scalar(a), AnimValue::Scalar(b)) => AnimValue::Scalar(lerp(a, b, t)),
            (AnimValue::Frame(a), AnimValue::Frame(b)) => AnimValue::Frame(lerp_rect(a, b, t)),
            // Mismatched kinds jump straight to the end value
            (_, to) => to,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseOut,
}

impl Easing {
    fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            // Ease-out cubic
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// One property change
#[derive(Debug, Clone, Copy)]
pub struct Animation {
    pub target: AnimTarget,
    pub from: AnimValue,
    pub to: AnimValue,
}

impl Animation {
    pub fn scalar(target: AnimTarget, from: f32, to: f32) -> Self {
        Self {
            target,
            from: AnimValue::Scalar(from),
            to: AnimValue::Scalar(to),
        }
    }

    pub fn frame(target: AnimTarget, from: Rect, to: Rect) -> Self {
        Self {
            target,
            from: AnimValue::Frame(from),
            to: AnimValue::Frame(to),
        }
    }
}

/// Batch a track belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AnimationToken(u64);

struct Track {
    token: AnimationToken,
    animation: Animation,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Track {
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }
}

struct Batch<C> {
    token: AnimationToken,
    remaining: usize,
    completion: Option<C>,
    superseded: bool,
}

/// Values produced by one [`Animator::tick`]
pub struct Frame<C> {
    pub values: Vec<(AnimTarget, AnimValue)>,
    /// Completions of batches whose tracks all finished undisturbed
    pub completed: Vec<C>,
}

pub struct Animator<C> {
    tracks: Vec<Track>,
    batches: Vec<Batch<C>>,
    next_token: u64,
}

impl<C> Default for Animator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Animator<C> {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            batches: Vec::new(),
            next_token: 1,
        }
    }

    /// Start a batch. Live tracks on the same targets are superseded first.
    pub fn start(
        &mut self,
        animations: Vec<Animation>,
        duration: Duration,
        easing: Easing,
        now: Instant,
        completion: Option<C>,
    ) {
        let token = AnimationToken(self.next_token);
        self.next_token += 1;

        for animation in &animations {
            self.cancel_target(animation.target);
        }

        self.batches.push(Batch {
            token,
            remaining: animations.len(),
            completion,
            superseded: false,
        });
        for animation in animations {
            self.tracks.push(Track {
                token,
                animation,
                start: now,
                duration,
                easing,
            });
        }
    }

    /// Drop the live track on `target`. Its batch will not complete.
    fn cancel_target(&mut self, target: AnimTarget) -> bool {
        let Some(index) = self.tracks.iter().position(|t| t.animation.target == target) else {
            return false;
        };
        let track = self.tracks.remove(index);
        if let Some(batch) = self.batches.iter_mut().find(|b| b.token == track.token) {
            batch.remaining = batch.remaining.saturating_sub(1);
            batch.superseded = true;
        }
        tracing::trace!("Superseded animation on {:?}", target);
        true
    }

    pub fn is_animating(&self, target: AnimTarget) -> bool {
        self.tracks.iter().any(|t| t.animation.target == target)
    }

    pub fn is_idle(&self) -> bool {
        self.tracks.is_empty() && self.batches.is_empty()
    }

    /// Advance all tracks to `now`
    pub fn tick(&mut self, now: Instant) -> Frame<C> {
        let mut values = Vec::with_capacity(self.tracks.len());
        let mut finished = Vec::new();

        for (index, track) in self.tracks.iter().enumerate() {
            let t = track.progress(now);
            let eased = track.easing.apply(t);
            values.push((
                track.animation.target,
                track.animation.from.interpolate(track.animation.to, eased),
            ));
            if t >= 1.0 {
                finished.push(index);
            }
        }

        for index in finished.into_iter().rev() {
            let track = self.tracks.remove(index);
            if let Some(batch) = self.batches.iter_mut().find(|b| b.token == track.token) {
                batch.remaining = batch.remaining.saturating_sub(1);
            }
        }

        let mut completed = Vec::new();
        let mut index = 0;
        while index < self.batches.len() {
            if self.batches[index].remaining == 0 {
                let batch = self.batches.remove(index);
                if !batch.superseded {
                    completed.extend(batch.completion);
                }
            } else {
                index += 1;
            }
        }

        Frame { values, completed }
    }
}
