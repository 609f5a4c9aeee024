//! Caption label and its auto-hide timer

use std::time::{Duration, Instant};

/// One-shot timer that hides the caption after the pager has been idle
#[derive(Debug, Clone)]
pub struct CaptionTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl CaptionTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arm the timer from `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop a pending fire
    pub fn invalidate(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, on the first poll at or after the deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Caption shown under the active photo
#[derive(Debug, Clone)]
pub struct CaptionState {
    pub text: Option<String>,
    pub visible: bool,
    pub alpha: f32,
    pub timer: CaptionTimer,
}

impl CaptionState {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            text: None,
            visible: true,
            alpha: 1.0,
            timer: CaptionTimer::new(hide_delay),
        }
    }

    pub fn set_text(&mut self, text: Option<&str>) {
        self.text = text.map(str::to_owned);
    }

    /// Hide immediately and forget any pending fade
    pub fn hide(&mut self) {
        self.timer.invalidate();
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once() {
        let t0 = Instant::now();
        let mut timer = CaptionTimer::new(Duration::from_secs(5));
        assert!(!timer.poll(t0));

        timer.arm(t0);
        assert!(timer.is_armed());
        assert!(!timer.poll(t0 + Duration::from_secs(4)));
        assert!(timer.poll(t0 + Duration::from_secs(5)));
        assert!(!timer.poll(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_invalidate_prevents_fire() {
        let t0 = Instant::now();
        let mut timer = CaptionTimer::new(Duration::from_secs(5));
        timer.arm(t0);
        timer.invalidate();
        assert!(!timer.poll(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let t0 = Instant::now();
        let mut timer = CaptionTimer::new(Duration::from_secs(5));
        timer.arm(t0);
        timer.arm(t0 + Duration::from_secs(3));
        assert!(!timer.poll(t0 + Duration::from_secs(6)));
        assert!(timer.poll(t0 + Duration::from_secs(8)));
    }

    #[test]
    fn test_hide_invalidates() {
        let t0 = Instant::now();
        let mut caption = CaptionState::new(Duration::from_secs(5));
        caption.set_text(Some("Sunset"));
        caption.timer.arm(t0);
        caption.hide();

        assert!(!caption.visible);
        assert!(!caption.timer.is_armed());
        assert_eq!(caption.text.as_deref(), Some("Sunset"));
    }
}
