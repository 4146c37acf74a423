//! Controls help shown once the tree is ready

use std::time::Duration;

pub const CONTROLS_TEXT: &str =
    "WASD move · Space/Shift up/down · Q/E turn · drag to look · scroll to zoom";

/// Timed controls hint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsHint {
    started: Option<Duration>,
    delay: Duration,
    duration: Duration,
}

impl ControlsHint {
    pub fn new(delay: Duration, duration: Duration) -> Self {
        Self {
            started: None,
            delay,
            duration,
        }
    }

    /// Schedule the hint relative to `now`
    pub fn start(&mut self, now: Duration) {
        self.started = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.started.is_some()
    }

    pub fn is_visible(&self, now: Duration) -> bool {
        let Some(started) = self.started else {
            return false;
        };
        let shown = started + self.delay;
        now >= shown && now < shown + self.duration
    }

    pub fn text(&self, now: Duration) -> Option<&'static str> {
        self.is_visible(now).then_some(CONTROLS_TEXT)
    }
}

impl Default for ControlsHint {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(3000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_window() {
        let mut hint = ControlsHint::default();
        assert!(!hint.is_visible(Duration::from_secs(1)));

        hint.start(Duration::from_secs(10));
        assert!(!hint.is_visible(Duration::from_millis(10_400)));
        assert!(hint.is_visible(Duration::from_millis(10_500)));
        assert_eq!(hint.text(Duration::from_millis(13_499)), Some(CONTROLS_TEXT));
        assert!(!hint.is_visible(Duration::from_millis(13_500)));
    }
}
