use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transient signal shown to the player after a local rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackKind {
    InsufficientFaith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub remaining: Duration,
}

impl Feedback {
    pub fn new(kind: FeedbackKind, duration: Duration) -> Self {
        Self {
            kind,
            remaining: duration,
        }
    }

    /// Counts down; returns true once expired.
    pub(crate) fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_duration() {
        let mut feedback = Feedback::new(FeedbackKind::InsufficientFaith, Duration::from_millis(600));
        assert!(!feedback.tick(Duration::from_millis(400)));
        assert_eq!(feedback.remaining, Duration::from_millis(200));
        assert!(feedback.tick(Duration::from_millis(400)));
    }
}
