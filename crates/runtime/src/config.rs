use std::time::Duration;

/// Orchestration settings for one encounter coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Lifetime of transient feedback flags such as "not enough faith".
    pub feedback_duration: Duration,
    /// Entries kept in the player-facing combat log.
    pub log_capacity: usize,
    /// Per-topic capacity of the event bus.
    pub event_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_FEEDBACK_DURATION: Duration = Duration::from_millis(600);
    pub const DEFAULT_LOG_CAPACITY: usize = 64;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

    pub fn with_feedback_duration(mut self, duration: Duration) -> Self {
        self.feedback_duration = duration;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            feedback_duration: Self::DEFAULT_FEEDBACK_DURATION,
            log_capacity: Self::DEFAULT_LOG_CAPACITY,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}
