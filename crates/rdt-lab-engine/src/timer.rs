use std::time::{Duration, Instant};

/// Cooperative countdown bounding how long the sender waits for an
/// acknowledgment.
///
/// Holds a monotonic deadline checked at poll points instead of running a
/// background thread. `start` arms a fresh countdown and replaces any
/// live one, so at most one deadline can ever signal for an attempt;
/// `stop` disarms with no further effect (stopping an already-expired
/// timer is a no-op); `restart` re-arms without signaling expiration.
#[derive(Debug)]
pub struct AckTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl AckTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// Whether an armed countdown has run out. A stopped timer never
    /// reports expiration.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
