use std::time::{Duration, Instant};

/// How often live speed is recomputed while a session is active
pub const SPEED_TICK: Duration = Duration::from_secs(1);

/// Periodic timer polled from the event loop.
///
/// Armed while a session is active and disarmed the moment it is not, so a
/// reset or finish can never be followed by a stray recomputation.
#[derive(Debug, Clone)]
pub struct SpeedTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl SpeedTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arms or disarms to follow `active`, leaving a running schedule untouched.
    pub fn sync(&mut self, active: bool, now: Instant) {
        match (active, self.is_armed()) {
            (true, false) => self.arm(now),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    /// Returns true once per elapsed interval. Missed intervals collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for SpeedTimer {
    fn default() -> Self {
        Self::new(SPEED_TICK)
    }
}
