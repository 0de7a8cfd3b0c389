//! Timestamp source for new messages.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond wall clock that never repeats a reading.
///
/// Messages are displayed by timestamp, so two messages created within the
/// same millisecond would otherwise have no defined order. Each reading is
/// `max(now, previous + 1)`.
#[derive(Debug, Default)]
pub struct MessageClock {
    last: AtomicI64,
}

impl MessageClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next timestamp in milliseconds since the Unix epoch.
    pub fn now_millis(&self) -> i64 {
        let wall = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = wall.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(observed) => last = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_strictly_increase() {
        let clock = MessageClock::new();
        let readings: Vec<i64> = (0..1000).map(|_| clock.now_millis()).collect();
        assert!(readings.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_readings_track_wall_clock() {
        let clock = MessageClock::new();
        let before = Utc::now().timestamp_millis();
        assert!(clock.now_millis() >= before);
    }
}
