use std::time::{Duration, Instant};

/// Reel animation length; also the minimum gap between two spins.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone)]
pub struct Cooldown {
    period: Duration,
    last: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left before another start is allowed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.period.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    /// Marks a start at `now`, or returns the remaining wait.
    pub fn try_start(&mut self, now: Instant) -> Result<(), Duration> {
        let remaining = self.remaining(now);
        if !remaining.is_zero() {
            return Err(remaining);
        }
        self.last = Some(now);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
