use std::time::Duration;

use chrono::{DateTime, Local};

use crate::store::Sample;

pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_secs(10);

/// Fixed-period snapshot cadence, advanced by the scheduler tick.
///
/// The cadence only runs between `start` and `stop`. Each period that
/// elapses while running produces exactly one sample.
#[derive(Debug, Clone)]
pub struct Sampler {
    period: Duration,
    user_id: String,
    period_start: Option<DateTime<Local>>,
}

impl Sampler {
    pub fn new(period: Duration, user_id: impl Into<String>) -> Self {
        Self {
            period,
            user_id: user_id.into(),
            period_start: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_running(&self) -> bool {
        self.period_start.is_some()
    }

    pub fn start(&mut self, now: DateTime<Local>) {
        if self.period_start.is_none() {
            self.period_start = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.period_start = None;
    }

    /// Time left in the current period, `None` when stopped.
    pub fn remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        let elapsed = self.elapsed(now)?;
        Some(self.period.saturating_sub(elapsed))
    }

    /// Called once per scheduler tick. Returns a sample when a period has
    /// elapsed. Period boundaries stay on the `start + k * period` grid, so
    /// late ticks do not shift later samples and a stall yields one sample.
    pub fn on_period_tick(&mut self, now: DateTime<Local>, rate: u32) -> Option<Sample> {
        let elapsed = self.elapsed(now)?;
        if elapsed < self.period {
            return None;
        }
        let period_nanos = self.period.as_nanos();
        let into_period = if period_nanos == 0 {
            0
        } else {
            elapsed.as_nanos() % period_nanos
        };
        let into_period = i64::try_from(into_period).unwrap_or(0);
        self.period_start = Some(now - chrono::Duration::nanoseconds(into_period));
        Some(Sample::new(now, rate, self.user_id.clone()))
    }

    fn elapsed(&self, now: DateTime<Local>) -> Option<Duration> {
        let start = self.period_start?;
        Some((now - start).to_std().unwrap_or_default())
    }
}
