use std::time::Duration;

use chrono::{DateTime, Local};

/// Accumulated active time. Runs only while tracking is active and keeps
/// its total across pauses.
#[derive(Debug, Clone, Default)]
pub struct SessionTimers {
    accumulated: Duration,
    active_since: Option<DateTime<Local>>,
}

impl SessionTimers {
    pub fn start(&mut self, now: DateTime<Local>) {
        if self.active_since.is_none() {
            self.active_since = Some(now);
        }
    }

    pub fn stop(&mut self, now: DateTime<Local>) {
        if let Some(since) = self.active_since.take() {
            self.accumulated += (now - since).to_std().unwrap_or_default();
        }
    }

    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        let running = self
            .active_since
            .and_then(|since| (now - since).to_std().ok())
            .unwrap_or_default();
        self.accumulated + running
    }
}

/// `HH:MM:SS`
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `MM:SS`, rounded up so a countdown shows its starting value
pub fn format_countdown(d: Duration) -> String {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    #[test]
    fn elapsed_accumulates_across_pauses() {
        let mut timers = SessionTimers::default();
        assert_eq!(timers.elapsed(at(0)), Duration::ZERO);

        timers.start(at(0));
        assert_eq!(timers.elapsed(at(30)), Duration::from_secs(30));
        timers.stop(at(40));
        assert_eq!(timers.elapsed(at(500)), Duration::from_secs(40));

        timers.start(at(600));
        assert_eq!(timers.elapsed(at(605)), Duration::from_secs(45));
    }

    #[test]
    fn double_start_keeps_first_instant() {
        let mut timers = SessionTimers::default();
        timers.start(at(0));
        timers.start(at(10));
        assert_eq!(timers.elapsed(at(20)), Duration::from_secs(20));
    }

    #[test]
    fn formats() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05");
        assert_eq!(format_countdown(Duration::from_secs(10)), "00:10");
        assert_eq!(format_countdown(Duration::from_millis(3200)), "00:04");
        assert_eq!(format_countdown(Duration::ZERO), "00:00");
    }
}
