use crate::store::Sample;

/// One point of the rate-over-time chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Seconds since the first sample against its rate. Expects samples in
/// ascending timestamp order, as returned by the store.
pub fn timeline(samples: &[Sample]) -> Vec<TimeSeriesPoint> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };

    samples
        .iter()
        .map(|s| {
            let t = (s.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
            TimeSeriesPoint::new(t, s.wpm as f64)
        })
        .collect()
}
