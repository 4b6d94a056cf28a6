use chrono::{DateTime, Local};
use clap::ValueEnum;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::store::Sample;
use crate::util::{mean, median, std_dev};

/// How far back the history view looks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
pub enum TimeFrame {
    #[strum(serialize = "1 Minute")]
    LastMinute,
    #[strum(serialize = "1 Day")]
    LastDay,
    #[strum(serialize = "7 Days")]
    LastWeek,
    #[strum(serialize = "30 Days")]
    LastMonth,
    #[default]
    #[strum(serialize = "All Time")]
    All,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 5] = [
        TimeFrame::LastMinute,
        TimeFrame::LastDay,
        TimeFrame::LastWeek,
        TimeFrame::LastMonth,
        TimeFrame::All,
    ];

    pub fn span(&self) -> Option<chrono::Duration> {
        match self {
            TimeFrame::LastMinute => Some(chrono::Duration::minutes(1)),
            TimeFrame::LastDay => Some(chrono::Duration::days(1)),
            TimeFrame::LastWeek => Some(chrono::Duration::days(7)),
            TimeFrame::LastMonth => Some(chrono::Duration::days(30)),
            TimeFrame::All => None,
        }
    }

    /// Samples strictly newer than `now - span`
    pub fn contains(&self, timestamp: DateTime<Local>, now: DateTime<Local>) -> bool {
        match self.span() {
            Some(span) => timestamp > now - span,
            None => true,
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Preset WPM ranges, each split into 10-wide bins
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
pub enum WpmRange {
    #[default]
    #[value(name = "1-200")]
    #[strum(serialize = "1-200")]
    OneTo200,
    #[value(name = "1-100")]
    #[strum(serialize = "1-100")]
    OneTo100,
    #[value(name = "50-100")]
    #[strum(serialize = "50-100")]
    FiftyTo100,
    #[value(name = "100-200")]
    #[strum(serialize = "100-200")]
    HundredTo200,
}

impl WpmRange {
    pub const ALL: [WpmRange; 4] = [
        WpmRange::OneTo200,
        WpmRange::OneTo100,
        WpmRange::FiftyTo100,
        WpmRange::HundredTo200,
    ];

    pub const STEP: u32 = 10;

    pub fn bounds(&self) -> (u32, u32) {
        match self {
            WpmRange::OneTo200 => (1, 200),
            WpmRange::OneTo100 => (1, 100),
            WpmRange::FiftyTo100 => (50, 100),
            WpmRange::HundredTo200 => (100, 200),
        }
    }

    pub fn bins(&self) -> Vec<Bin> {
        let (start, end) = self.bounds();
        generate_bins(start, end, Self::STEP)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Inclusive WPM interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bin {
    pub start: u32,
    pub end: u32,
}

impl Bin {
    pub fn contains(&self, wpm: u32) -> bool {
        (self.start..=self.end).contains(&wpm)
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Contiguous bins `[start, start+step-1], ...` up to `end`; the last bin
/// is cut short at `end`. A zero step yields no bins.
pub fn generate_bins(start: u32, end: u32, step: u32) -> Vec<Bin> {
    if step == 0 {
        return Vec::new();
    }

    let mut bins = Vec::new();
    let mut current = start;
    while current <= end {
        let last = current.saturating_add(step - 1).min(end);
        bins.push(Bin {
            start: current,
            end: last,
        });
        match last.checked_add(1) {
            Some(next) => current = next,
            None => break,
        }
    }
    bins
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinCount {
    pub bin: Bin,
    pub count: usize,
}

/// Per-bin sample counts, in bin order. Samples outside every bin are
/// left out.
pub fn histogram(samples: &[Sample], bins: &[Bin]) -> Vec<BinCount> {
    bins.iter()
        .map(|bin| BinCount {
            bin: *bin,
            count: samples.iter().filter(|s| bin.contains(s.wpm)).count(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFilter {
    pub time_frame: TimeFrame,
    pub range: Option<WpmRange>,
}

impl StatsFilter {
    pub fn new(time_frame: TimeFrame, range: Option<WpmRange>) -> Self {
        Self { time_frame, range }
    }

    pub fn bins(&self) -> Vec<Bin> {
        self.range.unwrap_or_default().bins()
    }

    /// Samples inside the time frame, whatever their rate
    pub fn in_time_frame(&self, samples: &[Sample], now: DateTime<Local>) -> Vec<Sample> {
        samples
            .iter()
            .filter(|s| self.time_frame.contains(s.timestamp, now))
            .cloned()
            .collect()
    }

    /// Samples passing both the time frame and, when set, the range
    pub fn apply(&self, samples: &[Sample], now: DateTime<Local>) -> Vec<Sample> {
        let bins = self.range.map(|r| r.bins());
        samples
            .iter()
            .filter(|s| self.time_frame.contains(s.timestamp, now))
            .filter(|s| match &bins {
                Some(bins) => bins.iter().any(|b| b.contains(s.wpm)),
                None => true,
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub max: u32,
    pub min: u32,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// Mean of the samples that fall in one of the histogram bins
    pub range_mean: f64,
    pub histogram: Vec<BinCount>,
}

/// Summary over samples; every figure is 0 for an empty input. `bins`
/// only scope the histogram and `range_mean`.
pub fn summarize(samples: &[Sample], bins: &[Bin]) -> Statistics {
    let (min, max) = match samples.iter().map(|s| s.wpm).minmax() {
        MinMaxResult::NoElements => (0, 0),
        MinMaxResult::OneElement(x) => (x, x),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let wpms: Vec<f64> = samples.iter().map(|s| s.wpm as f64).collect();
    let in_range: Vec<f64> = samples
        .iter()
        .filter(|s| bins.iter().any(|b| b.contains(s.wpm)))
        .map(|s| s.wpm as f64)
        .collect();

    Statistics {
        count: samples.len(),
        max,
        min,
        mean: mean(&wpms).unwrap_or(0.0),
        median: median(&wpms).unwrap_or(0.0),
        std_dev: std_dev(&wpms).unwrap_or(0.0),
        range_mean: mean(&in_range).unwrap_or(0.0),
        histogram: histogram(samples, bins),
    }
}

/// Summarise the samples inside the filter's time frame. The range only
/// picks the histogram bins and `range_mean`; with no range selected the
/// full 1-200 preset is used.
pub fn statistics(samples: &[Sample], filter: &StatsFilter, now: DateTime<Local>) -> Statistics {
    let selected = filter.in_time_frame(samples, now);
    summarize(&selected, &filter.bins())
}
