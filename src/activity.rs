use std::time::Duration;

use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ZERO_TICKS_TO_PAUSE: u32 = 3;
pub const DEFAULT_SILENCE_TO_PAUSE: Duration = Duration::from_secs(5);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
pub enum ActivityState {
    Active,
    #[default]
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ActivityState,
    pub to: ActivityState,
}

/// Active/Paused tracking driven by keystrokes and zero-rate ticks.
///
/// Pausing needs both a streak of zero-rate ticks and a minimum silence
/// measured from the last keystroke (or from the resume instant).
#[derive(Debug, Clone)]
pub struct ActivityMachine {
    state: ActivityState,
    zero_streak: u32,
    last_activity: Option<DateTime<Local>>,
    zero_ticks_to_pause: u32,
    silence_to_pause: Duration,
}

impl Default for ActivityMachine {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_TICKS_TO_PAUSE, DEFAULT_SILENCE_TO_PAUSE)
    }
}

impl ActivityMachine {
    pub fn new(zero_ticks_to_pause: u32, silence_to_pause: Duration) -> Self {
        Self {
            state: ActivityState::Paused,
            zero_streak: 0,
            last_activity: None,
            zero_ticks_to_pause,
            silence_to_pause,
        }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivityState::Active
    }

    pub fn zero_streak(&self) -> u32 {
        self.zero_streak
    }

    pub fn last_activity(&self) -> Option<DateTime<Local>> {
        self.last_activity
    }

    /// A key token was ingested at `at`.
    pub fn on_key(&mut self, at: DateTime<Local>) -> Option<Transition> {
        self.zero_streak = 0;
        self.last_activity = Some(at);
        self.transition_to(ActivityState::Active)
    }

    /// The scheduler ticked and the estimator reported `rate`.
    pub fn on_tick(&mut self, rate: u32, now: DateTime<Local>) -> Option<Transition> {
        if !self.is_active() {
            return None;
        }

        if rate > 0 {
            self.zero_streak = 0;
            return None;
        }

        self.zero_streak += 1;
        if self.zero_streak >= self.zero_ticks_to_pause && self.silence(now) > self.silence_to_pause
        {
            info!(
                "pausing after {} zero-rate ticks and {:.1}s of silence",
                self.zero_streak,
                self.silence(now).as_secs_f64()
            );
            return self.transition_to(ActivityState::Paused);
        }
        None
    }

    pub fn pause(&mut self) -> Option<Transition> {
        self.transition_to(ActivityState::Paused)
    }

    pub fn resume(&mut self, now: DateTime<Local>) -> Option<Transition> {
        if self.is_active() {
            return None;
        }
        self.zero_streak = 0;
        self.last_activity = Some(now);
        self.transition_to(ActivityState::Active)
    }

    /// Time since the last keystroke or resume. Zero before any activity.
    pub fn silence(&self, now: DateTime<Local>) -> Duration {
        self.last_activity
            .and_then(|at| (now - at).to_std().ok())
            .unwrap_or_default()
    }

    fn transition_to(&mut self, to: ActivityState) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        if to == ActivityState::Paused {
            self.zero_streak = 0;
        }
        Some(Transition { from, to })
    }
}
