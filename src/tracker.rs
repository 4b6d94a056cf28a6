//! The live tracking core.
//!
//! [`Tracker`] owns the estimator, the activity machine and the sampler and
//! drives them from two entry points, [`Tracker::ingest`] and
//! [`Tracker::tick`]. Both must be called from the same loop; the tracker
//! does no locking of its own. Each call returns the notifications it
//! produced so a front end can react without polling.

use chrono::{DateTime, Local};
use log::{error, info, warn};

use crate::activity::{ActivityMachine, ActivityState, Transition};
use crate::config::Config;
use crate::estimator::RateEstimator;
use crate::keymap::{self, Symbol};
use crate::report::{self, Statistics, StatsFilter};
use crate::sampler::Sampler;
use crate::session::{format_countdown, format_elapsed, SessionTimers};
use crate::store::{Sample, SampleStore};

/// Upper bound on the typed-text preview
const TYPED_DISPLAY_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    RateChanged { rate: u32 },
    StateChanged(Transition),
    SampleRecorded(Sample),
}

pub struct Tracker<S: SampleStore> {
    estimator: RateEstimator,
    activity: ActivityMachine,
    sampler: Sampler,
    timers: SessionTimers,
    store: S,
    current_rate: u32,
    last_key: Option<Symbol>,
    typed: String,
    input_error: Option<String>,
}

impl<S: SampleStore> Tracker<S> {
    pub fn new(config: &Config, store: S) -> Self {
        Self {
            estimator: RateEstimator::new(config.window()),
            activity: ActivityMachine::new(config.zero_ticks_to_pause, config.silence_to_pause()),
            sampler: Sampler::new(config.sample_period(), config.user_id.clone()),
            timers: SessionTimers::default(),
            store,
            current_rate: 0,
            last_key: None,
            typed: String::new(),
            input_error: None,
        }
    }

    /// Feed one raw key press (HID usage ID) received at `at`.
    pub fn ingest(&mut self, code: u16, at: DateTime<Local>) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        if self.input_error.is_some() {
            return events;
        }
        let Some(token) = keymap::ingest(code, at) else {
            return events;
        };

        self.estimator.push(token);
        self.last_key = Some(token.symbol);
        self.push_typed(token.symbol.as_char());

        if let Some(t) = self.activity.on_key(at) {
            self.on_transition(t, at, &mut events);
        }
        events
    }

    /// One scheduler tick: estimator, then activity, then sampler.
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<TrackerEvent> {
        let mut events = Vec::new();

        let rate = self.estimator.tick(now);
        if rate != self.current_rate {
            self.current_rate = rate;
            events.push(TrackerEvent::RateChanged { rate });
        }

        if let Some(t) = self.activity.on_tick(rate, now) {
            self.on_transition(t, now, &mut events);
        }

        if self.activity.is_active() {
            if let Some(sample) = self.sampler.on_period_tick(now, rate) {
                self.typed.clear();
                match self.store.append(&sample) {
                    Ok(()) => {
                        info!("recorded sample: {} wpm", sample.wpm);
                        events.push(TrackerEvent::SampleRecorded(sample));
                    }
                    Err(e) => warn!("dropping sample of {} wpm: {e}", sample.wpm),
                }
            }
        }

        events
    }

    /// Manual pause/resume toggle
    pub fn toggle_pause(&mut self, now: DateTime<Local>) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        let t = if self.activity.is_active() {
            self.activity.pause()
        } else if self.input_error.is_none() {
            self.activity.resume(now)
        } else {
            None
        };
        if let Some(t) = t {
            self.on_transition(t, now, &mut events);
        }
        events
    }

    /// Input can no longer be read. Tracking pauses and the elapsed
    /// display shows `msg` until [`Tracker::clear_input_error`].
    pub fn report_input_unavailable(
        &mut self,
        msg: impl Into<String>,
        now: DateTime<Local>,
    ) -> Vec<TrackerEvent> {
        let msg = msg.into();
        let mut events = Vec::new();
        if self.input_error.is_none() {
            error!("keyboard input unavailable: {msg}");
        }
        self.input_error = Some(msg);
        if let Some(t) = self.activity.pause() {
            self.on_transition(t, now, &mut events);
        }
        events
    }

    pub fn clear_input_error(&mut self) {
        if self.input_error.take().is_some() {
            info!("keyboard input available again");
        }
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn current_rate(&self) -> u32 {
        self.current_rate
    }

    pub fn state(&self) -> ActivityState {
        self.activity.state()
    }

    pub fn last_key(&self) -> Option<Symbol> {
        self.last_key
    }

    pub fn typed_display(&self) -> &str {
        &self.typed
    }

    pub fn elapsed_display(&self, now: DateTime<Local>) -> String {
        match &self.input_error {
            Some(msg) => format!("Error: {msg}"),
            None => format_elapsed(self.timers.elapsed(now)),
        }
    }

    /// Time until the next sample, `00:00` while paused
    pub fn countdown_display(&self, now: DateTime<Local>) -> String {
        format_countdown(self.sampler.remaining(now).unwrap_or_default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Statistics over everything in the store. A failed read is logged
    /// and summarised as an empty history.
    pub fn statistics(&self, filter: &StatsFilter, now: DateTime<Local>) -> Statistics {
        report::statistics(&self.history(), filter, now)
    }

    pub fn history(&self) -> Vec<Sample> {
        self.store.fetch_all().unwrap_or_else(|e| {
            warn!("cannot read sample history: {e}");
            Vec::new()
        })
    }

    fn on_transition(&mut self, t: Transition, now: DateTime<Local>, events: &mut Vec<TrackerEvent>) {
        match t.to {
            ActivityState::Active => {
                info!("tracking resumed");
                self.sampler.start(now);
                self.timers.start(now);
            }
            ActivityState::Paused => {
                info!("tracking paused");
                self.sampler.stop();
                self.timers.stop(now);
            }
        }
        events.push(TrackerEvent::StateChanged(t));
    }

    fn push_typed(&mut self, c: char) {
        self.typed.push(c);
        let excess = self.typed.chars().count().saturating_sub(TYPED_DISPLAY_LIMIT);
        if excess > 0 {
            self.typed = self.typed.chars().skip(excess).collect();
        }
    }
}
