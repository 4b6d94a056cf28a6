use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{DateTime, Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use wpmtrack::config::Config;
use wpmtrack::keymap::usage_from_key_code;
use wpmtrack::runtime::{FixedTicker, Runner, TestEventSource, TrackEvent};
use wpmtrack::store::MemoryStore;
use wpmtrack::{ActivityState, Tracker, TrackerEvent};

fn t0() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap()
}

fn send_text(tx: &mpsc::Sender<TrackEvent>, text: &str) {
    for c in text.chars() {
        let code = if c == '\n' {
            KeyCode::Enter
        } else {
            KeyCode::Char(c)
        };
        tx.send(TrackEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }
}

// Headless run of the home loop: key events and ticks are serialised by the
// Runner, time is simulated (each tick advances the clock by one second).
#[test]
fn headless_session_records_samples_then_pauses() {
    let (tx, rx) = mpsc::channel();
    send_text(&tx, "the quick brown fox\njumps over ");

    let es = TestEventSource::new(rx);
    let mut runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));
    let mut tracker = Tracker::new(&Config::default(), MemoryStore::new());

    let mut clock = t0();
    let mut ticks = 0;
    let mut events = Vec::new();
    while ticks < 30 {
        match runner.step() {
            TrackEvent::Tick => {
                clock += chrono::Duration::seconds(1);
                ticks += 1;
                events.extend(tracker.tick(clock));
            }
            TrackEvent::Key(key) => {
                if let Some(code) = usage_from_key_code(key.code) {
                    events.extend(tracker.ingest(code, clock));
                }
            }
            TrackEvent::Resize | TrackEvent::InputLost(_) => {}
        }
    }

    assert_matches!(
        events.first(),
        Some(TrackerEvent::StateChanged(t)) if t.to == ActivityState::Active
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, TrackerEvent::RateChanged { rate: 36 })));
    assert_matches!(
        events.last(),
        Some(TrackerEvent::StateChanged(t)) if t.to == ActivityState::Paused
    );

    let recorded: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            TrackerEvent::SampleRecorded(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    assert!(!recorded.is_empty());
    assert_eq!(recorded[0].wpm, 36);
    assert_eq!(tracker.store().len(), recorded.len());
    assert_eq!(tracker.state(), ActivityState::Paused);
    assert_eq!(tracker.current_rate(), 0);
}

#[test]
fn headless_input_loss_is_reported_not_fatal() {
    let (tx, rx) = mpsc::channel();
    send_text(&tx, "ab ");
    tx.send(TrackEvent::InputLost("device gone".into())).unwrap();
    drop(tx);

    let es = TestEventSource::new(rx);
    let mut runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));
    let mut tracker = Tracker::new(&Config::default(), MemoryStore::new());

    let mut clock = t0();
    for _ in 0..20 {
        match runner.step() {
            TrackEvent::Tick => {
                clock += chrono::Duration::seconds(1);
                tracker.tick(clock);
            }
            TrackEvent::Key(key) => {
                if let Some(code) = usage_from_key_code(key.code) {
                    tracker.ingest(code, clock);
                }
            }
            TrackEvent::InputLost(msg) => {
                tracker.report_input_unavailable(msg, clock);
            }
            TrackEvent::Resize => {}
        }
    }

    assert_eq!(tracker.state(), ActivityState::Paused);
    assert_eq!(tracker.input_error(), Some("device gone"));
    assert!(tracker.elapsed_display(clock).starts_with("Error: "));
}
