use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Unified event type consumed by the home loop
#[derive(Clone, Debug)]
pub enum TrackEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// The input source failed and will deliver nothing more
    InputLost(String),
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait TrackEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TrackEvent, RecvTimeoutError>;
}

/// Production event source: crossterm is read on a dedicated thread and
/// events are forwarded over a channel to the home loop.
pub struct CrosstermEventSource {
    rx: Receiver<TrackEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // key releases would double count on terminals that report them
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => TrackEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => TrackEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    let _ = tx.send(TrackEvent::InputLost(e.to_string()));
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrackEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TrackEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TrackEvent>) -> Self {
        Self { rx }
    }
}

impl TrackEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrackEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Single-threaded scheduler: yields input events as they arrive and a
/// `Tick` every interval, even while input keeps flowing.
pub struct Runner<E: TrackEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: TrackEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Blocks until the next event or the next tick deadline
    pub fn step(&mut self) -> TrackEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.fire_tick(now);
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.fire_tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                // nothing more will arrive; keep the cadence without spinning
                std::thread::sleep(self.next_tick.saturating_duration_since(Instant::now()));
                self.fire_tick(Instant::now())
            }
        }
    }

    fn fire_tick(&mut self, now: Instant) -> TrackEvent {
        let interval = self.ticker.interval();
        self.next_tick += interval;
        // after a long stall, skip missed ticks instead of bursting
        if self.next_tick <= now {
            self.next_tick = now + interval;
        }
        TrackEvent::Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            TrackEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(TrackEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(200));
        let mut runner = Runner::new(es, ticker);

        match runner.step() {
            TrackEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn ticks_are_not_starved_by_input() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..10_000 {
            tx.send(TrackEvent::Key(KeyEvent::new(
                KeyCode::Char('a'),
                KeyModifiers::NONE,
            )))
            .unwrap();
        }
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

        std::thread::sleep(Duration::from_millis(10));
        assert!(matches!(runner.step(), TrackEvent::Tick));
    }

    #[test]
    fn disconnected_source_still_ticks() {
        let (tx, rx) = mpsc::channel::<TrackEvent>();
        drop(tx);
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, FixedTicker::new(Duration::from_millis(2)));
        for _ in 0..3 {
            assert!(matches!(runner.step(), TrackEvent::Tick));
        }
    }
}
