use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::keymap::KeyToken;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Sliding-window words-per-minute estimator.
///
/// Tokens older than the window are pruned on every read. The rate is
/// always computed against the full window length, never against the wall
/// clock since the last key, so an empty window reads as 0.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    window: Duration,
    tokens: VecDeque<KeyToken>,
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl RateEstimator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            tokens: VecDeque::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn push(&mut self, token: KeyToken) {
        self.tokens.push_back(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Drop every token with `now - timestamp > window`.
    pub fn prune(&mut self, now: DateTime<Local>) {
        let window = self.window;
        self.tokens.retain(|t| !is_expired(t, now, window));
    }

    /// Completed words currently in the window: non-empty runs of
    /// characters followed by a boundary. A trailing partial word does not
    /// count, and neither does a leading boundary or a run of consecutive
    /// boundaries, so `" a  b"` is one word.
    pub fn word_count(&self) -> usize {
        let mut words = 0;
        let mut in_word = false;
        for token in &self.tokens {
            if token.symbol.is_boundary() {
                if in_word {
                    words += 1;
                }
                in_word = false;
            } else {
                in_word = true;
            }
        }
        words
    }

    /// Prune at `now` and return the current rate in words per minute.
    pub fn tick(&mut self, now: DateTime<Local>) -> u32 {
        self.prune(now);
        rate_for(self.word_count(), self.window)
    }
}

fn is_expired(token: &KeyToken, now: DateTime<Local>, window: Duration) -> bool {
    match (now - token.timestamp).to_std() {
        Ok(age) => age > window,
        // tokens stamped after `now` are still inside the window
        Err(_) => false,
    }
}

/// `round(words / (window / 60))`, 0 for a zero-length window
pub fn rate_for(words: usize, window: Duration) -> u32 {
    let minutes = window.as_secs_f64() / 60.0;
    if words == 0 || minutes <= 0.0 {
        return 0;
    }
    (words as f64 / minutes).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Symbol;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap()
    }

    fn type_text(est: &mut RateEstimator, text: &str, start: DateTime<Local>) {
        for (i, c) in text.chars().enumerate() {
            let symbol = match c {
                ' ' => Symbol::Space,
                '\n' => Symbol::Newline,
                c => Symbol::Char(c),
            };
            let at = start + chrono::Duration::milliseconds(100 * i as i64);
            est.push(KeyToken::new(symbol, at));
        }
    }

    #[test]
    fn empty_window_reads_zero() {
        let mut est = RateEstimator::default();
        assert_eq!(est.tick(t0()), 0);
    }

    #[test]
    fn three_completed_words() {
        let mut est = RateEstimator::default();
        type_text(&mut est, "hello world test ", t0());
        assert_eq!(est.word_count(), 3);
        // 3 words over a 10 second window
        assert_eq!(est.tick(t0() + chrono::Duration::seconds(2)), 18);
    }

    #[test]
    fn trailing_partial_word_is_not_counted() {
        let mut est = RateEstimator::default();
        type_text(&mut est, "hello world test", t0());
        assert_eq!(est.word_count(), 2);
    }

    #[test]
    fn newline_is_a_boundary() {
        let mut est = RateEstimator::default();
        type_text(&mut est, "one\ntwo\n", t0());
        assert_eq!(est.word_count(), 2);
    }

    #[test]
    fn repeated_boundaries_do_not_add_words() {
        let mut est = RateEstimator::default();
        type_text(&mut est, "   a   b  \n\n", t0());
        assert_eq!(est.word_count(), 2);
    }

    #[test]
    fn leading_boundary_is_not_a_word() {
        let mut est = RateEstimator::default();
        type_text(&mut est, " a  b", t0());
        assert_eq!(est.word_count(), 1);
    }

    #[test]
    fn prunes_tokens_older_than_window() {
        let mut est = RateEstimator::default();
        type_text(&mut est, "old ", t0());
        type_text(&mut est, "new ", t0() + chrono::Duration::seconds(8));

        assert_eq!(est.tick(t0() + chrono::Duration::seconds(9)), 12);
        // "old " was typed within the first 400ms
        assert_eq!(est.tick(t0() + chrono::Duration::seconds(11)), 6);
        assert_eq!(est.len(), 4);
        assert_eq!(est.tick(t0() + chrono::Duration::seconds(30)), 0);
        assert!(est.is_empty());
    }

    #[test]
    fn token_exactly_at_window_edge_is_kept() {
        let mut est = RateEstimator::default();
        est.push(KeyToken::new(Symbol::Char('a'), t0()));
        est.prune(t0() + chrono::Duration::seconds(10));
        assert_eq!(est.len(), 1);
        est.prune(t0() + chrono::Duration::milliseconds(10_001));
        assert_eq!(est.len(), 0);
    }

    #[test]
    fn tick_is_idempotent() {
        let mut est = RateEstimator::default();
        type_text(&mut est, "a b c ", t0());
        let now = t0() + chrono::Duration::seconds(5);
        let first = est.tick(now);
        assert_eq!(first, est.tick(now));
        assert_eq!(first, est.tick(now));
    }

    #[test]
    fn custom_window() {
        let mut est = RateEstimator::new(Duration::from_secs(60));
        type_text(&mut est, "a b c d ", t0());
        assert_eq!(est.tick(t0() + chrono::Duration::seconds(1)), 4);
    }

    #[test]
    fn rate_rounds() {
        assert_eq!(rate_for(1, Duration::from_secs(7)), 9);
        assert_eq!(rate_for(0, Duration::from_secs(10)), 0);
        assert_eq!(rate_for(5, Duration::ZERO), 0);
    }
}
