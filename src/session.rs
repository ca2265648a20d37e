use std::time::{Duration, Instant};

use crate::comparator::Comparison;
use crate::util::percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Active,
    Paused,
    /// Time ran out; behaves like `Idle` for the next `start`
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingCounts {
    pub correct: usize,
    pub typed: usize,
    pub errors: usize,
    pub words: usize,
}

impl From<&Comparison> for TypingCounts {
    fn from(c: &Comparison) -> Self {
        Self {
            correct: c.correct,
            typed: c.typed,
            errors: c.errors,
            words: c.words,
        }
    }
}

/// Numbers recorded when a session runs out of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: u32,
    pub words: u32,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not active; nothing changed
    Skipped,
    Running { remaining_secs: u64 },
    Ended(FinalScore),
}

/// One timed typing session.
///
/// Time is passed in by the caller so the session can be driven by any
/// clock. While paused, `elapsed_before_pause` holds the exact active time;
/// resuming backdates `started_at` by that amount so no time is lost or
/// gained across a pause.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    total_secs: u64,
    remaining_secs: u64,
    started_at: Option<Instant>,
    elapsed_before_pause: Duration,
    pub counts: TypingCounts,
}

impl Session {
    pub fn new(total_secs: u64) -> Self {
        Self {
            phase: Phase::Idle,
            total_secs,
            remaining_secs: total_secs,
            started_at: None,
            elapsed_before_pause: Duration::ZERO,
            counts: TypingCounts::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Takes a new duration; ignored while a session is running or paused
    pub fn set_duration(&mut self, total_secs: u64) -> bool {
        if matches!(self.phase, Phase::Active | Phase::Paused) {
            return false;
        }
        self.total_secs = total_secs;
        self.remaining_secs = total_secs;
        true
    }

    /// Idle/Ended → Active with fresh counters, Paused → Active keeping them
    pub fn start(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Idle | Phase::Ended => {
                self.started_at = Some(now);
                self.elapsed_before_pause = Duration::ZERO;
                self.remaining_secs = self.total_secs;
                self.counts = TypingCounts::default();
                self.phase = Phase::Active;
                tracing::debug!(total_secs = self.total_secs, "session started");
                true
            }
            Phase::Paused => self.resume(now),
            Phase::Active => false,
        }
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.elapsed_before_pause = self.elapsed(now);
        self.phase = Phase::Paused;
        tracing::debug!(elapsed = ?self.elapsed_before_pause, "session paused");
        true
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.started_at = Some(now.checked_sub(self.elapsed_before_pause).unwrap_or(now));
        self.phase = Phase::Active;
        tracing::debug!(elapsed = ?self.elapsed_before_pause, "session resumed");
        true
    }

    /// Back to Idle with a full clock and cleared counters
    pub fn restart(&mut self) {
        self.phase = Phase::Idle;
        self.started_at = None;
        self.elapsed_before_pause = Duration::ZERO;
        self.remaining_secs = self.total_secs;
        self.counts = TypingCounts::default();
    }

    pub fn reset_counts(&mut self) {
        self.counts = TypingCounts::default();
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.phase, self.started_at) {
            (Phase::Active, Some(started)) => now.saturating_duration_since(started),
            (Phase::Paused, _) => self.elapsed_before_pause,
            (Phase::Ended, _) => Duration::from_secs(self.total_secs),
            _ => Duration::ZERO,
        }
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.phase != Phase::Active {
            return TickOutcome::Skipped;
        }

        let elapsed_secs = self.elapsed(now).as_secs();
        let remaining = self.total_secs.saturating_sub(elapsed_secs);
        self.remaining_secs = remaining.min(self.remaining_secs);

        if self.remaining_secs == 0 {
            self.phase = Phase::Ended;
            let score = self.final_score();
            tracing::debug!(wpm = score.wpm, accuracy = score.accuracy, "session ended");
            TickOutcome::Ended(score)
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Words per elapsed minute, with elapsed time floored at one second
    pub fn live_wpm(&self, now: Instant) -> u32 {
        let secs = self.elapsed(now).as_secs_f64().max(1.0);
        (self.counts.words as f64 / (secs / 60.0)).round() as u32
    }

    pub fn live_accuracy(&self) -> u32 {
        percent(self.counts.correct, self.counts.typed).unwrap_or(100)
    }

    pub fn final_score(&self) -> FinalScore {
        let minutes = self.total_secs.max(1) as f64 / 60.0;
        FinalScore {
            wpm: (self.counts.words as f64 / minutes).round() as u32,
            accuracy: percent(self.counts.correct, self.counts.typed).unwrap_or(0),
            errors: self.counts.errors as u32,
            words: self.counts.words as u32,
            duration_secs: self.total_secs,
        }
    }

    /// Share of the duration used so far, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (self.total_secs - self.remaining_secs) as f64 / self.total_secs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn new_session_is_idle_with_full_clock() {
        let s = Session::new(60);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.remaining_secs(), 60);
        assert_eq!(s.progress(), 0.0);
        assert_eq!(s.live_accuracy(), 100);
    }

    #[test]
    fn start_only_from_idle_or_paused() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        assert!(s.start(t0));
        assert!(!s.start(t0 + secs(1)));
        assert_eq!(s.started_at(), Some(t0));
    }

    #[test]
    fn pause_only_from_active() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        assert!(!s.pause(t0));
        s.start(t0);
        assert!(s.pause(t0 + secs(2)));
        assert!(!s.pause(t0 + secs(3)));
        assert!(s.resume(t0 + secs(3)));
    }

    #[test]
    fn tick_counts_down_in_whole_seconds() {
        let t0 = Instant::now();
        let mut s = Session::new(10);
        s.start(t0);
        assert_eq!(
            s.tick(t0 + Duration::from_millis(900)),
            TickOutcome::Running { remaining_secs: 10 }
        );
        assert_eq!(
            s.tick(t0 + Duration::from_millis(3_100)),
            TickOutcome::Running { remaining_secs: 7 }
        );
        assert!((s.progress() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn tick_ends_at_zero() {
        let t0 = Instant::now();
        let mut s = Session::new(5);
        s.start(t0);
        s.counts.words = 10;
        match s.tick(t0 + secs(6)) {
            TickOutcome::Ended(score) => {
                assert_eq!(score.wpm, 120);
                assert_eq!(score.duration_secs, 5);
            }
            other => panic!("expected Ended, got {other:?}"),
        }
        assert_eq!(s.phase(), Phase::Ended);
        assert_eq!(s.remaining_secs(), 0);
        assert_eq!(s.tick(t0 + secs(7)), TickOutcome::Skipped);
    }

    #[test]
    fn remaining_frozen_while_paused() {
        let t0 = Instant::now();
        let mut s = Session::new(30);
        s.start(t0);
        s.tick(t0 + secs(4));
        s.pause(t0 + secs(4));
        assert_eq!(s.tick(t0 + secs(20)), TickOutcome::Skipped);
        assert_eq!(s.remaining_secs(), 26);
    }

    #[test]
    fn pause_does_not_leak_time() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        s.start(t0);
        s.pause(t0 + Duration::from_millis(4_500));
        // a long break
        s.resume(t0 + secs(100));
        assert_eq!(
            s.elapsed(t0 + secs(100) + Duration::from_millis(1_500)),
            secs(6)
        );
        assert_eq!(
            s.tick(t0 + secs(102)),
            TickOutcome::Running { remaining_secs: 54 }
        );
    }

    #[test]
    fn resume_via_start() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        s.start(t0);
        s.counts.words = 3;
        s.pause(t0 + secs(5));
        assert!(s.start(t0 + secs(9)));
        assert!(s.is_active());
        // counters survive a pause
        assert_eq!(s.counts.words, 3);
        assert_eq!(s.elapsed(t0 + secs(9)), secs(5));
    }

    #[test]
    fn restart_resets_everything() {
        let t0 = Instant::now();
        let mut s = Session::new(30);
        s.start(t0);
        s.counts.typed = 12;
        s.tick(t0 + secs(10));
        s.restart();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.remaining_secs(), 30);
        assert_eq!(s.counts, TypingCounts::default());
        assert_eq!(s.started_at(), None);
    }

    #[test]
    fn duration_locked_while_running() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        assert!(s.set_duration(30));
        assert_eq!(s.remaining_secs(), 30);
        s.start(t0);
        assert!(!s.set_duration(15));
        assert_eq!(s.total_secs(), 30);
    }

    #[test]
    fn live_wpm_floors_elapsed_at_one_second() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        s.start(t0);
        s.counts.words = 1;
        // 1 word within the first 100ms is treated as 1 word per second
        assert_eq!(s.live_wpm(t0 + Duration::from_millis(100)), 60);
        s.counts.words = 20;
        assert_eq!(s.live_wpm(t0 + secs(30)), 40);
    }

    #[test]
    fn accuracy_live_versus_final() {
        let mut s = Session::new(60);
        assert_eq!(s.live_accuracy(), 100);
        assert_eq!(s.final_score().accuracy, 0);
        s.counts = TypingCounts {
            correct: 2,
            typed: 3,
            errors: 1,
            words: 1,
        };
        assert_eq!(s.live_accuracy(), 67);
        assert_eq!(s.final_score().accuracy, 67);
        assert_eq!(s.final_score().errors, 1);
    }

    #[test]
    fn sixty_words_in_sixty_seconds() {
        let t0 = Instant::now();
        let mut s = Session::new(60);
        s.start(t0);
        s.counts.words = 60;
        assert_eq!(
            s.tick(t0 + secs(60)),
            TickOutcome::Ended(FinalScore {
                wpm: 60,
                accuracy: 0,
                errors: 0,
                words: 60,
                duration_secs: 60,
            })
        );
    }
}
