use chrono::{Local, Utc};
use std::collections::VecDeque;

use crate::comparator::{compare, keystroke_allowed, CharClass, Comparison, Keystroke};
use crate::corpus::{Corpus, Passage};
use crate::error::Result;
use crate::events::{Severity, UiEvent, UiSink};
use crate::persistence::Persistence;
use crate::runtime::{Clock, TickTimer};
use crate::session::{FinalScore, Phase, Session, TickOutcome};
use crate::settings::{Difficulty, Language, Settings};
use crate::sound::SoundEvent;
use crate::stats::{StatsRecord, TestResult};

/// A live sample is taken every this many elapsed seconds
pub const LIVE_SAMPLE_EVERY_SECS: u64 = 5;
pub const LIVE_SAMPLE_CAP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSample {
    pub elapsed_secs: u64,
    pub wpm: u32,
    pub accuracy: u32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub live_wpm: u32,
    pub live_accuracy: u32,
    pub errors: usize,
    pub typed_chars: usize,
    pub words: usize,
    pub classes: Vec<CharClass>,
    pub cursor: usize,
    pub progress: f64,
    /// `None` when no passage exists for the current language/difficulty
    pub passage_text: Option<String>,
    pub passage_source: Option<String>,
}

/// What happened to a key press before it reached the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Apply the key to the input as usual
    Forward,
    /// Dropped; nothing changed
    Suppressed,
    /// The key started a session instead of being typed
    Started,
}

/// The typing widget: settings, the current session, passage, records and
/// the timer, owned by the host.
///
/// Outgoing notices, modals and sounds go to the injected [`UiSink`]; the
/// host renders [`WpmTester::snapshot`] after each event.
pub struct WpmTester {
    settings: Settings,
    session: Session,
    corpus: Corpus,
    passage: Option<Passage>,
    typed: String,
    comparison: Comparison,
    stats: StatsRecord,
    persistence: Persistence,
    timer: TickTimer,
    clock: Box<dyn Clock>,
    sink: Box<dyn UiSink>,
    live_samples: VecDeque<LiveSample>,
    last_sample_secs: Option<u64>,
    last_result: Option<TestResult>,
    passages_completed: u32,
}

impl WpmTester {
    pub fn new(
        corpus: Corpus,
        persistence: Persistence,
        clock: Box<dyn Clock>,
        sink: Box<dyn UiSink>,
    ) -> Self {
        let settings = persistence.load_settings();
        let stats = persistence.load_stats();
        tracing::info!(
            language = %settings.language,
            difficulty = %settings.difficulty,
            duration = settings.test_duration_secs,
            history = stats.history.len(),
            "typing tester ready"
        );

        let mut tester = Self {
            session: Session::new(settings.test_duration_secs),
            settings,
            corpus,
            passage: None,
            typed: String::new(),
            comparison: Comparison::default(),
            stats,
            persistence,
            timer: TickTimer::default(),
            clock,
            sink,
            live_samples: VecDeque::new(),
            last_sample_secs: None,
            last_result: None,
            passages_completed: 0,
        };
        // a missing passage is reported through the sink
        let _ = tester.new_text();
        tester
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &StatsRecord {
        &self.stats
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn passage(&self) -> Option<&Passage> {
        self.passage.as_ref()
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn last_result(&self) -> Option<&TestResult> {
        self.last_result.as_ref()
    }

    pub fn live_samples(&self) -> impl Iterator<Item = &LiveSample> + '_ {
        self.live_samples.iter()
    }

    pub fn passages_completed(&self) -> u32 {
        self.passages_completed
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    pub fn is_storage_degraded(&self) -> bool {
        self.persistence.is_degraded()
    }

    /// Whether a combination has any text, for marking empty choices
    pub fn has_passages(&self, language: Language, difficulty: Difficulty) -> bool {
        self.corpus.has_passages(language, difficulty)
    }

    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now();
        Snapshot {
            phase: self.session.phase(),
            remaining_secs: self.session.remaining_secs(),
            total_secs: self.session.total_secs(),
            live_wpm: self.session.live_wpm(now),
            live_accuracy: self.session.live_accuracy(),
            errors: self.session.counts.errors,
            typed_chars: self.session.counts.typed,
            words: self.session.counts.words,
            classes: self.comparison.classes.clone(),
            cursor: self.comparison.cursor(),
            progress: self.session.progress(),
            passage_text: self.passage.as_ref().map(|p| p.text.clone()),
            passage_source: self.passage.as_ref().and_then(|p| p.source.clone()),
        }
    }

    /// Starts from Idle/Ended, or resumes from Paused.
    ///
    /// Returns `Ok(false)` when a session is already running.
    pub fn start(&mut self) -> Result<bool> {
        if self.session.is_paused() {
            return Ok(self.resume());
        }
        if self.session.is_active() {
            return Ok(false);
        }
        if self.passage.is_none() {
            self.new_text()?;
        }

        self.session.set_duration(self.settings.test_duration_secs);
        let now = self.clock.now();
        if !self.session.start(now) {
            return Ok(false);
        }
        self.typed.clear();
        self.reset_comparison();
        self.live_samples.clear();
        self.last_sample_secs = None;
        self.last_result = None;
        self.passages_completed = 0;
        self.timer.arm();
        self.play(SoundEvent::Start);
        Ok(true)
    }

    pub fn pause(&mut self) -> bool {
        if !self.session.pause(self.clock.now()) {
            return false;
        }
        self.timer.cancel();
        self.play(SoundEvent::Pause);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.session.resume(self.clock.now()) {
            return false;
        }
        self.timer.arm();
        self.play(SoundEvent::Resume);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.session.phase() {
            Phase::Active => self.pause(),
            Phase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Back to Idle on the same passage with a full clock
    pub fn restart(&mut self) {
        self.timer.cancel();
        self.session.restart();
        self.session.set_duration(self.settings.test_duration_secs);
        self.typed.clear();
        self.reset_comparison();
        self.live_samples.clear();
        self.last_sample_secs = None;
        self.last_result = None;
        self.play(SoundEvent::Restart);
    }

    /// Picks a fresh passage for the current language and difficulty.
    ///
    /// The session keeps running; only the text and typing counters reset.
    pub fn new_text(&mut self) -> Result<()> {
        let language = self.settings.language;
        let difficulty = self.settings.difficulty;
        match self.corpus.select_passage(language, difficulty) {
            Ok(passage) => {
                tracing::debug!(
                    %language,
                    %difficulty,
                    words = passage.word_count(),
                    "new passage"
                );
                self.passage = Some(passage);
                self.typed.clear();
                self.reset_comparison();
                self.session.reset_counts();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.passage = None;
                self.typed.clear();
                self.comparison = Comparison::default();
                self.session.reset_counts();
                self.notify(
                    format!("Matn topilmadi: {language}/{difficulty}"),
                    Severity::Warning,
                );
                Err(e)
            }
        }
    }

    /// Replaces the typed text and re-scores it against the passage
    pub fn on_input(&mut self, text: &str) {
        if !self.session.is_active() {
            return;
        }
        let Some(passage) = self.passage.as_ref() else {
            return;
        };

        self.typed.clear();
        self.typed.push_str(text);
        self.comparison = compare(&passage.text, &self.typed);
        self.session.counts = (&self.comparison).into();

        if self.comparison.matches_target {
            self.passages_completed += 1;
            tracing::debug!(completed = self.passages_completed, "passage finished");
            // errors are reported through the sink
            let _ = self.new_text();
        }
    }

    /// Key filter run before a key changes the text
    pub fn on_key(&mut self, key: Keystroke) -> KeyOutcome {
        if !keystroke_allowed(key, self.settings.allow_backspace) {
            self.notify("Backspace oʻchirilgan!", Severity::Warning);
            self.play(SoundEvent::Error);
            return KeyOutcome::Suppressed;
        }

        match (key, self.session.phase()) {
            (Keystroke::Char(' '), Phase::Idle | Phase::Ended) => match self.start() {
                Ok(true) => KeyOutcome::Started,
                _ => KeyOutcome::Suppressed,
            },
            _ => KeyOutcome::Forward,
        }
    }

    /// Filters the key, then applies it to the typed text
    pub fn press(&mut self, key: Keystroke) -> KeyOutcome {
        let outcome = self.on_key(key);
        if outcome == KeyOutcome::Forward {
            match key {
                Keystroke::Char(c) => self.type_char(c),
                Keystroke::Backspace => self.backspace(),
            }
        }
        outcome
    }

    pub fn type_char(&mut self, c: char) {
        let mut text = self.typed.clone();
        text.push(c);
        self.on_input(&text);
    }

    pub fn backspace(&mut self) {
        let mut text = self.typed.clone();
        if text.pop().is_some() {
            self.on_input(&text);
        }
    }

    /// Timer callback; ignored unless the timer is armed
    pub fn tick(&mut self) -> TickOutcome {
        if !self.timer.is_armed() {
            return TickOutcome::Skipped;
        }
        let now = self.clock.now();
        let outcome = self.session.tick(now);
        match outcome {
            TickOutcome::Running { .. } => self.sample(now),
            TickOutcome::Ended(score) => self.finish(score),
            TickOutcome::Skipped => {}
        }
        outcome
    }

    /// Validates, persists and adopts new settings.
    ///
    /// A running session keeps its duration; everything applies from the
    /// next start.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        if let Err(e) = settings.validate() {
            self.notify(e.to_string(), Severity::Error);
            return Err(e);
        }

        self.persistence.save_settings(&settings);
        self.check_storage();
        let text_changed = settings.language != self.settings.language
            || settings.difficulty != self.settings.difficulty;
        self.settings = settings;
        tracing::info!(settings = ?self.settings, "settings applied");

        let running = matches!(self.session.phase(), Phase::Active | Phase::Paused);
        if !running {
            self.session.set_duration(self.settings.test_duration_secs);
        }
        if !running || text_changed {
            // the notice for a missing passage is already out
            let _ = self.new_text();
        }
        self.notify("Sozlamalar saqlandi!", Severity::Success);
        Ok(())
    }

    /// Emits the leaderboard as a modal
    pub fn show_leaderboard(&mut self) {
        let lines = self
            .stats
            .leaderboard()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let medal = match i {
                    0 => "🥇",
                    1 => "🥈",
                    2 => "🥉",
                    _ => "🏅",
                };
                format!(
                    "{medal} {} WPM ({}% aniqlik) {}",
                    r.wpm,
                    r.accuracy,
                    r.timestamp.with_timezone(&Local).format("%d.%m.%Y")
                )
            })
            .collect::<Vec<String>>();

        let lines = if lines.is_empty() {
            vec!["Hali natijalar yoʻq".to_string()]
        } else {
            lines
        };
        self.sink.emit(UiEvent::Modal {
            title: "Reyting jadvali".to_string(),
            lines,
        });
    }

    fn finish(&mut self, score: FinalScore) {
        self.timer.cancel();

        let result = TestResult {
            wpm: score.wpm,
            accuracy: score.accuracy,
            errors: score.errors,
            duration_secs: score.duration_secs,
            timestamp: Utc::now(),
            language: self.settings.language,
            difficulty: self.settings.difficulty,
        };
        let outcome = self.stats.record(result.clone(), score.words);
        if outcome.new_best {
            self.notify(
                format!("Yangi rekord: {} WPM! 🎉", score.wpm),
                Severity::Success,
            );
            self.play(SoundEvent::Record);
        }
        self.persistence.save_stats(&mut self.stats);
        self.check_storage();

        tracing::info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            errors = result.errors,
            new_best = outcome.new_best,
            "test completed"
        );
        self.last_result = Some(result);
        self.play(SoundEvent::Complete);

        // ready for the next round; a missing passage is already reported
        let _ = self.new_text();
    }

    fn sample(&mut self, now: std::time::Instant) {
        let elapsed_secs = self.session.elapsed(now).as_secs();
        if elapsed_secs % LIVE_SAMPLE_EVERY_SECS != 0 || self.last_sample_secs == Some(elapsed_secs)
        {
            return;
        }
        self.last_sample_secs = Some(elapsed_secs);
        self.live_samples.push_back(LiveSample {
            elapsed_secs,
            wpm: self.session.live_wpm(now),
            accuracy: self.session.live_accuracy(),
        });
        while self.live_samples.len() > LIVE_SAMPLE_CAP {
            self.live_samples.pop_front();
        }
    }

    fn reset_comparison(&mut self) {
        self.comparison = match &self.passage {
            Some(p) => Comparison::untyped(&p.text),
            None => Comparison::default(),
        };
    }

    fn check_storage(&mut self) {
        if self.persistence.take_degradation_warning() {
            self.notify(
                "Natijalarni saqlab boʻlmadi, ular faqat shu seans davomida saqlanadi",
                Severity::Warning,
            );
        }
    }

    fn notify<S: Into<String>>(&mut self, message: S, severity: Severity) {
        self.sink.emit(UiEvent::notify(message, severity));
    }

    fn play(&mut self, sound: SoundEvent) {
        if self.settings.sound_enabled {
            self.sink.emit(UiEvent::Sound(sound));
        }
    }
}

impl std::fmt::Debug for WpmTester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WpmTester")
            .field("settings", &self.settings)
            .field("session", &self.session)
            .field("passage", &self.passage)
            .field("typed", &self.typed)
            .finish_non_exhaustive()
    }
}
