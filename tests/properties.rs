use std::time::{Duration, Instant};

use chrono::Utc;
use proptest::prelude::*;

use tarix_wpm::{
    comparator::{compare, CharClass},
    persistence::Persistence,
    session::{Session, TickOutcome},
    settings::{Difficulty, Language, Settings, MAX_DURATION_SECS},
    stats::{StatsRecord, TestResult, HISTORY_CAP, LEADERBOARD_SIZE},
    util::percent,
};

#[derive(Debug, Clone)]
enum Step {
    Advance(u64),
    Pause,
    Resume,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u64..5_000).prop_map(Step::Advance),
        Just(Step::Pause),
        Just(Step::Resume),
    ]
}

fn result(wpm: u32) -> TestResult {
    TestResult {
        wpm,
        accuracy: 90,
        errors: 1,
        duration_secs: 60,
        timestamp: Utc::now(),
        language: Language::Uz,
        difficulty: Difficulty::Medium,
    }
}

fn any_settings() -> impl Strategy<Value = Settings> {
    (
        1..=MAX_DURATION_SECS,
        prop::sample::select(Difficulty::ALL.to_vec()),
        prop::sample::select(Language::ALL.to_vec()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(test_duration_secs, difficulty, language, allow_backspace, sound_enabled)| Settings {
                test_duration_secs,
                difficulty,
                language,
                allow_backspace,
                sound_enabled,
            },
        )
}

proptest! {
    #[test]
    fn saved_settings_load_back(settings in any_settings()) {
        let mut p = Persistence::in_memory();
        p.save_settings(&settings);
        prop_assert_eq!(p.load_settings(), settings);
        prop_assert!(!p.is_degraded());
    }

    #[test]
    fn pause_keeps_elapsed_time(
        before_ms in 0u64..100_000,
        paused_ms in 0u64..10_000_000,
        after_ms in 0u64..100_000,
    ) {
        let start = Instant::now();
        let mut s = Session::new(3600);
        s.start(start);

        let paused_at = start + Duration::from_millis(before_ms);
        prop_assert!(s.pause(paused_at));
        let before = s.elapsed(paused_at);
        prop_assert_eq!(before, Duration::from_millis(before_ms));

        let resumed_at = paused_at + Duration::from_millis(paused_ms);
        prop_assert_eq!(s.elapsed(resumed_at), before);
        prop_assert!(s.resume(resumed_at));

        let d = Duration::from_millis(after_ms);
        prop_assert_eq!(s.elapsed(resumed_at + d), before + d);
    }

    #[test]
    fn comparison_counts_add_up(target in "[a-c ]{0,20}", typed in "[a-d ]{0,25}") {
        let c = compare(&target, &typed);
        prop_assert_eq!(c.classes.len(), target.chars().count());
        prop_assert_eq!(c.correct + c.errors, typed.chars().count());
        prop_assert_eq!(c.typed, typed.chars().count());
        let correct = c.classes.iter().filter(|&&k| k == CharClass::Correct).count();
        prop_assert_eq!(correct, c.correct);
        prop_assert_eq!(c.matches_target, target == typed);
    }

    #[test]
    fn remaining_never_grows(steps in prop::collection::vec(step(), 0..40), total in 1u64..120) {
        let origin = Instant::now();
        let mut now = origin;
        let mut s = Session::new(total);
        s.start(now);
        let mut last = s.remaining_secs();

        for st in steps {
            match st {
                Step::Advance(ms) => now += Duration::from_millis(ms),
                Step::Pause => { s.pause(now); }
                Step::Resume => { s.resume(now); }
            }
            if let TickOutcome::Ended(score) = s.tick(now) {
                prop_assert_eq!(score.duration_secs, total);
                prop_assert_eq!(s.remaining_secs(), 0);
                break;
            }
            prop_assert!(s.remaining_secs() <= last);
            prop_assert!(s.remaining_secs() <= total);
            last = s.remaining_secs();
        }
    }

    #[test]
    fn history_keeps_the_newest(wpms in prop::collection::vec(0u32..200, 0..120)) {
        let mut stats = StatsRecord::default();
        for &w in &wpms {
            stats.record(result(w), 10);
        }
        prop_assert_eq!(stats.history.len(), wpms.len().min(HISTORY_CAP));
        prop_assert_eq!(stats.aggregate.total_tests, wpms.len() as u64);
        prop_assert_eq!(stats.aggregate.best_wpm, wpms.iter().copied().max().unwrap_or(0));
        if let Some(&newest) = wpms.last() {
            prop_assert_eq!(stats.history.last().map(|r| r.wpm), Some(newest));
        }

        let board = stats.leaderboard();
        prop_assert!(board.len() <= LEADERBOARD_SIZE);
        prop_assert!(board.windows(2).all(|w| w[0].wpm >= w[1].wpm));
    }

    #[test]
    fn percent_is_bounded(whole in 1usize..10_000, frac in 0.0f64..=1.0) {
        let part = ((whole as f64) * frac) as usize;
        let p = percent(part, whole).unwrap();
        prop_assert!(p <= 100);
    }

    #[test]
    fn duration_cycle_is_reversible(start in 0usize..5) {
        let mut s = Settings::default();
        for _ in 0..start {
            s.cycle_duration(true);
        }
        let before = s.test_duration_secs;
        s.cycle_duration(true);
        s.cycle_duration(false);
        prop_assert_eq!(s.test_duration_secs, before);
        prop_assert!(s.validate().is_ok());
    }
}
