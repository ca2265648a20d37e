use std::time::Duration;

use tempfile::TempDir;

use tarix_wpm::{
    corpus::Corpus,
    events::SharedSink,
    persistence::{Persistence, SETTINGS_KEY, STATS_KEY},
    runtime::ManualClock,
    settings::{Difficulty, Language, Settings},
    store::{FileStore, KeyValueStore, SqliteStore},
    WpmTester,
};

fn tester_on(store: Box<dyn KeyValueStore>, clock: &ManualClock) -> WpmTester {
    WpmTester::new(
        Corpus::builtin().unwrap(),
        Persistence::new(store),
        Box::new(clock.clone()),
        Box::new(SharedSink::new()),
    )
}

fn run_one_session(tester: &mut WpmTester, clock: &ManualClock) {
    assert!(tester.start().unwrap());
    let text: String = tester.passage().unwrap().text.chars().take(12).collect();
    tester.on_input(&text);
    clock.advance(Duration::from_secs(tester.settings().test_duration_secs));
    tester.tick();
}

#[test]
fn settings_survive_a_restart_with_file_store() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new();

    let mut first = tester_on(Box::new(FileStore::with_dir(dir.path())), &clock);
    first
        .apply_settings(Settings {
            test_duration_secs: 30,
            language: Language::En,
            difficulty: Difficulty::Hard,
            ..Settings::default()
        })
        .unwrap();
    drop(first);

    let second = tester_on(Box::new(FileStore::with_dir(dir.path())), &clock);
    assert_eq!(second.settings().test_duration_secs, 30);
    assert_eq!(second.session().total_secs(), 30);
    assert_eq!(second.session().remaining_secs(), 30);
    assert_eq!(second.passage().unwrap().language, Language::En);
    assert!(dir.path().join(format!("{SETTINGS_KEY}.json")).exists());
}

#[test]
fn results_survive_a_restart_with_file_store() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new();

    let mut first = tester_on(Box::new(FileStore::with_dir(dir.path())), &clock);
    first
        .apply_settings(Settings {
            test_duration_secs: 15,
            ..Settings::default()
        })
        .unwrap();
    run_one_session(&mut first, &clock);
    run_one_session(&mut first, &clock);
    let best = first.stats().aggregate.best_wpm;
    drop(first);

    let second = tester_on(Box::new(FileStore::with_dir(dir.path())), &clock);
    assert_eq!(second.stats().aggregate.total_tests, 2);
    assert_eq!(second.stats().history.len(), 2);
    assert_eq!(second.stats().aggregate.best_wpm, best);
    assert!(second.stats().last_updated.is_some());

    let raw = std::fs::read_to_string(dir.path().join(format!("{STATS_KEY}.json"))).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json.get("bestWPM").is_some());
    assert!(json.get("totalTests").is_some());
    assert!(json["history"][0].get("time").is_some());
}

#[test]
fn results_survive_a_restart_with_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("storage.db");
    let clock = ManualClock::new();

    let mut first = tester_on(Box::new(SqliteStore::open(&db).unwrap()), &clock);
    first
        .apply_settings(Settings {
            test_duration_secs: 15,
            sound_enabled: false,
            ..Settings::default()
        })
        .unwrap();
    run_one_session(&mut first, &clock);
    drop(first);

    let second = tester_on(Box::new(SqliteStore::open(&db).unwrap()), &clock);
    assert_eq!(second.settings().test_duration_secs, 15);
    assert!(!second.settings().sound_enabled);
    assert_eq!(second.stats().aggregate.total_tests, 1);
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(format!("{SETTINGS_KEY}.json")), "{not json").unwrap();
    std::fs::write(dir.path().join(format!("{STATS_KEY}.json")), "[]").unwrap();

    let tester = tester_on(Box::new(FileStore::with_dir(dir.path())), &ManualClock::new());
    assert_eq!(tester.settings(), &Settings::default());
    assert_eq!(tester.stats().aggregate.total_tests, 0);
    assert!(!tester.is_storage_degraded());
}

#[test]
fn browser_era_settings_are_read() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(format!("{SETTINGS_KEY}.json")),
        r#"{"testTime":"120","difficulty":"easy","language":"ru","allowBackspace":false,"soundEnabled":true}"#,
    )
    .unwrap();

    let tester = tester_on(Box::new(FileStore::with_dir(dir.path())), &ManualClock::new());
    assert_eq!(tester.settings().test_duration_secs, 120);
    assert_eq!(tester.settings().language, Language::Ru);
    assert_eq!(tester.settings().difficulty, Difficulty::Easy);
    assert!(!tester.settings().allow_backspace);
}
