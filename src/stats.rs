use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;

use crate::error::Result;
use crate::settings::{Difficulty, Language};
use crate::util::mean;

/// Most recent results kept in the stats record
pub const HISTORY_CAP: usize = 50;
pub const LEADERBOARD_SIZE: usize = 10;
/// Results plotted on the history chart
pub const RECENT_CHART_SIZE: usize = 10;

/// Summary of one completed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: u32,
    #[serde(rename = "duration", default)]
    pub duration_secs: u64,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    pub language: Language,
    pub difficulty: Difficulty,
}

/// Colour band for a result, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    Beginner,
}

impl PerformanceTier {
    pub fn for_wpm(wpm: u32) -> Self {
        match wpm {
            w if w >= 80 => PerformanceTier::Excellent,
            w if w >= 60 => PerformanceTier::Good,
            w if w >= 40 => PerformanceTier::Average,
            _ => PerformanceTier::Beginner,
        }
    }
}

/// Insertion-ordered results, oldest evicted once `HISTORY_CAP` is exceeded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TestResult>", into = "Vec<TestResult>")]
pub struct History {
    entries: VecDeque<TestResult>,
}

impl History {
    pub fn push(&mut self, result: TestResult) {
        self.entries.push_back(result);
        while self.entries.len() > HISTORY_CAP {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TestResult> + ExactSizeIterator + '_ {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TestResult> {
        self.entries.back()
    }
}

impl From<Vec<TestResult>> for History {
    fn from(results: Vec<TestResult>) -> Self {
        let skip = results.len().saturating_sub(HISTORY_CAP);
        Self {
            entries: results.into_iter().skip(skip).collect(),
        }
    }
}

impl From<History> for Vec<TestResult> {
    fn from(history: History) -> Self {
        history.entries.into_iter().collect()
    }
}

/// Running totals; every field only ever grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateStats {
    #[serde(rename = "bestWPM")]
    pub best_wpm: u32,
    #[serde(rename = "totalTests")]
    pub total_tests: u64,
    #[serde(rename = "totalWordsTyped")]
    pub total_words_typed: u64,
}

/// The `wpmStats` record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsRecord {
    pub history: History,
    #[serde(flatten)]
    pub aggregate: AggregateStats,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    pub new_best: bool,
}

impl StatsRecord {
    /// Folds a completed session into history and totals
    pub fn record(&mut self, result: TestResult, words_typed: u32) -> RecordOutcome {
        let new_best = result.wpm > self.aggregate.best_wpm;
        if new_best {
            self.aggregate.best_wpm = result.wpm;
        }
        self.aggregate.total_tests += 1;
        self.aggregate.total_words_typed += u64::from(words_typed);
        self.history.push(result);

        RecordOutcome { new_best }
    }

    pub fn average_wpm(&self) -> u32 {
        self.average_of(|r| r.wpm)
    }

    pub fn average_accuracy(&self) -> u32 {
        self.average_of(|r| r.accuracy)
    }

    fn average_of(&self, field: impl Fn(&TestResult) -> u32) -> u32 {
        let values = self
            .history
            .iter()
            .map(|r| f64::from(field(r)))
            .collect::<Vec<f64>>();
        mean(&values).map_or(0, |m| m.round() as u32)
    }

    /// Best results by WPM; equal scores keep their history order
    pub fn leaderboard(&self) -> Vec<&TestResult> {
        self.history
            .iter()
            .sorted_by(|a, b| b.wpm.cmp(&a.wpm))
            .take(LEADERBOARD_SIZE)
            .collect()
    }

    /// WPM of the latest results, oldest first
    pub fn recent_wpm(&self) -> Vec<u32> {
        let skip = self.history.len().saturating_sub(RECENT_CHART_SIZE);
        self.history.iter().skip(skip).map(|r| r.wpm).collect()
    }
}

/// Writes the history as CSV with a header row
pub fn export_history_csv<W: Write>(history: &History, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in history.iter() {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}
