use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, WpmError};

/// Durations offered by the settings panel, in seconds
pub const DURATION_CHOICES: [u64; 5] = [15, 30, 60, 120, 300];

pub const MAX_DURATION_SECS: u64 = 3600;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Uz,
    En,
    Ru,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Uz, Language::En, Language::Ru];

    /// Name shown in the settings panel
    pub fn label(&self) -> &'static str {
        match self {
            Language::Uz => "Oʻzbekcha",
            Language::En => "English",
            Language::Ru => "Русский",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];
}

/// User preferences, read when a session starts.
///
/// Stored under the `wpmSettings` key. Every field falls back to its default
/// on its own, so a record written by an older build still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(rename = "testTime", deserialize_with = "seconds_from_number_or_text")]
    pub test_duration_secs: u64,
    pub difficulty: Difficulty,
    pub language: Language,
    pub allow_backspace: bool,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            test_duration_secs: 60,
            difficulty: Difficulty::Medium,
            language: Language::Uz,
            allow_backspace: true,
            sound_enabled: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.test_duration_secs == 0 || self.test_duration_secs > MAX_DURATION_SECS {
            return Err(WpmError::invalid_setting(format!(
                "test duration must be between 1 and {MAX_DURATION_SECS} seconds, got {}",
                self.test_duration_secs
            )));
        }
        Ok(())
    }

    /// Next entry of `DURATION_CHOICES`, wrapping around
    pub fn cycle_duration(&mut self, forward: bool) {
        let pos = DURATION_CHOICES
            .iter()
            .position(|&d| d == self.test_duration_secs);
        let len = DURATION_CHOICES.len();
        let next = match (pos, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, _) => 2,
        };
        self.test_duration_secs = DURATION_CHOICES[next];
    }

    pub fn cycle_language(&mut self, forward: bool) {
        self.language = cycle(&Language::ALL, self.language, forward);
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        self.difficulty = cycle(&Difficulty::ALL, self.difficulty, forward);
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let i = all.iter().position(|&x| x == current).unwrap_or(0);
    if forward {
        all[(i + 1) % len]
    } else {
        all[(i + len - 1) % len]
    }
}

// Older records stored the duration as the select box value, e.g. "60".
fn seconds_from_number_or_text<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
