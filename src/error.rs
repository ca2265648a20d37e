//! Error types for the typing engine

use thiserror::Error;

use crate::settings::{Difficulty, Language};

pub type Result<T> = std::result::Result<T, WpmError>;

#[derive(Error, Debug)]
pub enum WpmError {
    #[error("no passage available for {language}/{difficulty}")]
    NoPassage {
        language: Language,
        difficulty: Difficulty,
    },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl WpmError {
    pub fn invalid_setting<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSetting(msg.into())
    }
}
