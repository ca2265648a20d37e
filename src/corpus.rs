use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{Result, WpmError};
use crate::settings::{Difficulty, Language};

static TEXTS_DIR: Dir = include_dir!("src/texts");

/// Passages and source labels for one language, as stored in `src/texts`
#[derive(Deserialize, Clone, Debug)]
pub struct LanguageTexts {
    pub language: Language,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub passages: HashMap<Difficulty, Vec<String>>,
}

/// A text sample the user has to reproduce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub text: String,
    pub source: Option<String>,
    pub language: Language,
    pub difficulty: Difficulty,
}

impl Passage {
    pub fn word_count(&self) -> usize {
        crate::util::count_words(&self.text)
    }
}

/// Static language → difficulty → passages mapping
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    texts: HashMap<Language, LanguageTexts>,
}

impl Corpus {
    /// The corpus compiled into the binary
    pub fn builtin() -> Result<Self> {
        let mut corpus = Corpus::default();
        for file in TEXTS_DIR.files() {
            let raw = file.contents_utf8().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{} is not UTF-8", file.path().display()),
                )
            })?;
            let texts: LanguageTexts = serde_json::from_str(raw)?;
            corpus.insert(texts);
        }
        Ok(corpus)
    }

    pub fn insert(&mut self, texts: LanguageTexts) {
        self.texts.insert(texts.language, texts);
    }

    pub fn passages(&self, language: Language, difficulty: Difficulty) -> &[String] {
        self.texts
            .get(&language)
            .and_then(|t| t.passages.get(&difficulty))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_passages(&self, language: Language, difficulty: Difficulty) -> bool {
        !self.passages(language, difficulty).is_empty()
    }

    pub fn select_passage(&self, language: Language, difficulty: Difficulty) -> Result<Passage> {
        self.select_passage_with(language, difficulty, &mut rand::thread_rng())
    }

    /// Uniform pick among the passages of `language`/`difficulty`
    pub fn select_passage_with<R: Rng + ?Sized>(
        &self,
        language: Language,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Passage> {
        let text = self
            .passages(language, difficulty)
            .choose(rng)
            .ok_or(WpmError::NoPassage {
                language,
                difficulty,
            })?;

        let source = self
            .texts
            .get(&language)
            .and_then(|t| t.sources.choose(rng))
            .cloned();

        Ok(Passage {
            text: text.clone(),
            source,
            language,
            difficulty,
        })
    }
}
