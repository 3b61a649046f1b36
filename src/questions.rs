//! Question bank
//!
//! Questions are loaded once from a JSON list of
//! `{ "question": string, "answer_number": integer }` records. A malformed
//! record, a blank prompt or an empty list fails the whole load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bundled question list used when no external source is configured
const BUILTIN_QUESTIONS: &str = include_str!("../assets/questions.json");

/// A single question and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "answer_number")]
    pub correct_answer: i64,
}

impl Question {
    pub fn new(prompt: impl Into<String>, correct_answer: i64) -> Self {
        Self {
            prompt: prompt.into(),
            correct_answer,
        }
    }
}

/// Immutable set of questions
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already-parsed questions
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, ConfigError> {
        if questions.is_empty() {
            return Err(ConfigError::Empty);
        }
        if let Some(i) = questions.iter().position(|q| q.prompt.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("question {i} has an empty prompt")));
        }
        Ok(Self { questions })
    }

    /// Parse a JSON question list
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::from_questions(questions)
    }

    /// Load questions from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&json)?;
        log::info!("Loaded {} questions from {}", bank.len(), path.display());
        Ok(bank)
    }

    /// The bundled question list
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_QUESTIONS)
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed bank
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
