use serde::{Deserialize, Serialize};

use super::error::ExerciseError;
use super::library::QuestionLibrary;

/// A learner's finished attempt: the exercise questions with the answers
/// that were given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionInfo {
    pub library: QuestionLibrary,
}

impl SubmissionInfo {
    pub fn new(library: QuestionLibrary) -> Self {
        Self { library }
    }

    pub fn score(&self) -> Option<f64> {
        self.library.score()
    }

    /// Score as shown in submission listings, `"0"` for an empty exercise.
    /// Whole scores keep one decimal place (`"1.0"`).
    pub fn points(&self) -> String {
        match self.score() {
            None => String::from("0"),
            Some(score) if score.fract() == 0.0 => format!("{:.1}", score),
            Some(score) => score.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ExerciseError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExerciseError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
