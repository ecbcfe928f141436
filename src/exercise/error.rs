use std::num::ParseIntError;
use std::str::Utf8Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExerciseError {
    #[error("no question found: {0}")]
    QuestionNotFound(String),

    #[error("answer index {index} is out of range for {len} answers")]
    AnswerOutOfRange { index: usize, len: usize },

    #[error("a question needs at least one correct answer")]
    NoCorrectAnswer,

    #[error("failed to load exercise data")]
    Load(#[from] LoadError),

    #[error("failed to write exercise data")]
    Write(#[source] quick_xml::Error),

    #[error("failed to encode or decode submission")]
    Submission(#[from] serde_json::Error),
}

/// Reasons a saved exercise document cannot be read back.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected root element '{0}'")]
    UnexpectedRoot(String),

    #[error("element '{0}' follows the root element")]
    ExtraRoot(String),

    #[error("question {index} has an invalid time '{value}'")]
    InvalidTime {
        index: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("question {index} has no time element")]
    MissingTime { index: usize },
}
