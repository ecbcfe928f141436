use serde::{Deserialize, Serialize};

use super::library::QuestionLibrary;

/// Everything an author saves for one video exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseData {
    /// address of the video stream
    pub video_url: String,

    /// MIME type handed to the player, e.g. `video/mp4`
    pub mime_type: String,

    pub exercise_name: String,

    /// whether learners may seek freely instead of only going back to the start
    pub slider_enabled: bool,

    /// whether each answer is judged right away
    pub instant_response: bool,

    pub library: QuestionLibrary,
}

impl ExerciseData {
    pub fn new(video_url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            mime_type: mime_type.into(),
            ..Self::default()
        }
    }
}
