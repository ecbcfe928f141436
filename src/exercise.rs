mod data;
mod error;
mod event;
mod frontmatter;
mod library;
mod question;
mod session;
mod submission;
mod time;
mod url;
mod xml;

pub use data::ExerciseData;
pub use error::{ExerciseError, LoadError};
pub use event::{EventKind, EventManager, Listener, ListenerId, SessionEvent};
pub use frontmatter::{exercise_slug, serialize_exercise, Frontmatter, QuestionMeta};
pub use library::QuestionLibrary;
pub use question::{AnswerSet, Question};
pub use session::{ExecutionSession, Feedback, Prompt, SessionState};
pub use submission::SubmissionInfo;
pub use time::{format_time, TimeParts};
pub use url::{mime_type_for, validate_video_url, VideoUrlError};
pub use xml::{load_exercise, save_exercise};
