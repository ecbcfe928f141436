use std::collections::BTreeSet;

use log::info;

use super::data::ExerciseData;
use super::error::ExerciseError;
use super::event::{EventManager, SessionEvent};
use super::library::QuestionLibrary;
use super::question::Question;
use super::submission::SubmissionInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not started yet, or reset.
    Idle,
    /// Playback is running and questions are asked at each pause point.
    Asking,
    /// Every question has been answered.
    Finished,
    /// The attempt was handed in; nothing more is asked.
    Submitted,
}

/// What the question window shows for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// 1-based position of the question in the exercise
    pub number: usize,
    pub time_slot: u32,
    pub text: String,
    /// incorrect answers followed by correct ones, unshuffled
    pub choices: Vec<String>,
}

impl Prompt {
    fn new(index: usize, question: &Question) -> Self {
        Self {
            number: index + 1,
            time_slot: question.time(),
            text: question.text().to_string(),
            choices: question.all_answers().into_iter().map(String::from).collect(),
        }
    }
}

/// Immediate judgement of an answer, given only when the exercise asks for
/// instant response.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub correct: bool,
    pub description: Option<String>,
}

/// Drives one learner through an exercise: the player pauses at every time
/// slot that still has unanswered questions, the questions of that slot are
/// asked one after another, and playback resumes once the slot is done.
#[derive(Debug)]
pub struct ExecutionSession {
    data: ExerciseData,
    pause_points: BTreeSet<u32>,
    asking_enabled: bool,
    state: SessionState,
    current: Option<usize>,
    events: EventManager,
}

impl ExecutionSession {
    pub fn new(data: ExerciseData) -> Self {
        let pause_points = data.library.time_slots().into_iter().collect();
        Self {
            data,
            pause_points,
            asking_enabled: false,
            state: SessionState::Idle,
            current: None,
            events: EventManager::new(),
        }
    }

    pub fn data(&self) -> &ExerciseData {
        &self.data
    }

    pub fn library(&self) -> &QuestionLibrary {
        &self.data.library
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_asking_enabled(&self) -> bool {
        self.asking_enabled
    }

    /// Times at which the player must pause, ascending.
    pub fn pause_points(&self) -> Vec<u32> {
        self.pause_points.iter().copied().collect()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.and_then(|index| self.data.library.get(index).ok())
    }

    /// Starts asking. Returns the first prompt when questions are anchored at
    /// the very start of the video; otherwise the player should just play.
    pub fn start(&mut self) -> Option<Prompt> {
        self.asking_enabled = true;
        self.state = SessionState::Asking;
        self.ask(0)
    }

    /// Called when the player pauses at `time` seconds.
    pub fn on_pause(&mut self, time: f64) -> Option<Prompt> {
        if !self.asking_enabled {
            return None;
        }
        self.ask(time as u32)
    }

    /// Asks the first unanswered question of `time_slot`, if any.
    pub fn ask(&mut self, time_slot: u32) -> Option<Prompt> {
        let (index, question) = self
            .data
            .library
            .iter()
            .enumerate()
            .find(|(_, q)| q.time() == time_slot && !q.is_answered())?;

        self.current = Some(index);
        Some(Prompt::new(index, question))
    }

    /// Records `answers` for the question being asked.
    pub fn submit<I, S>(&mut self, answers: I) -> Result<Option<Feedback>, ExerciseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = self.current.ok_or_else(|| {
            ExerciseError::QuestionNotFound(String::from("no question is being asked"))
        })?;
        self.data.library.record_given_answers(index, answers)?;

        let question = self.data.library.get(index)?;
        let time_slot = question.time();
        let feedback = if self.data.instant_response {
            Some(Feedback {
                correct: question.is_fully_correct(),
                description: question
                    .has_answer_description()
                    .then(|| question.answer_description().to_string()),
            })
        } else {
            None
        };

        self.events.emit(&SessionEvent::QuestionFinished { time_slot });
        Ok(feedback)
    }

    /// Moves on from the current question. Returns the next prompt of the same
    /// time slot, or `None` when the slot is done and playback should resume.
    pub fn next(&mut self) -> Option<Prompt> {
        let index = self.current?;
        let time_slot = self.data.library.get(index).ok()?.time();

        if let Some(next) = self.data.library.next_unanswered_index(index) {
            let question = self.data.library.get(next).ok()?;
            if question.time() == time_slot {
                self.current = Some(next);
                return Some(Prompt::new(next, question));
            }
        }

        self.current = None;
        self.finish_time_slot(time_slot);
        None
    }

    fn finish_time_slot(&mut self, time_slot: u32) {
        self.events.emit(&SessionEvent::TimeSlotFinished { time_slot });

        if !self.data.library.contains_unanswered_in_time_slot(time_slot) {
            self.pause_points.remove(&time_slot);
            info!("time slot {}s finished", time_slot);

            if !self.data.library.contains_unanswered() {
                let questions = self.data.library.len();
                info!("all {} questions are answered", questions);
                self.state = SessionState::Finished;
                self.events.emit(&SessionEvent::ExerciseFinished { questions });
            }
        }
    }

    /// Where the player should seek when the learner picks question `index`
    /// from the timeline. Only allowed while asking on a seekable exercise.
    pub fn seek_target(&self, index: usize) -> Option<u32> {
        if !self.asking_enabled || !self.data.slider_enabled {
            return None;
        }
        self.data.library.get(index).ok().map(Question::time)
    }

    /// Hands in the attempt. Returns the score (`None` for an exercise without
    /// questions) and the submission record.
    pub fn submit_exercise(&mut self) -> (Option<f64>, SubmissionInfo) {
        self.asking_enabled = false;
        self.pause_points.clear();
        self.current = None;
        self.state = SessionState::Submitted;

        let submission = SubmissionInfo::new(self.data.library.clone());
        (submission.score(), submission)
    }

    /// Clears every given answer and rewinds to the initial state.
    pub fn reset(&mut self) {
        self.data.library.reset_given_answers();
        self.pause_points = self.data.library.time_slots().into_iter().collect();
        self.asking_enabled = false;
        self.current = None;
        self.state = SessionState::Idle;
    }
}
