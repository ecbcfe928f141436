use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::error::ExerciseError;

/// Insertion-ordered set of answer strings. Equal strings collapse to the
/// first occurrence.
///
/// Two sets compare equal when they hold the same strings, regardless of order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AnswerSet(Vec<String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds `answer` unless an equal string is already present.
    pub fn insert(&mut self, answer: impl Into<String>) -> bool {
        let answer = answer.into();
        if self.contains(&answer) {
            false
        } else {
            self.0.push(answer);
            true
        }
    }

    pub fn contains(&self, answer: &str) -> bool {
        self.0.iter().any(|a| a == answer)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if every answer in `self` is also in `other`.
    pub fn is_subset(&self, other: &AnswerSet) -> bool {
        self.iter().all(|a| other.contains(a))
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl PartialEq for AnswerSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl Eq for AnswerSet {}

impl Hash for AnswerSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_unstable();
        sorted.hash(state);
    }
}

impl<S: Into<String>> FromIterator<S> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for AnswerSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for answer in iter {
            self.insert(answer);
        }
    }
}

impl From<Vec<String>> for AnswerSet {
    fn from(answers: Vec<String>) -> Self {
        answers.into_iter().collect()
    }
}

impl From<AnswerSet> for Vec<String> {
    fn from(set: AnswerSet) -> Self {
        set.0
    }
}

impl fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// A single multiple-choice question anchored to a point in the video.
///
/// Identity (`PartialEq`, `Hash`) covers the authored content only: time,
/// text, correct and incorrect answers, and the description. The answers a
/// learner gave are excluded, so recording an answer never changes which
/// question this is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord")]
pub struct Question {
    /// seconds from the start of the video
    time: u32,

    /// prompt shown to the learner
    text: String,

    correct_answers: AnswerSet,

    incorrect_answers: AnswerSet,

    /// explanation shown after answering, empty when there is none
    answer_description: String,

    given_answers: AnswerSet,
}

/// Decoded form of a [`Question`], checked before it becomes one.
#[derive(Deserialize)]
struct QuestionRecord {
    time: u32,
    text: String,
    correct_answers: AnswerSet,
    incorrect_answers: AnswerSet,
    #[serde(default)]
    answer_description: String,
    #[serde(default)]
    given_answers: AnswerSet,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = ExerciseError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        if record.correct_answers.is_empty() {
            return Err(ExerciseError::NoCorrectAnswer);
        }

        Ok(Self {
            time: record.time,
            text: record.text,
            correct_answers: record.correct_answers,
            incorrect_answers: record.incorrect_answers,
            answer_description: record.answer_description,
            given_answers: record.given_answers,
        })
    }
}

impl Question {
    /// Creates a question with a single correct answer.
    pub fn new<I, S>(
        time: u32,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: I,
        answer_description: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut correct_answers = AnswerSet::new();
        correct_answers.insert(correct_answer);

        Self {
            time,
            text: text.into(),
            correct_answers,
            incorrect_answers: incorrect_answers.into_iter().collect(),
            answer_description: answer_description.into(),
            given_answers: AnswerSet::new(),
        }
    }

    /// Creates a question that accepts several correct answers. Fails when
    /// `correct_answers` is empty.
    pub fn with_correct_answers<C, CS, I, IS>(
        time: u32,
        text: impl Into<String>,
        correct_answers: C,
        incorrect_answers: I,
        answer_description: impl Into<String>,
    ) -> Result<Self, ExerciseError>
    where
        C: IntoIterator<Item = CS>,
        CS: Into<String>,
        I: IntoIterator<Item = IS>,
        IS: Into<String>,
    {
        let correct_answers: AnswerSet = correct_answers.into_iter().collect();
        if correct_answers.is_empty() {
            return Err(ExerciseError::NoCorrectAnswer);
        }

        Ok(Self {
            time,
            text: text.into(),
            correct_answers,
            incorrect_answers: incorrect_answers.into_iter().collect(),
            answer_description: answer_description.into(),
            given_answers: AnswerSet::new(),
        })
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn set_time(&mut self, time: u32) {
        self.time = time;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn correct_answers(&self) -> &AnswerSet {
        &self.correct_answers
    }

    pub fn correct_answer(&self, index: usize) -> Result<&str, ExerciseError> {
        self.correct_answers
            .get(index)
            .ok_or(ExerciseError::AnswerOutOfRange {
                index,
                len: self.correct_answers.len(),
            })
    }

    pub fn incorrect_answers(&self) -> &AnswerSet {
        &self.incorrect_answers
    }

    pub fn incorrect_answer(&self, index: usize) -> Result<&str, ExerciseError> {
        self.incorrect_answers
            .get(index)
            .ok_or(ExerciseError::AnswerOutOfRange {
                index,
                len: self.incorrect_answers.len(),
            })
    }

    /// Incorrect answers followed by correct answers, the choices a prompt
    /// offers before shuffling.
    pub fn all_answers(&self) -> Vec<&str> {
        self.incorrect_answers
            .iter()
            .chain(self.correct_answers.iter())
            .collect()
    }

    /// Replaces every correct answer with `answer`.
    pub fn set_correct_answer(&mut self, answer: impl Into<String>) {
        self.correct_answers.clear();
        self.correct_answers.insert(answer);
    }

    /// Replaces every correct answer. An empty collection is refused and
    /// leaves the question untouched.
    pub fn set_correct_answers<I, S>(&mut self, answers: I) -> Result<(), ExerciseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let answers: AnswerSet = answers.into_iter().collect();
        if answers.is_empty() {
            return Err(ExerciseError::NoCorrectAnswer);
        }
        self.correct_answers = answers;
        Ok(())
    }

    /// Replaces every incorrect answer with `answer`.
    pub fn set_incorrect_answer(&mut self, answer: impl Into<String>) {
        self.incorrect_answers.clear();
        self.incorrect_answers.insert(answer);
    }

    pub fn set_incorrect_answers<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.incorrect_answers = answers.into_iter().collect();
    }

    pub fn answer_description(&self) -> &str {
        &self.answer_description
    }

    pub fn set_answer_description(&mut self, description: impl Into<String>) {
        self.answer_description = description.into();
    }

    pub fn has_answer_description(&self) -> bool {
        !self.answer_description.is_empty()
    }

    pub fn given_answers(&self) -> &AnswerSet {
        &self.given_answers
    }

    /// Replaces the given answers with the single `answer`.
    pub fn record_given_answer(&mut self, answer: impl Into<String>) {
        self.given_answers.clear();
        self.given_answers.insert(answer);
    }

    /// Replaces the given answers with `answers`.
    pub fn record_given_answers<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.given_answers = answers.into_iter().collect();
    }

    pub fn is_answered(&self) -> bool {
        !self.given_answers.is_empty()
    }

    /// Returns `true` if every given answer is a correct one. Leaving out some
    /// of several correct answers still counts, and so does giving none.
    pub fn is_fully_correct(&self) -> bool {
        self.given_answers.is_subset(&self.correct_answers)
    }

    /// Fraction of the correct answers that were given, in `[0, 1]`.
    pub fn score(&self) -> f64 {
        if self.correct_answers.is_empty() {
            return 0.0;
        }

        let matched = self
            .given_answers
            .iter()
            .filter(|a| self.correct_answers.contains(a))
            .count();
        matched as f64 / self.correct_answers.len() as f64
    }

    pub fn reset_given_answers(&mut self) {
        self.given_answers.clear();
    }
}

impl Default for Question {
    fn default() -> Self {
        Self::new(0, "", "", [""], "")
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
            && self.text == other.text
            && self.correct_answers == other.correct_answers
            && self.incorrect_answers == other.incorrect_answers
            && self.answer_description == other.answer_description
    }
}

impl Eq for Question {}

impl Hash for Question {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.time.hash(state);
        self.text.hash(state);
        self.correct_answers.hash(state);
        self.incorrect_answers.hash(state);
        self.answer_description.hash(state);
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Question [time={}s, question={}, correctAnswers={}, incorrectAnswers={}, answerDescription={}, answered={}]",
            self.time,
            self.text,
            self.correct_answers,
            self.incorrect_answers,
            self.answer_description,
            self.given_answers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_correct() -> Question {
        Question::with_correct_answers(5, "Pick the vowels", ["A", "B"], ["C"], "").unwrap()
    }

    #[test]
    fn answer_sets_collapse_duplicates_and_keep_order() {
        let set: AnswerSet = ["b", "a", "b", "c"].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn answer_sets_compare_without_order() {
        let left: AnswerSet = ["a", "b"].into_iter().collect();
        let right: AnswerSet = ["b", "a"].into_iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn default_question_seeds_placeholders() {
        let q = Question::default();
        assert_eq!(q.correct_answer(0).unwrap(), "");
        assert_eq!(q.incorrect_answer(0).unwrap(), "");
        assert!(!q.is_answered());
    }

    #[test]
    fn empty_correct_answers_are_refused() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            Question::with_correct_answers(1, "q", empty, ["x"], ""),
            Err(ExerciseError::NoCorrectAnswer)
        ));

        let mut q = Question::new(1, "q", "a", ["x"], "");
        assert!(q.set_correct_answers(empty).is_err());
        assert_eq!(q.correct_answer(0).unwrap(), "a");
    }

    #[test]
    fn positional_access_out_of_range() {
        let q = Question::new(1, "q", "a", ["x"], "");
        assert!(matches!(
            q.incorrect_answer(3),
            Err(ExerciseError::AnswerOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn single_value_setters_replace() {
        let mut q = two_correct();
        q.set_correct_answer("Z");
        q.set_incorrect_answer("Y");
        assert_eq!(q.correct_answers().len(), 1);
        assert_eq!(q.incorrect_answers().iter().collect::<Vec<_>>(), vec!["Y"]);
    }

    #[test]
    fn partial_multi_select_scores_half() {
        let mut q = two_correct();
        q.record_given_answer("A");
        assert_eq!(q.score(), 0.5);
        assert!(q.is_fully_correct());

        q.record_given_answers(["A", "C"]);
        assert_eq!(q.score(), 0.5);
        assert!(!q.is_fully_correct());

        q.record_given_answers(["B", "A"]);
        assert_eq!(q.score(), 1.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut q = two_correct();
        q.record_given_answer("A");
        assert!(q.is_answered());
        q.reset_given_answers();
        q.reset_given_answers();
        assert!(!q.is_answered());
        assert_eq!(q.score(), 0.0);
    }

    #[test]
    fn given_answers_do_not_change_identity() {
        let q = two_correct();
        let mut answered = q.clone();
        answered.record_given_answer("A");
        assert_eq!(q, answered);
    }

    #[test]
    fn all_answers_lists_incorrect_first() {
        let q = Question::new(1, "q", "right", ["w1", "w2"], "");
        assert_eq!(q.all_answers(), vec!["w1", "w2", "right"]);
    }
}
