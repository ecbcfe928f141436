use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::ExerciseError;
use super::question::Question;

/// All questions of a video exercise, grouped by time slot.
///
/// Questions iterate in ascending time, and in insertion order within a time
/// slot. The library never holds two equal questions and never keeps an
/// empty time slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Question>", into = "Vec<Question>")]
pub struct QuestionLibrary {
    slots: BTreeMap<u32, Vec<Question>>,
}

impl QuestionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a library from `questions`, dropping duplicates.
    pub fn from_questions<I>(questions: I) -> Self
    where
        I: IntoIterator<Item = Question>,
    {
        let mut library = Self::new();
        library.add_all(questions);
        library
    }

    /// Adds `question` to its time slot. Returns `false` and leaves the
    /// library unchanged when an equal question is already present.
    pub fn add(&mut self, question: Question) -> bool {
        let slot = self.slots.entry(question.time()).or_default();
        if slot.contains(&question) {
            debug!("refusing duplicate question at {}s", question.time());
            false
        } else {
            slot.push(question);
            true
        }
    }

    pub fn add_all<I>(&mut self, questions: I)
    where
        I: IntoIterator<Item = Question>,
    {
        for question in questions {
            self.add(question);
        }
    }

    /// Replaces `old` with `new`.
    ///
    /// When both share a time slot, `new` takes the position `old` had.
    /// Otherwise `old` is removed and `new` is appended to its own slot.
    /// Returns `Ok(false)` without touching the library when `new` equals some
    /// other question already present.
    pub fn replace(&mut self, old: &Question, new: Question) -> Result<bool, ExerciseError> {
        let position = self
            .slots
            .get(&old.time())
            .and_then(|slot| slot.iter().position(|q| q == old))
            .ok_or_else(|| {
                ExerciseError::QuestionNotFound(String::from(
                    "cannot replace question that is not present in the library",
                ))
            })?;

        if &new != old && self.contains(&new) {
            debug!("refusing to replace with a duplicate question at {}s", new.time());
            return Ok(false);
        }

        if old.time() == new.time() {
            if let Some(slot) = self.slots.get_mut(&old.time()) {
                slot[position] = new;
            }
        } else {
            self.remove_at(old.time(), position);
            self.add(new);
        }
        Ok(true)
    }

    /// Removes the question equal to `question`. Returns `true` if one was
    /// present.
    pub fn remove(&mut self, question: &Question) -> bool {
        let position = self
            .slots
            .get(&question.time())
            .and_then(|slot| slot.iter().position(|q| q == question));

        match position {
            Some(position) => {
                self.remove_at(question.time(), position);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, time: u32, position: usize) -> Question {
        let slot = self.slots.entry(time).or_default();
        let removed = slot.remove(position);
        if slot.is_empty() {
            self.slots.remove(&time);
        }
        removed
    }

    /// Returns the question at `index` in iteration order.
    pub fn get(&self, index: usize) -> Result<&Question, ExerciseError> {
        self.iter().nth(index).ok_or_else(|| {
            ExerciseError::QuestionNotFound(format!("the index '{}' is out of range", index))
        })
    }

    /// Records `answers` as the given answers of the question at `index`.
    ///
    /// This is the only way to mutate a question in place; everything that
    /// affects identity goes through [`QuestionLibrary::replace`].
    pub fn record_given_answers<I, S>(&mut self, index: usize, answers: I) -> Result<(), ExerciseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let question = self
            .slots
            .values_mut()
            .flat_map(|slot| slot.iter_mut())
            .nth(index)
            .ok_or_else(|| {
                ExerciseError::QuestionNotFound(format!("the index '{}' is out of range", index))
            })?;
        question.record_given_answers(answers);
        Ok(())
    }

    pub fn index_of(&self, question: &Question) -> Option<usize> {
        self.iter().position(|q| q == question)
    }

    pub fn contains(&self, question: &Question) -> bool {
        self.slots
            .get(&question.time())
            .map_or(false, |slot| slot.contains(question))
    }

    pub fn contains_next(&self, question: &Question) -> bool {
        self.next(question).is_some()
    }

    /// The question that follows `question`, or `None` if `question` is the
    /// last one or is not in the library.
    pub fn next(&self, question: &Question) -> Option<&Question> {
        let index = self.index_of(question)?;
        self.iter().nth(index + 1)
    }

    /// The first unanswered question after `question`.
    pub fn next_unanswered(&self, question: &Question) -> Option<&Question> {
        let index = self.index_of(question)?;
        self.iter().skip(index + 1).find(|q| !q.is_answered())
    }

    /// Index-based form of [`QuestionLibrary::next_unanswered`].
    pub fn next_unanswered_index(&self, index: usize) -> Option<usize> {
        let start = index.checked_add(1)?;
        self.iter()
            .enumerate()
            .skip(start)
            .find(|(_, q)| !q.is_answered())
            .map(|(i, _)| i)
    }

    pub fn contains_unanswered(&self) -> bool {
        self.iter().any(|q| !q.is_answered())
    }

    /// Questions anchored at `time`, or `None` if there are none.
    pub fn time_slot(&self, time: u32) -> Option<&[Question]> {
        self.slots.get(&time).map(Vec::as_slice)
    }

    /// Unanswered questions anchored at `time`, or `None` if there are none.
    pub fn unanswered_in_time_slot(&self, time: u32) -> Option<Vec<&Question>> {
        let unanswered: Vec<&Question> = self
            .time_slot(time)?
            .iter()
            .filter(|q| !q.is_answered())
            .collect();

        if unanswered.is_empty() {
            None
        } else {
            Some(unanswered)
        }
    }

    pub fn contains_unanswered_in_time_slot(&self, time: u32) -> bool {
        self.unanswered_in_time_slot(time).is_some()
    }

    pub fn contains_time_slot(&self, time: u32) -> bool {
        self.slots.contains_key(&time)
    }

    /// Distinct time slots in ascending order.
    pub fn time_slots(&self) -> Vec<u32> {
        self.slots.keys().copied().collect()
    }

    /// Position of the first question of slot `time` in iteration order.
    pub fn first_index_in_time_slot(&self, time: u32) -> Option<usize> {
        if !self.contains_time_slot(time) {
            return None;
        }
        Some(self.slots.range(..time).map(|(_, slot)| slot.len()).sum())
    }

    /// Mean score over all questions, or `None` for an empty library.
    pub fn score(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        let total: f64 = self.iter().map(Question::score).sum();
        Some(total / self.len() as f64)
    }

    pub fn reset_given_answers(&mut self) {
        self.slots
            .values_mut()
            .flat_map(|slot| slot.iter_mut())
            .for_each(Question::reset_given_answers);
    }

    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.slots.values().flat_map(|slot| slot.iter())
    }
}

impl<'a> IntoIterator for &'a QuestionLibrary {
    type Item = &'a Question;
    type IntoIter = Box<dyn Iterator<Item = &'a Question> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl FromIterator<Question> for QuestionLibrary {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        Self::from_questions(iter)
    }
}

impl Extend<Question> for QuestionLibrary {
    fn extend<I: IntoIterator<Item = Question>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl From<Question> for QuestionLibrary {
    fn from(question: Question) -> Self {
        Self::from_questions([question])
    }
}

impl From<Vec<Question>> for QuestionLibrary {
    fn from(questions: Vec<Question>) -> Self {
        Self::from_questions(questions)
    }
}

impl From<QuestionLibrary> for Vec<Question> {
    fn from(library: QuestionLibrary) -> Self {
        library.slots.into_values().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(time: u32, text: &str) -> Question {
        Question::new(time, text, "right", ["wrong"], "")
    }

    fn library() -> QuestionLibrary {
        QuestionLibrary::from_questions([q(10, "b"), q(5, "a"), q(10, "c"), q(20, "d")])
    }

    fn texts(library: &QuestionLibrary) -> Vec<&str> {
        library.iter().map(Question::text).collect()
    }

    #[test]
    fn iterates_by_time_then_insertion() {
        assert_eq!(texts(&library()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn duplicate_add_is_refused() {
        let mut library = library();
        assert!(!library.add(q(10, "b")));
        assert_eq!(library.len(), 4);
        assert!(library.add(q(11, "b")));
    }

    #[test]
    fn answered_copy_is_still_a_duplicate() {
        let mut library = library();
        let mut answered = q(5, "a");
        answered.record_given_answer("right");
        assert!(!library.add(answered));
    }

    #[test]
    fn removing_last_question_drops_the_slot() {
        let mut library = library();
        assert!(library.remove(&q(20, "d")));
        assert!(!library.contains_time_slot(20));
        assert_eq!(library.time_slots(), vec![5, 10]);
        assert!(!library.remove(&q(20, "d")));
    }

    #[test]
    fn replace_in_place_keeps_position() {
        let mut library = library();
        assert!(library.replace(&q(10, "b"), q(10, "B")).unwrap());
        assert_eq!(texts(&library), vec!["a", "B", "c", "d"]);
    }

    #[test]
    fn replace_across_slots_moves_question() {
        let mut library = library();
        assert!(library.replace(&q(5, "a"), q(15, "a")).unwrap());
        assert_eq!(texts(&library), vec!["b", "c", "a", "d"]);
        assert_eq!(library.time_slots(), vec![10, 15, 20]);
        assert_eq!(library.index_of(&q(15, "a")), Some(2));
    }

    #[test]
    fn replace_missing_question_fails() {
        let mut library = library();
        assert!(matches!(
            library.replace(&q(99, "x"), q(1, "y")),
            Err(ExerciseError::QuestionNotFound(_))
        ));
    }

    #[test]
    fn replace_with_duplicate_is_refused() {
        let mut library = library();
        assert!(!library.replace(&q(10, "b"), q(10, "c")).unwrap());
        assert_eq!(texts(&library), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn get_out_of_range_fails() {
        let library = library();
        assert_eq!(library.get(3).unwrap().text(), "d");
        assert!(matches!(library.get(4), Err(ExerciseError::QuestionNotFound(_))));
    }

    #[test]
    fn next_and_next_unanswered() {
        let mut library = library();
        library.record_given_answers(1, ["right"]).unwrap();
        library.record_given_answers(2, ["wrong"]).unwrap();

        assert_eq!(library.next(&q(5, "a")).unwrap().text(), "b");
        assert_eq!(library.next_unanswered(&q(5, "a")).unwrap().text(), "d");
        assert_eq!(library.next_unanswered_index(0), Some(3));
        assert!(library.next(&q(20, "d")).is_none());
        assert!(library.next(&q(1, "missing")).is_none());
        assert!(!library.contains_next(&q(20, "d")));
    }

    #[test]
    fn time_slot_queries_return_none_when_empty() {
        let mut library = library();
        assert!(library.time_slot(7).is_none());
        assert_eq!(library.unanswered_in_time_slot(10).unwrap().len(), 2);

        library.record_given_answers(1, ["right"]).unwrap();
        library.record_given_answers(2, ["right"]).unwrap();
        assert!(library.unanswered_in_time_slot(10).is_none());
        assert_eq!(library.time_slot(10).unwrap().len(), 2);
    }

    #[test]
    fn first_index_in_time_slot_counts_earlier_slots() {
        let library = library();
        assert_eq!(library.first_index_in_time_slot(5), Some(0));
        assert_eq!(library.first_index_in_time_slot(10), Some(1));
        assert_eq!(library.first_index_in_time_slot(20), Some(3));
        assert_eq!(library.first_index_in_time_slot(6), None);
    }

    #[test]
    fn next_unanswered_index_past_the_end() {
        let library = library();
        assert_eq!(library.next_unanswered_index(0), Some(1));
        assert_eq!(library.next_unanswered_index(3), None);
        assert_eq!(library.next_unanswered_index(usize::MAX), None);
    }

    #[test]
    fn empty_library_has_no_score() {
        assert_eq!(QuestionLibrary::new().score(), None);
    }

    #[test]
    fn reset_clears_every_question() {
        let mut library = library();
        for i in 0..library.len() {
            library.record_given_answers(i, ["right"]).unwrap();
        }
        assert!(!library.contains_unanswered());
        assert_eq!(library.score(), Some(1.0));

        library.reset_given_answers();
        assert!(library.iter().all(|q| !q.is_answered()));
    }
}
