use std::collections::BTreeMap;

use anyhow::Context;
use serde::Serialize;

use super::data::ExerciseData;
use super::question::Question;
use super::time::format_time;

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Frontmatter<'a> {
    Title(&'a str),
    Slug(String),
    Video(&'a str),
    MimeType(&'a str),
    Flag(bool),
    TimeSlots(Vec<u32>),
    Questions(Vec<QuestionMeta<'a>>),
}

#[derive(Serialize, Debug)]
pub struct QuestionMeta<'a> {
    time: u32,
    timestamp: String,
    question: &'a str,
    correct: Vec<&'a str>,
    incorrect: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> QuestionMeta<'a> {
    pub fn new(question: &'a Question) -> Self {
        Self {
            time: question.time(),
            timestamp: format_time(question.time()),
            question: question.text(),
            correct: question.correct_answers().iter().collect(),
            incorrect: question.incorrect_answers().iter().collect(),
            description: question
                .has_answer_description()
                .then(|| question.answer_description()),
        }
    }
}

/// Slug for an exercise name, used as its file name.
pub fn exercise_slug(name: &str) -> String {
    let mut slugger = github_slugger::Slugger::default();
    let slug = slugger.slug(name);
    if slug.is_empty() {
        String::from("exercise")
    } else {
        slug
    }
}

/// Renders `data` as a markdown page: YAML frontmatter with the exercise
/// settings and questions, followed by one section per time slot.
pub fn serialize_exercise(data: &ExerciseData) -> anyhow::Result<String> {
    let mut fm: BTreeMap<&str, Frontmatter> = BTreeMap::new();
    fm.insert("title", Frontmatter::Title(data.exercise_name.as_str()));
    fm.insert("slug", Frontmatter::Slug(exercise_slug(&data.exercise_name)));
    fm.insert("video", Frontmatter::Video(data.video_url.as_str()));
    fm.insert("mimetype", Frontmatter::MimeType(data.mime_type.as_str()));
    fm.insert("slider", Frontmatter::Flag(data.slider_enabled));
    fm.insert("instant_response", Frontmatter::Flag(data.instant_response));
    fm.insert("time_slots", Frontmatter::TimeSlots(data.library.time_slots()));
    fm.insert(
        "questions",
        Frontmatter::Questions(data.library.iter().map(QuestionMeta::new).collect()),
    );

    let mut body = String::with_capacity(200 * data.library.len());
    let mut number = 0;
    for time in data.library.time_slots() {
        let Some(slot) = data.library.time_slot(time) else {
            continue;
        };

        body.push_str(&format!("## {} {{#t-{}}}\n\n", format_time(time), time));
        for question in slot {
            number += 1;
            body.push_str(&format!("{}. {}\n", number, question.text()));
            for answer in question.correct_answers().iter() {
                body.push_str(&format!("   - [x] {}\n", answer));
            }
            for answer in question.incorrect_answers().iter() {
                body.push_str(&format!("   - [ ] {}\n", answer));
            }
            if question.has_answer_description() {
                body.push_str(&format!("\n   > {}\n", question.answer_description()));
            }
            body.push('\n');
        }
    }

    Ok(format!(
        r#"---
{}---

{}"#,
        serde_yaml_ng::to_string(&fm).context("failed to serialize exercise frontmatter")?,
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::QuestionLibrary;

    #[test]
    fn slugs_exercise_names() {
        assert_eq!(exercise_slug("Rivers of Africa"), "rivers-of-africa");
        assert_eq!(exercise_slug(""), "exercise");
    }

    #[test]
    fn page_lists_questions_by_time_slot() {
        let mut data = ExerciseData::new("http://example.com/v.mp4", "video/mp4");
        data.exercise_name = String::from("Rivers");
        data.library = QuestionLibrary::from_questions([
            Question::new(75, "Longest river?", "Nile", ["Amazon"], "About 6650 km."),
            Question::new(5, "Warm-up?", "ok", Vec::<String>::new(), ""),
        ]);

        let page = serialize_exercise(&data).unwrap();
        assert!(page.starts_with("---\n"));
        assert!(page.contains("slug: rivers"));
        assert!(page.contains("## 0:00:05 {#t-5}"));
        assert!(page.contains("2. Longest river?\n   - [x] Nile\n   - [ ] Amazon\n"));
        assert!(page.contains("> About 6650 km."));

        let warm_up = page.find("Warm-up?").unwrap();
        let longest = page.find("## 0:01:15").unwrap();
        assert!(warm_up < longest);
    }
}
