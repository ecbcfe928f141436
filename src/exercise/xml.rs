use log::{info, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::data::ExerciseData;
use super::error::{ExerciseError, LoadError};
use super::library::QuestionLibrary;
use super::question::Question;

const ROOT: &str = "videoMcq-exercise";
const VIDEO_URL: &str = "videoURL";
const MIME_TYPE: &str = "mimetype";
const EXERCISE_NAME: &str = "exerName";
const SLIDER_ENABLED: &str = "sliderEnabled";
const INSTANT_RESPONSE: &str = "instantResponse";

const TIMED_QUESTION: &str = "timedQuestion";
const TIME: &str = "time";
const QUESTION: &str = "question";
const ANSWER: &str = "answer";
const ANSWER_DESCRIPTION: &str = "AnswerDescription";
const FALSE_ANSWERS: &str = "falseAnswers";

/// Element tree built from the saved document.
#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn from_start(start: &BytesStart) -> Result<Self, LoadError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Attribute value, empty when the attribute is absent.
    fn attribute(&self, name: &str) -> &str {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map_or("", |(_, value)| value.as_str())
    }

    fn flag(&self, name: &str) -> bool {
        self.attribute(name).eq_ignore_ascii_case("true")
    }

    fn text_content(&self) -> String {
        let mut content = self.text.clone();
        for child in &self.children {
            content.push_str(&child.text_content());
        }
        content
    }

    /// Text of the element child at `position`, empty when there is none.
    fn child_text(&self, position: usize) -> String {
        self.children
            .get(position)
            .map(Node::text_content)
            .unwrap_or_default()
    }
}

fn parse_document(bytes: &[u8]) -> Result<Node, LoadError> {
    let mut reader = Reader::from_str(std::str::from_utf8(bytes)?);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::from_start(&start)?),
            Event::Empty(start) => {
                let node = Node::from_start(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node)?;
                }
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(std::str::from_utf8(&data)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(LoadError::MissingRoot)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), LoadError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_some() => return Err(LoadError::ExtraRoot(node.name)),
        None => *root = Some(node),
    }
    Ok(())
}

fn read_question(index: usize, node: &Node) -> Result<Question, LoadError> {
    let time = node
        .children
        .first()
        .ok_or(LoadError::MissingTime { index })?
        .text_content();
    let time: u32 = time
        .trim()
        .parse()
        .map_err(|source| LoadError::InvalidTime {
            index,
            value: time.clone(),
            source,
        })?;

    let incorrect_answers: Vec<String> = node
        .children
        .get(4)
        .map(|answers| answers.children.iter().map(Node::text_content).collect())
        .unwrap_or_default();

    Ok(Question::new(
        time,
        node.child_text(1),
        node.child_text(2),
        incorrect_answers,
        node.child_text(3),
    ))
}

/// Reads an exercise saved by [`save_exercise`].
///
/// The children of each `timedQuestion` are read by position: time,
/// question, answer, description, then the incorrect answers in document
/// order. Absent attributes read as empty strings or `false`.
pub fn load_exercise(bytes: &[u8]) -> Result<ExerciseData, ExerciseError> {
    let root = parse_document(bytes)?;
    if root.name != ROOT {
        return Err(LoadError::UnexpectedRoot(root.name).into());
    }

    let mut library = QuestionLibrary::new();
    for (index, node) in root
        .children
        .iter()
        .filter(|child| child.name == TIMED_QUESTION)
        .enumerate()
    {
        let question = read_question(index, node)?;
        if !library.add(question) {
            warn!("skipping duplicate question {} in saved exercise", index);
        }
    }

    let data = ExerciseData {
        video_url: root.attribute(VIDEO_URL).to_owned(),
        mime_type: root.attribute(MIME_TYPE).to_owned(),
        exercise_name: root.attribute(EXERCISE_NAME).to_owned(),
        slider_enabled: root.flag(SLIDER_ENABLED),
        instant_response: root.flag(INSTANT_RESPONSE),
        library,
    };
    info!(
        "loaded exercise '{}' with {} questions",
        data.exercise_name,
        data.library.len()
    );
    Ok(data)
}

/// Writes `data` as a `videoMcq-exercise` document.
///
/// Only the first correct answer of each question is stored.
pub fn save_exercise(data: &ExerciseData) -> Result<Vec<u8>, ExerciseError> {
    let bytes = write_document(data).map_err(ExerciseError::Write)?;
    info!(
        "saved exercise '{}' with {} questions",
        data.exercise_name,
        data.library.len()
    );
    Ok(bytes)
}

fn write_document(data: &ExerciseData) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;

    let mut root = BytesStart::new(ROOT);
    root.push_attribute((VIDEO_URL, data.video_url.as_str()));
    root.push_attribute((MIME_TYPE, data.mime_type.as_str()));
    root.push_attribute((EXERCISE_NAME, data.exercise_name.as_str()));
    root.push_attribute((SLIDER_ENABLED, if data.slider_enabled { "true" } else { "false" }));
    root.push_attribute((INSTANT_RESPONSE, if data.instant_response { "true" } else { "false" }));
    writer.write_event(Event::Start(root))?;

    for question in data.library.iter() {
        writer.write_event(Event::Start(BytesStart::new(TIMED_QUESTION)))?;
        write_text_element(&mut writer, TIME, &question.time().to_string())?;
        write_text_element(&mut writer, QUESTION, question.text())?;
        write_text_element(&mut writer, ANSWER, question.correct_answer(0).unwrap_or(""))?;
        write_text_element(&mut writer, ANSWER_DESCRIPTION, question.answer_description())?;

        writer.write_event(Event::Start(BytesStart::new(FALSE_ANSWERS)))?;
        for (i, answer) in question.incorrect_answers().iter().enumerate() {
            write_text_element(&mut writer, &format!("false{}", i + 1), answer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(FALSE_ANSWERS)))?;

        writer.write_event(Event::End(BytesEnd::new(TIMED_QUESTION)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    Ok(writer.into_inner())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
