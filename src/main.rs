use std::io::Write;
use std::{
    env,
    fs::{self, OpenOptions},
};

use anyhow::Context;
use log::warn;
use videomcq::exercise::{
    exercise_slug, load_exercise, mime_type_for, serialize_exercise, validate_video_url, ExerciseData,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DEFAULT_OUTPUT_DIR: &str = "output/exercises";

pub struct Config {
    pub exercise_path: String,
    pub output_dir: String,
}

impl Config {
    pub fn new(exercise_path: String, output_dir: &str) -> Self {
        Self {
            exercise_path,
            output_dir: output_dir.to_string(),
        }
    }
}

fn parse_config(mut args: impl Iterator<Item = String>, default_output_dir: &str) -> anyhow::Result<Config> {
    let exercise_path = args
        .next()
        .context("exercise_path is required, point it at a saved videoMcq-exercise XML file")?;
    let output_dir = args.next().unwrap_or(default_output_dir.to_string());

    Ok(Config::new(exercise_path, &output_dir))
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let default_output_dir =
        env::var("VIDEOMCQ_OUTPUT_DIR").unwrap_or(DEFAULT_OUTPUT_DIR.to_string());
    let config = match parse_config(env::args().skip(1), &default_output_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Usage: videomcq <exercise.xml> [output_dir]");
            return Err(e);
        }
    };

    let bytes = fs::read(&config.exercise_path)
        .context(format!("failed to read {}", config.exercise_path))?;
    let mut exercise = load_exercise(&bytes)
        .context(format!("could not load exercise from {}", config.exercise_path))?;
    fill_mime_type(&mut exercise);

    if let Err(e) = validate_video_url(&exercise.video_url) {
        warn!("exercise '{}': {}", exercise.exercise_name, e);
    }

    fs::create_dir_all(&config.output_dir).context("failed to create output directory")?;
    let page_path = create_page(&exercise, &config.output_dir)?;

    println!(
        "created {BOLD}{}{RESET} with {BOLD}{}{RESET} questions in {BOLD}{}{RESET} time slots",
        page_path,
        exercise.library.len(),
        exercise.library.time_slots().len()
    );

    Ok(())
}

/// Guesses a missing MIME type from the video URL.
fn fill_mime_type(exercise: &mut ExerciseData) {
    if !exercise.mime_type.is_empty() {
        return;
    }
    match mime_type_for(&exercise.video_url) {
        Some(mime_type) => exercise.mime_type = mime_type.to_string(),
        None => warn!("no MIME type known for {}", exercise.video_url),
    }
}

fn create_page(exercise: &ExerciseData, output_dir: &str) -> anyhow::Result<String> {
    let path = format!("{}/{}.md", output_dir, exercise_slug(&exercise.exercise_name));
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&path)
        .context(format!("failed to open file for {}", path))?;

    let content = serialize_exercise(exercise).context("failed to serialize exercise")?;
    write!(file, "{}", content).context("failed to write exercise page")?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn output_dir_falls_back_to_default() {
        let config = parse_config(args(&["rivers.xml"]), "out").unwrap();
        assert_eq!(config.exercise_path, "rivers.xml");
        assert_eq!(config.output_dir, "out");

        let config = parse_config(args(&["rivers.xml", "pages"]), "out").unwrap();
        assert_eq!(config.output_dir, "pages");
    }

    #[test]
    fn missing_mime_type_is_guessed_from_the_url() {
        let mut exercise = ExerciseData::new("http://example.com/talk.OGV", "");
        fill_mime_type(&mut exercise);
        assert_eq!(exercise.mime_type, "video/ogg");

        let mut exercise = ExerciseData::new("http://example.com/talk.mp4", "video/custom");
        fill_mime_type(&mut exercise);
        assert_eq!(exercise.mime_type, "video/custom");
    }

    #[test]
    fn exercise_path_is_required() {
        assert!(parse_config(args(&[]), "out").is_err());
    }
}
