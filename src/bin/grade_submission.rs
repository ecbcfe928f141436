use std::{env, fs};

use anyhow::Context;
use log::info;
use videomcq::exercise::{format_time, load_exercise, SubmissionInfo};

pub struct Config {
    pub exercise_path: String,
    pub submission_path: String,
}

fn parse_config(mut args: impl Iterator<Item = String>) -> anyhow::Result<Config> {
    let exercise_path = args.next().context("exercise_path is required")?;
    let submission_path = args.next().context("submission_path is required")?;

    Ok(Config {
        exercise_path,
        submission_path,
    })
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match parse_config(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Usage: grade_submission <exercise.xml> <submission.json>");
            return Err(e);
        }
    };

    let exercise = fs::read(&config.exercise_path)
        .context(format!("failed to read {}", config.exercise_path))
        .and_then(|bytes| load_exercise(&bytes).context("could not load exercise"))?;
    let submission = fs::read(&config.submission_path)
        .context(format!("failed to read {}", config.submission_path))
        .and_then(|bytes| SubmissionInfo::from_bytes(&bytes).context("could not decode submission"))?;

    let missing = exercise
        .library
        .iter()
        .filter(|q| !submission.library.contains(q))
        .count();
    if missing > 0 {
        info!("{} exercise questions are absent from the submission", missing);
    }

    for (i, question) in submission.library.iter().enumerate() {
        let status = if !question.is_answered() {
            "unanswered"
        } else if question.is_fully_correct() {
            "correct"
        } else {
            "incorrect"
        };
        println!(
            "{:>3}. [{}] {:<10} {:>5.1}%  {}",
            i + 1,
            format_time(question.time()),
            status,
            question.score() * 100.0,
            question.text()
        );
    }

    println!(
        "\n'{}': {} points",
        exercise.exercise_name,
        submission.points()
    );

    Ok(())
}
