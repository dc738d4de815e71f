use anyhow::Result;
use chrono::Datelike;
use std::path::Path;

use crate::error::BotError;

/// Fallback rotation used when no topics file has been supplied.
const DEFAULT_TOPICS: &[&str] = &[
    "astronomy",
    "history",
    "biology",
    "technology",
    "psychology",
    "ocean life",
    "ancient civilizations",
    "quantum physics",
    "art history",
    "culinary science",
];

/// Load the topic rotation from a newline-delimited file.
///
/// A missing file falls back to the built-in defaults with a warning. A file
/// that exists but contains no usable lines is a configuration error.
pub fn load_topics(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        eprintln!(
            "⚠ Topics file {} not found, using {} default topics",
            path.display(),
            DEFAULT_TOPICS.len()
        );
        return Ok(DEFAULT_TOPICS.iter().map(|s| s.to_string()).collect());
    }

    let content = std::fs::read_to_string(path)?;
    let topics: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if topics.is_empty() {
        return Err(BotError::Configuration(format!(
            "topics file {} contains no topics",
            path.display()
        ))
        .into());
    }

    Ok(topics)
}

/// Pick today's topic from the rotation: `topics[(day_of_month - 1) mod len]`.
/// Generic over the date so callers can select on the local calendar day.
pub fn daily_topic<D: Datelike>(topics: &[String], date: D) -> Result<&str> {
    if topics.is_empty() {
        return Err(BotError::Configuration("topic list is empty".to_string()).into());
    }
    let day = date.day() as usize;
    Ok(&topics[(day - 1) % topics.len()])
}
