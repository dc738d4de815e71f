use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

use crate::models::Fact;

/// Persists each run's artifacts to dated flat files under the output
/// directory. Append-only: one set of files per run, no indexing.
pub struct Archiver {
    output_dir: PathBuf,
}

impl Archiver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn save_fact(&self, fact: &Fact) -> Result<PathBuf> {
        let dir = self.output_dir.join("facts");
        fs::create_dir_all(&dir).context("Failed to create facts directory")?;

        let date = fact.retrieved_at.format("%Y-%m-%d");
        let filepath = dir.join(format!("daily_fact_{}.txt", date));
        let content = format!(
            "DAILY FACT - {}\nTopic: {}\n\n{}\n\nSource:\n[1] {}\n",
            date, fact.topic, fact.body, fact.source_url
        );

        fs::write(&filepath, content).context("Failed to write fact file")?;
        Ok(filepath)
    }

    pub fn save_post(&self, text: &str, date: DateTime<Utc>) -> Result<PathBuf> {
        let dir = self.output_dir.join("linkedin_posts");
        fs::create_dir_all(&dir).context("Failed to create linkedin_posts directory")?;

        let filepath = dir.join(format!("linkedin_post_{}.md", date.format("%Y-%m-%d")));
        fs::write(&filepath, text).context("Failed to write post file")?;
        Ok(filepath)
    }

    pub fn save_image(&self, topic: &str, image: &[u8], date: DateTime<Utc>) -> Result<PathBuf> {
        let dir = self.output_dir.join("images");
        fs::create_dir_all(&dir).context("Failed to create images directory")?;

        let filepath = dir.join(format!(
            "{}_{}.png",
            slugify(topic),
            date.format("%Y-%m-%d")
        ));
        fs::write(&filepath, image).context("Failed to write image file")?;
        Ok(filepath)
    }
}

/// Topics can contain separators and punctuation ("TCP/IP"); keep only
/// alphanumeric runs so the slug stays a single path component.
fn slugify(topic: &str) -> String {
    topic
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
