use thiserror::Error;

/// Error taxonomy for a bot run.
///
/// Everything here is fatal for the run except `ImageGeneration`, which the
/// caller downgrades to a warning and continues without an image.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no suitable article found for \"{topic}\" after {attempts} attempts")]
    SourceNotFound { topic: String, attempts: u32 },

    #[error("failed to summarize article: {0}")]
    Summarization(String),

    #[error("image generation failed: {0}")]
    ImageGeneration(String),

    #[error("LinkedIn API returned {status}: {body}")]
    Publish { status: u16, body: String },
}
