// Public modules
pub mod archive;
pub mod config;
pub mod error;
pub mod formatter;
pub mod imagen;
pub mod linkedin;
pub mod models;
pub mod perplexity;
pub mod publisher;
pub mod topics;
pub mod watermark;

// Re-export commonly used types
pub use archive::Archiver;
pub use config::Config;
pub use error::BotError;
pub use formatter::{format_post, LINKEDIN_CHAR_LIMIT};
pub use imagen::GeminiImageClient;
pub use linkedin::LinkedInClient;
pub use models::{Fact, Post, PostTarget};
pub use perplexity::{CompletionApi, FactRetriever, PerplexityClient};
pub use publisher::{confirm_from_stdin, PublishOutcome, Publisher};
pub use topics::{daily_topic, load_topics};
