use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sourced, summarized fact about a topic. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub topic: String,
    pub source_url: String,
    pub body: String,
    pub retrieved_at: DateTime<Utc>,
}

/// Destination account for a LinkedIn post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostTarget {
    Personal,
    Organization,
}

/// Platform-formatted text plus optional image, ready for submission.
#[derive(Debug, Clone)]
pub struct Post {
    pub body: String,
    pub target: PostTarget,
    pub image: Option<Vec<u8>>,
}

impl Post {
    pub fn new(body: impl Into<String>, target: PostTarget) -> Self {
        Self {
            body: body.into(),
            target,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }
}
