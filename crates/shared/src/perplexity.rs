use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BotError;
use crate::models::Fact;

const BASE_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Two attempts total: the initial call plus one retry with backoff.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Seam over the completion endpoint so the retry contract can be exercised
/// with a scripted backend in tests.
pub trait CompletionApi {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

pub struct PerplexityClient {
    client: Client,
    api_key: String,
}

impl PerplexityClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, api_key })
    }
}

impl CompletionApi for PerplexityClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(BASE_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Perplexity API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Perplexity API returned {}: {}", status, error_text);
        }

        let completion = response
            .json::<CompletionResponse>()
            .await
            .context("Failed to parse Perplexity API response")?;

        Ok(completion
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default())
    }
}

/// Two-step fact retrieval: find a source article, then summarize it.
pub struct FactRetriever<C> {
    api: C,
}

impl<C: CompletionApi> FactRetriever<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    pub async fn retrieve(&self, topic: &str, now: DateTime<Utc>) -> Result<Fact> {
        let source_url = self.find_article(topic).await?;
        let body = self.summarize(&source_url).await?;

        Ok(Fact {
            topic: topic.to_string(),
            source_url,
            body,
            retrieved_at: now,
        })
    }

    /// Step 1: find a single, relevant article URL for the topic.
    pub async fn find_article(&self, topic: &str) -> Result<String> {
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_DELAY).await;
            }

            // Rephrase on the retry rather than repeating a prompt that
            // already failed once.
            let user_prompt = if attempt == 0 {
                format!("Find one interesting article about {}.", topic)
            } else {
                format!(
                    "Search the web for a recent, verifiable online article about {}. \
                    Reply with only its URL.",
                    topic
                )
            };

            let request = CompletionRequest {
                model: "sonar-pro".to_string(),
                messages: vec![
                    ChatMessage::system(
                        "You are a search assistant. Your sole purpose is to find a single, \
                        highly relevant, and verifiable online article for the given topic. \
                        Respond with ONLY the URL and nothing else.",
                    ),
                    ChatMessage::user(user_prompt),
                ],
                max_tokens: 150,
                temperature: 0.2,
            };

            match self.api.complete(request).await {
                Ok(reply) => {
                    if let Some(url) = extract_url(&reply) {
                        return Ok(url);
                    }
                }
                Err(e) => {
                    eprintln!("⚠ Article search attempt {} failed: {}", attempt + 1, e);
                }
            }
        }

        Err(BotError::SourceNotFound {
            topic: topic.to_string(),
            attempts: MAX_ATTEMPTS,
        }
        .into())
    }

    /// Step 2: summarize the article behind a URL into one short fact.
    pub async fn summarize(&self, article_url: &str) -> Result<String> {
        let mut last_error = String::from("empty response");

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let request = CompletionRequest {
                model: "sonar-pro".to_string(),
                messages: vec![
                    ChatMessage::system(
                        "You are a summarization assistant. Read the content of the provided \
                        URL and provide a concise, interesting summary of the key finding or \
                        main point. The summary should be under 100 words.",
                    ),
                    ChatMessage::user(format!("Please summarize this article: {}", article_url)),
                ],
                max_tokens: 200,
                temperature: 0.7,
            };

            match self.api.complete(request).await {
                Ok(reply) => {
                    let reply = reply.trim();
                    if !reply.is_empty() {
                        return Ok(normalize_citations(reply));
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                    eprintln!("⚠ Summarization attempt {} failed: {}", attempt + 1, e);
                }
            }
        }

        Err(BotError::Summarization(last_error).into())
    }
}

fn extract_url(reply: &str) -> Option<String> {
    let candidate = reply.trim();
    if candidate.starts_with("http") && !candidate.contains(char::is_whitespace) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Rewrite every `[n]` citation marker to ` [1]` so the fact always points at
/// the single source we archive; append one if the model left it out.
fn normalize_citations(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut found = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '[' {
            let mut lookahead = chars.clone();
            let mut saw_digit = false;
            while lookahead.peek().is_some_and(|d| d.is_ascii_digit()) {
                lookahead.next();
                saw_digit = true;
            }
            if saw_digit && lookahead.peek() == Some(&']') {
                lookahead.next();
                chars = lookahead;
                while out.ends_with(char::is_whitespace) {
                    out.pop();
                }
                out.push_str(" [1]");
                found = true;
                continue;
            }
        }
        out.push(c);
    }

    if !found {
        while out.ends_with(char::is_whitespace) {
            out.pop();
        }
        out.push_str(" [1]");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    struct StubApi {
        replies: RefCell<VecDeque<Result<String>>>,
        calls: Cell<u32>,
    }

    impl StubApi {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl CompletionApi for StubApi {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[tokio::test]
    async fn test_invalid_url_twice_fails_after_exactly_two_attempts() {
        let api = StubApi::new(vec![
            Ok("I could not find an article.".to_string()),
            Ok(String::new()),
        ]);
        let retriever = FactRetriever::new(api);

        let err = retriever.find_article("astronomy").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::SourceNotFound { attempts: 2, .. })
        ));
        assert_eq!(retriever.api.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_rephrased_prompt() {
        let api = StubApi::new(vec![
            Ok("Sure! Here is an article: example.com".to_string()),
            Ok("https://example.com/story".to_string()),
        ]);
        let retriever = FactRetriever::new(api);

        let url = retriever.find_article("history").await.unwrap();
        assert_eq!(url, "https://example.com/story");
        assert_eq!(retriever.api.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_summarize_failure_is_summarization_error() {
        let api = StubApi::new(vec![
            Err(anyhow::anyhow!("Perplexity API returned 500: oops")),
            Ok(String::new()),
        ]);
        let retriever = FactRetriever::new(api);

        let err = retriever
            .summarize("https://example.com/story")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::Summarization(_))
        ));
        assert_eq!(retriever.api.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retrieve_builds_fact_with_normalized_citation() {
        let api = StubApi::new(vec![
            Ok("https://example.com/octopus".to_string()),
            Ok("Octopuses have three hearts[3].".to_string()),
        ]);
        let retriever = FactRetriever::new(api);
        let now = Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap();

        let fact = retriever.retrieve("ocean life", now).await.unwrap();
        assert_eq!(fact.topic, "ocean life");
        assert_eq!(fact.source_url, "https://example.com/octopus");
        assert_eq!(fact.body, "Octopuses have three hearts [1].");
        assert_eq!(fact.retrieved_at, now);
    }

    #[test]
    fn test_normalize_citations_rewrites_all_markers() {
        assert_eq!(
            normalize_citations("One fact [2]. Another [14]."),
            "One fact [1]. Another [1]."
        );
    }

    #[test]
    fn test_normalize_citations_appends_when_missing() {
        assert_eq!(normalize_citations("No citation here. "), "No citation here. [1]");
    }

    #[test]
    fn test_normalize_citations_leaves_non_numeric_brackets() {
        assert_eq!(
            normalize_citations("A [sic] remark [1]"),
            "A [sic] remark [1]"
        );
    }

    #[test]
    fn test_extract_url_rejects_prose() {
        assert_eq!(extract_url("see https://a.com for details"), None);
        assert_eq!(extract_url(""), None);
        assert_eq!(
            extract_url("  https://a.com/x  "),
            Some("https://a.com/x".to_string())
        );
    }
}
