use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BotError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

/// Client for Google's Gemini image generation endpoint. Best-effort: callers
/// treat failures as a warning and continue without an image.
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
}

impl GeminiImageClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, api_key })
    }

    /// Generate an illustrative image for the topic, returning raw PNG bytes.
    pub async fn generate(&self, topic: &str, fact: &str) -> Result<Vec<u8>> {
        let prompt = build_prompt(topic, fact);
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = format!("{}/{}:generateContent", BASE_URL, MODEL);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::ImageGeneration(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(
                BotError::ImageGeneration(format!("Gemini API returned {}: {}", status, body))
                    .into(),
            );
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BotError::ImageGeneration(format!("unparseable response: {}", e)))?;

        let inline = generated
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                BotError::ImageGeneration("no image data found in the response".to_string())
            })?;

        BASE64
            .decode(inline.data.as_bytes())
            .map_err(|e| BotError::ImageGeneration(format!("invalid image payload: {}", e)).into())
    }
}

fn build_prompt(topic: &str, fact: &str) -> String {
    format!(
        "Create a professional, high-detail image representing '{}'. \
        The style should be modern, clean, and visually striking, suitable for a LinkedIn post. \
        Focus on a composition that is both artistic and clearly communicates the subject. \
        Avoid text, watermarks, or distracting elements. The lighting should be bright and natural. \
        For context, the image accompanies this fact: {}",
        topic, fact
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_topic_and_fact() {
        let prompt = build_prompt("astronomy", "Neutron stars spin fast.");
        assert!(prompt.contains("'astronomy'"));
        assert!(prompt.contains("Neutron stars spin fast."));
    }

    #[test]
    fn test_response_parsing_finds_inline_data() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
                    ]
                }
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let inline = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .unwrap();
        assert_eq!(BASE64.decode(inline.data).unwrap(), b"hello");
    }
}
