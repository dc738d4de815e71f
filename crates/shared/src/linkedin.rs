use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::error::BotError;
use crate::models::PostTarget;

const API_URL: &str = "https://api.linkedin.com/v2";

/// Client for the LinkedIn UGC share API. Authenticates with a long-lived
/// bearer token supplied via configuration; token acquisition is a manual
/// setup step outside this program.
pub struct LinkedInClient {
    client: Client,
    access_token: String,
    person_id: Option<String>,
    organization_id: Option<String>,
}

impl LinkedInClient {
    pub fn new(
        access_token: String,
        person_id: Option<String>,
        organization_id: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            access_token,
            person_id,
            organization_id,
        })
    }

    /// Resolve the author URN for the requested target. Pure; checked before
    /// any network call so a misconfigured run fails early.
    pub fn author_urn(&self, target: PostTarget) -> Result<String> {
        match target {
            PostTarget::Personal => self
                .person_id
                .as_deref()
                .map(|id| format!("urn:li:person:{}", id))
                .ok_or_else(|| {
                    BotError::Configuration(
                        "LINKEDIN_PERSON_ID is not configured for a personal post".to_string(),
                    )
                    .into()
                }),
            PostTarget::Organization => self
                .organization_id
                .as_deref()
                .map(|id| format!("urn:li:organization:{}", id))
                .ok_or_else(|| {
                    BotError::Configuration(
                        "LINKEDIN_ORGANIZATION_ID is not configured for a company post".to_string(),
                    )
                    .into()
                }),
        }
    }

    /// Two-step image upload: register the asset, then PUT the bytes.
    /// Returns the asset URN to reference from the post payload.
    pub async fn upload_image(&self, image: &[u8], owner_urn: &str) -> Result<String> {
        let register_body = json!({
            "registerUploadRequest": {
                "recipes": ["urn:li:digitalmediaRecipe:feedshare-image"],
                "owner": owner_urn,
                "serviceRelationships": [{
                    "relationshipType": "OWNER",
                    "identifier": "urn:li:userGeneratedContent"
                }]
            }
        });

        let response = self
            .client
            .post(format!("{}/assets?action=registerUpload", API_URL))
            .bearer_auth(&self.access_token)
            .json(&register_body)
            .send()
            .await
            .context("Failed to register image upload")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Publish {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let registered: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse registerUpload response")?;

        let asset_urn = registered
            .pointer("/value/asset")
            .and_then(|v| v.as_str())
            .context("registerUpload response missing asset URN")?
            .to_string();
        let upload_url = registered
            .pointer(
                "/value/uploadMechanism/com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest/uploadUrl",
            )
            .and_then(|v| v.as_str())
            .context("registerUpload response missing upload URL")?
            .to_string();

        let upload_response = self
            .client
            .put(&upload_url)
            .bearer_auth(&self.access_token)
            .body(image.to_vec())
            .send()
            .await
            .context("Failed to upload image bytes")?;

        let upload_status = upload_response.status();
        if !upload_status.is_success() {
            let body = upload_response.text().await.unwrap_or_default();
            return Err(BotError::Publish {
                status: upload_status.as_u16(),
                body,
            }
            .into());
        }

        Ok(asset_urn)
    }

    /// Create the UGC post. No retry on failure: publishing is not
    /// idempotent and a retry could double-post.
    pub async fn create_post(
        &self,
        author_urn: &str,
        text: &str,
        asset_urn: Option<&str>,
    ) -> Result<()> {
        let mut share_content = json!({
            "shareCommentary": { "text": text },
            "shareMediaCategory": "NONE"
        });
        if let Some(asset) = asset_urn {
            share_content["shareMediaCategory"] = json!("IMAGE");
            share_content["media"] = json!([{ "status": "READY", "media": asset }]);
        }

        let post_body = json!({
            "author": author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": { "com.linkedin.ugc.ShareContent": share_content },
            "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC" }
        });

        let response = self
            .client
            .post(format!("{}/ugcPosts", API_URL))
            .bearer_auth(&self.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&post_body)
            .send()
            .await
            .context("Failed to submit post to LinkedIn")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Publish {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(())
    }
}
