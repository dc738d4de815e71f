use anyhow::Result;
use std::io::{self, Write};

use crate::linkedin::LinkedInClient;
use crate::models::Post;

/// Terminal states of a publish attempt. Aborting at the confirmation prompt
/// is a clean outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Aborted,
}

pub struct Publisher {
    client: LinkedInClient,
}

impl Publisher {
    pub fn new(client: LinkedInClient) -> Self {
        Self { client }
    }

    /// Walk the draft through confirmation and submission.
    ///
    /// The confirmation port is injected so tests can script the answer. A
    /// non-affirmative answer aborts with zero network calls. Submission
    /// errors are not retried: a duplicate post is worse than a failed one.
    pub async fn publish<F>(&self, post: &Post, confirm: F) -> Result<PublishOutcome>
    where
        F: FnOnce(&str) -> Result<bool>,
    {
        let draft = render_draft(post);

        if !confirm(&draft)? {
            println!("Posting cancelled by user.");
            return Ok(PublishOutcome::Aborted);
        }

        let author_urn = self.client.author_urn(post.target)?;

        let asset_urn = match &post.image {
            Some(image) => {
                println!("📤 Uploading image to LinkedIn...");
                Some(self.client.upload_image(image, &author_urn).await?)
            }
            None => None,
        };

        self.client
            .create_post(&author_urn, &post.body, asset_urn.as_deref())
            .await?;

        Ok(PublishOutcome::Published)
    }
}

fn render_draft(post: &Post) -> String {
    let divider = "=".repeat(50);
    format!(
        "{divider}\nThe following post will be published to LinkedIn:\n{divider}\n{}\n{divider}\nImage: {}",
        post.body,
        if post.image.is_some() {
            "attached"
        } else {
            "none"
        }
    )
}

/// Production confirmation port: show the draft, then block on a single
/// yes/no answer from stdin. No timeout and no default.
pub fn confirm_from_stdin(draft: &str) -> Result<bool> {
    println!("\n{}", draft);
    print!("Do you want to proceed with posting? (y/n): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use crate::models::PostTarget;
    use std::cell::Cell;

    fn publisher(person: Option<&str>, org: Option<&str>) -> Publisher {
        Publisher::new(
            LinkedInClient::new(
                "test-token".to_string(),
                person.map(String::from),
                org.map(String::from),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_declined_confirmation_aborts_without_network() {
        let publisher = publisher(Some("abc123"), None);
        let post = Post::new("A draft post", PostTarget::Personal);
        let asked = Cell::new(0);

        let outcome = publisher
            .publish(&post, |draft| {
                asked.set(asked.get() + 1);
                assert!(draft.contains("A draft post"));
                assert!(draft.contains("Image: none"));
                Ok(false)
            })
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::Aborted);
        assert_eq!(asked.get(), 1);
    }

    #[tokio::test]
    async fn test_missing_organization_id_fails_before_any_network_call() {
        let publisher = publisher(Some("abc123"), None);
        let post = Post::new("Company news", PostTarget::Organization);

        let err = publisher.publish(&post, |_| Ok(true)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_draft_reports_image_presence() {
        let publisher = publisher(None, None);
        let post = Post::new("With picture", PostTarget::Personal).with_image(vec![1, 2, 3]);

        // Person id is absent, so the run stops right after confirmation;
        // the draft passed to the port is what we are checking here.
        let err = publisher
            .publish(&post, |draft| {
                assert!(draft.contains("Image: attached"));
                Ok(true)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::Configuration(_))
        ));
    }
}
