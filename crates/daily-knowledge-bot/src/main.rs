use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;
use shared::{
    confirm_from_stdin, daily_topic, format_post, load_topics, watermark, Archiver, BotError,
    Config, Fact, FactRetriever, GeminiImageClient, LinkedInClient, PerplexityClient, Post,
    PostTarget, PublishOutcome, Publisher,
};

#[derive(Parser)]
#[command(name = "daily-knowledge-bot")]
#[command(about = "Fetch a sourced daily fact, format a LinkedIn post, and optionally publish it")]
struct Args {
    /// Publish the generated content to LinkedIn after confirmation
    #[arg(long)]
    post_to_linkedin: bool,

    /// Post to the configured company page instead of the personal profile
    #[arg(long)]
    company: bool,

    /// Generate an illustrative image for the post
    #[arg(long)]
    add_image: bool,

    /// Skip the brand logo watermark on the generated image
    #[arg(long)]
    no_logo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    let topics = load_topics(&config.topics_file)?;
    let now = Utc::now();
    // Rotation follows the operator's calendar day, not UTC
    let topic = daily_topic(&topics, Local::now())?.to_string();
    println!("✓ Today's topic: {}", topic);

    println!("\n🔎 Finding an article about {}...", topic);
    let retriever = FactRetriever::new(PerplexityClient::new(config.perplexity_api_key.clone())?);
    let fact = retriever.retrieve(&topic, now).await?;
    println!("✓ Found article: {}", fact.source_url);
    println!("\nToday's {} fact: {}", fact.topic, fact.body);

    println!("\n📝 Formatting LinkedIn post...");
    let post_text = format_post(&fact);

    let mut image: Option<Vec<u8>> = None;
    if args.add_image {
        println!("\n🎨 Generating image for {}...", fact.topic);
        match generate_image(&config, &fact).await {
            Ok(bytes) => {
                image = Some(if args.no_logo {
                    bytes
                } else {
                    apply_watermark(&config, bytes)
                });
                println!("✓ Image generated");
            }
            Err(e) => {
                eprintln!("⚠ Image generation failed, continuing without an image: {}", e);
            }
        }
    }

    let archiver = Archiver::new(&config.output_dir);
    let fact_path = archiver.save_fact(&fact)?;
    println!("\n✓ Fact saved to {}", fact_path.display());
    let post_path = archiver.save_post(&post_text, now)?;
    println!("✓ Post saved to {}", post_path.display());
    if let Some(bytes) = &image {
        let image_path = archiver.save_image(&fact.topic, bytes, now)?;
        println!("✓ Image saved to {}", image_path.display());
    }

    if args.post_to_linkedin {
        let target = if args.company {
            PostTarget::Organization
        } else {
            PostTarget::Personal
        };
        let access_token = config.linkedin_access_token.clone().ok_or_else(|| {
            BotError::Configuration("LINKEDIN_ACCESS_TOKEN is not configured".to_string())
        })?;
        let client = LinkedInClient::new(
            access_token,
            config.linkedin_person_id.clone(),
            config.linkedin_organization_id.clone(),
        )?;

        let mut post = Post::new(post_text, target);
        if let Some(bytes) = image {
            post = post.with_image(bytes);
        }

        match Publisher::new(client).publish(&post, confirm_from_stdin).await? {
            PublishOutcome::Published => println!("\n✅ Posted to LinkedIn."),
            PublishOutcome::Aborted => println!("\nNothing was posted."),
        }
    }

    Ok(())
}

async fn generate_image(config: &Config, fact: &Fact) -> Result<Vec<u8>> {
    let api_key = config.google_api_key.clone().ok_or_else(|| {
        BotError::ImageGeneration("GOOGLE_API_KEY is not configured".to_string())
    })?;
    let client = GeminiImageClient::new(api_key)?;
    client.generate(&fact.topic, &fact.body).await
}

/// Watermarking is best-effort: a bad logo file should not cost us the image.
fn apply_watermark(config: &Config, image: Vec<u8>) -> Vec<u8> {
    match watermark::apply_logo(&image, &config.logo_file) {
        Ok(watermarked) => watermarked,
        Err(e) => {
            eprintln!("⚠ Could not add logo to image: {}", e);
            image
        }
    }
}
