use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::error::BotError;

/// Process-wide configuration, loaded once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Config {
    pub perplexity_api_key: String,
    pub google_api_key: Option<String>,
    pub linkedin_access_token: Option<String>,
    pub linkedin_person_id: Option<String>,
    pub linkedin_organization_id: Option<String>,
    pub topics_file: PathBuf,
    pub output_dir: PathBuf,
    pub logo_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let perplexity_api_key = required_var("PERPLEXITY_API_KEY").ok_or_else(|| {
            BotError::Configuration(
                "PERPLEXITY_API_KEY not found.\n\n\
                To fix this, create ~/.config/daily-knowledge-bot/.env with:\n  \
                PERPLEXITY_API_KEY=your_key_here\n\n\
                Get your Perplexity API key from: https://www.perplexity.ai/settings/api"
                    .to_string(),
            )
        })?;

        Ok(Self {
            perplexity_api_key,
            google_api_key: required_var("GOOGLE_API_KEY"),
            linkedin_access_token: required_var("LINKEDIN_ACCESS_TOKEN"),
            linkedin_person_id: required_var("LINKEDIN_PERSON_ID"),
            linkedin_organization_id: required_var("LINKEDIN_ORGANIZATION_ID"),
            topics_file: path_var("TOPICS_FILE", "topics.txt"),
            output_dir: path_var("OUTPUT_DIR", "."),
            logo_file: path_var("LOGO_FILE", "brand_logo.png"),
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/daily-knowledge-bot/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("daily-knowledge-bot").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

/// Read a variable, treating blank values and template placeholders
/// (e.g. "YOUR_ACCESS_TOKEN_HERE") as unset.
fn required_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let value = value.trim().to_string();
            if value.is_empty() || value.contains("YOUR_") {
                None
            } else {
                Some(value)
            }
        }
        Err(_) => None,
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
