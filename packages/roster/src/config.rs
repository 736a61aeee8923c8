use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::model::DEFAULT_TITLE;

/// Roster engine configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub org_slug: String,
    pub default_title: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            api_url: lookup("ROSTER_API_URL").context("ROSTER_API_URL must be set")?,
            api_token: lookup("ROSTER_API_TOKEN").filter(|token| !token.is_empty()),
            org_slug: lookup("ROSTER_ORG_SLUG").context("ROSTER_ORG_SLUG must be set")?,
            default_title: lookup("ROSTER_DEFAULT_TITLE")
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        })
    }
}
