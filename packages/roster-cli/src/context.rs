//! Application context with shared state and utilities

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use roster::{Config, MembershipStore, RequestDispatcher, RosterClient};
use tracing::debug;

/// Application context passed to all commands
pub struct AppContext {
    pub config: Config,
    pub client: Arc<RosterClient>,
    pub quiet: bool,
}

impl AppContext {
    pub fn new(config: Config, quiet: bool) -> Self {
        let client = Arc::new(RosterClient::from_config(&config));
        Self {
            config,
            client,
            quiet,
        }
    }

    pub async fn load_roster(&self) -> Result<MembershipStore> {
        debug!(org = %self.config.org_slug, api = %self.config.api_url, "Loading roster");
        MembershipStore::load(self.client.as_ref(), &self.config.org_slug)
            .await
            .with_context(|| format!("Failed to load roster for {}", self.config.org_slug))
    }

    pub fn dispatcher(&self, store: MembershipStore) -> RequestDispatcher {
        RequestDispatcher::new(self.client.clone(), store)
            .with_default_title(self.config.default_title.clone())
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    /// Ask a yes/no question. Quiet or unattended runs take `default`.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.quiet || !console::user_attended() {
            debug!(prompt, default, "Confirmation skipped");
            return Ok(default);
        }
        let answer = Confirm::with_theme(&self.theme())
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }

    /// Section heading, prefixed with the organization being managed.
    pub fn heading(&self, msg: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!(
            "{} {}",
            style(&self.config.org_slug).cyan().bold(),
            style(msg).bold()
        );
    }

    pub fn say(&self, tone: Tone, msg: &str) {
        if self.quiet {
            return;
        }
        let styled = match tone {
            Tone::Success => style(msg).green(),
            Tone::Warning => style(msg).yellow(),
        };
        println!("{}", styled);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Tone {
    Success,
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_context() -> AppContext {
        AppContext::new(
            Config {
                api_url: "http://localhost:8080".into(),
                api_token: None,
                org_slug: "chess-club".into(),
                default_title: "Member".into(),
            },
            true,
        )
    }

    #[test]
    fn quiet_confirm_takes_the_default() {
        let ctx = quiet_context();

        assert!(ctx.confirm("Save 3 changes?", true).unwrap());
        assert!(!ctx.confirm("Discard unsaved changes?", false).unwrap());
    }
}
