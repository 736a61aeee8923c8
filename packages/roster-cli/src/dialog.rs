//! Terminal edit dialog

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use roster::{EditDecision, EditDialog, EditPrompt, PermissionLevel, RosterError};
use tracing::debug;

const LEVELS: [PermissionLevel; 2] = [PermissionLevel::Member, PermissionLevel::Admin];

/// Asks for a title and permission level on the terminal.
///
/// Prompts block, so they run on the blocking pool.
pub struct TerminalDialog;

#[async_trait]
impl EditDialog for TerminalDialog {
    async fn prompt(&self, prompt: EditPrompt) -> roster::Result<EditDecision> {
        match tokio::task::spawn_blocking(move || ask(&prompt)).await {
            Ok(Ok(decision)) => Ok(decision),
            Ok(Err(e)) => {
                debug!(error = %e, "Terminal prompt failed");
                Err(RosterError::DialogClosed)
            }
            Err(e) => {
                debug!(error = %e, "Terminal prompt task did not complete");
                Err(RosterError::DialogClosed)
            }
        }
    }
}

fn ask(prompt: &EditPrompt) -> dialoguer::Result<EditDecision> {
    let theme = ColorfulTheme::default();
    println!();
    println!("Editing {}", console::style(&prompt.member_name).cyan());

    let title: String = Input::with_theme(&theme)
        .with_prompt("Title")
        .with_initial_text(prompt.title.clone())
        .allow_empty(true)
        .interact_text()?;

    let current = LEVELS
        .iter()
        .position(|level| *level == prompt.permission_level)
        .unwrap_or(0);
    let labels: Vec<String> = LEVELS.iter().map(|level| level.to_string()).collect();
    let level = Select::with_theme(&theme)
        .with_prompt("Permission level")
        .items(&labels)
        .default(current)
        .interact_opt()?;

    // Esc on the level picker cancels the whole edit
    Ok(match level {
        Some(index) => EditDecision::Confirmed {
            title,
            permission_level: LEVELS[index],
        },
        None => EditDecision::Cancelled,
    })
}
