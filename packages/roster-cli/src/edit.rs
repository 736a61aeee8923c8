//! Interactive edit session

use anyhow::Result;
use dialoguer::{MultiSelect, Select};
use roster::{EditDecision, EditSession, Membership, MembershipId, PolicyReactor};

use crate::context::{AppContext, Tone};
use crate::dialog::TerminalDialog;
use crate::render;

#[derive(Debug, Clone, Copy)]
enum Action {
    EditMember,
    SelectMembers,
    DeleteSelected,
    AcceptSelected,
    RejectSelected,
    Save,
    Discard,
}

impl Action {
    const ALL: [Action; 7] = [
        Action::EditMember,
        Action::SelectMembers,
        Action::DeleteSelected,
        Action::AcceptSelected,
        Action::RejectSelected,
        Action::Save,
        Action::Discard,
    ];

    fn label(&self) -> &'static str {
        match self {
            Action::EditMember => "Edit a member",
            Action::SelectMembers => "Select members",
            Action::DeleteSelected => "Remove selected members",
            Action::AcceptSelected => "Accept selected requests",
            Action::RejectSelected => "Reject selected requests",
            Action::Save => "Save changes",
            Action::Discard => "Discard changes",
        }
    }
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let store = ctx.load_roster().await?;
    let dispatcher = ctx.dispatcher(store);
    let reactor = PolicyReactor::new(dispatcher.clone());
    let mut session = EditSession::new(dispatcher);
    session.start_editing();

    loop {
        ctx.heading(&format!("{} unsaved changes", session.change_count()));
        let roster = session.store().snapshot();
        render::print_roster(&roster);
        println!();

        let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
        let choice = Select::with_theme(&ctx.theme())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_opt()?;

        // Esc behaves like discard
        let action = choice.map_or(Action::Discard, |index| Action::ALL[index]);
        match action {
            Action::EditMember => {
                if let Some(id) = pick_member(ctx, &roster)? {
                    let decision = session.edit_membership(id, &TerminalDialog).await?;
                    if decision == EditDecision::Cancelled {
                        ctx.say(Tone::Warning, "Edit cancelled");
                    }
                }
            }
            Action::SelectMembers => select_members(ctx, &session, &roster)?,
            Action::DeleteSelected => {
                let count = session.stage_delete_selected()?;
                ctx.say(Tone::Success, &format!("Staged {} removals", count));
            }
            Action::AcceptSelected => {
                let events = reactor.accept_selected().settled().await;
                render::print_outcomes(&events);
            }
            Action::RejectSelected => {
                let events = reactor.reject_selected().settled().await;
                render::print_outcomes(&events);
            }
            Action::Save => {
                if !session.has_unsaved_changes() {
                    ctx.say(Tone::Warning, "Nothing to save");
                    session.cancel_editing();
                    return Ok(());
                }
                if !ctx.confirm(
                    &format!("Save {} changes?", session.change_count()),
                    true,
                )? {
                    continue;
                }
                let events = session.confirm_update().settled().await;
                render::print_outcomes(&events);
                if events.iter().all(|event| !event.is_failure()) {
                    ctx.say(Tone::Success, "Roster saved");
                }
                return Ok(());
            }
            Action::Discard => {
                if discard(ctx, &mut session)? {
                    return Ok(());
                }
            }
        }
    }
}

/// Returns false when the user backs out.
fn discard(ctx: &AppContext, session: &mut EditSession) -> Result<bool> {
    if session.has_unsaved_changes()
        && !ctx.confirm("Discard unsaved changes?", false)?
    {
        return Ok(false);
    }
    session.cancel_editing();
    ctx.say(Tone::Warning, "Changes discarded");
    Ok(true)
}

fn pick_member(ctx: &AppContext, roster: &[Membership]) -> Result<Option<MembershipId>> {
    let editable: Vec<&Membership> = roster.iter().filter(|m| m.id.is_some()).collect();
    if editable.is_empty() {
        ctx.say(Tone::Warning, "No members to edit");
        return Ok(None);
    }

    let labels: Vec<String> = editable
        .iter()
        .map(|m| format!("{} ({})", m.user.full_name(), m.title))
        .collect();
    let choice = Select::with_theme(&ctx.theme())
        .with_prompt("Member")
        .items(&labels)
        .interact_opt()?;

    Ok(choice.and_then(|index| editable[index].id))
}

fn select_members(ctx: &AppContext, session: &EditSession, roster: &[Membership]) -> Result<()> {
    let labels: Vec<String> = roster
        .iter()
        .map(|m| format!("{} [{}]", m.user.full_name(), m.status))
        .collect();
    let defaults: Vec<bool> = roster.iter().map(|m| m.selected_for_bulk_action).collect();

    let Some(chosen) = MultiSelect::with_theme(&ctx.theme())
        .with_prompt("Select members (space to toggle)")
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()?
    else {
        return Ok(());
    };

    let store = session.store();
    store.clear_selection();
    for index in chosen {
        if let Some(id) = roster[index].id {
            store.set_selected(id, true);
        }
    }
    Ok(())
}
