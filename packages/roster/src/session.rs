//! Edit session state machine.
//!
//! ```text
//!            start_editing()
//!   Viewing ─────────────────► Editing { original_roster, ledger }
//!      ▲                          │
//!      └──── cancel_editing() ────┤  restore deletes, drop overlays
//!      └──── confirm_update() ────┘  dispatch, drop overlays
//! ```
//!
//! Staging is synchronous and optimistic. Only `confirm_update` talks to the
//! roster service, and it does not wait for the calls it issues.

use tracing::{debug, info};

use crate::dialog::{EditDecision, EditDialog, EditPrompt};
use crate::dispatch::{Dispatch, RequestDispatcher};
use crate::error::{Result, RosterError};
use crate::ledger::StagingLedger;
use crate::model::{Membership, MembershipId, PermissionLevel};
use crate::store::MembershipStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing,
}

#[derive(Debug)]
enum Mode {
    Viewing,
    Editing {
        original_roster: Vec<Membership>,
        ledger: StagingLedger,
    },
}

/// Bulk-edit session over one organization's roster.
///
/// Works on the store owned by its dispatcher.
#[derive(Debug)]
pub struct EditSession {
    dispatcher: RequestDispatcher,
    mode: Mode,
}

impl EditSession {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self {
            dispatcher,
            mode: Mode::Viewing,
        }
    }

    pub fn store(&self) -> &MembershipStore {
        self.dispatcher.store()
    }

    pub fn state(&self) -> SessionState {
        match self.mode {
            Mode::Viewing => SessionState::Viewing,
            Mode::Editing { .. } => SessionState::Editing,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.state() == SessionState::Editing
    }

    /// Ledger of the active session, if any.
    pub fn ledger(&self) -> Option<&StagingLedger> {
        match &self.mode {
            Mode::Editing { ledger, .. } => Some(ledger),
            Mode::Viewing => None,
        }
    }

    /// Snapshot the roster and enter editing. Returns `false` if already editing.
    pub fn start_editing(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }

        let original_roster: Vec<Membership> = self
            .store()
            .snapshot()
            .iter()
            .map(Membership::committed)
            .collect();
        info!(members = original_roster.len(), "Edit session started");

        self.mode = Mode::Editing {
            original_roster,
            ledger: StagingLedger::new(),
        };
        true
    }

    /// Discard every staged change. Returns `false` if not editing.
    pub fn cancel_editing(&mut self) -> bool {
        let Mode::Editing {
            original_roster,
            ledger,
        } = std::mem::replace(&mut self.mode, Mode::Viewing)
        else {
            return false;
        };

        let store = self.dispatcher.store();
        ledger.clear_overlays(store);
        let restored = ledger.restore_deletes(store, &original_roster);
        store.clear_selection();

        info!(restored, "Edit session cancelled");
        true
    }

    /// Commit staged changes and leave editing.
    ///
    /// Issues one delete per staged deletion and one update per staged edit
    /// that differs from the committed values. Edits equal to the committed
    /// values are dropped without a call. The calls run in the background;
    /// the returned handle can be awaited for their outcomes.
    pub fn confirm_update(&mut self) -> Dispatch {
        let Mode::Editing { ledger, .. } = std::mem::replace(&mut self.mode, Mode::Viewing) else {
            return Dispatch::empty();
        };

        let store = self.dispatcher.store();
        let deletes = ledger.staged_deletes();
        let updates = ledger.staged_updates(store);

        let mut dispatch = Dispatch::empty();
        for membership in &deletes {
            dispatch.push(self.dispatcher.delete(membership));
        }
        for membership in &updates {
            dispatch.push(self.dispatcher.update(membership));
        }

        ledger.clear_overlays(store);
        store.clear_selection();

        info!(
            deletes = deletes.len(),
            updates = updates.len(),
            "Edit session committed"
        );
        dispatch
    }

    fn editing(&mut self) -> Result<&mut StagingLedger> {
        match &mut self.mode {
            Mode::Editing { ledger, .. } => Ok(ledger),
            Mode::Viewing => Err(RosterError::NotEditing),
        }
    }

    pub fn stage_delete(&mut self, memberships: &[Membership]) -> Result<()> {
        let store = self.dispatcher.store().clone();
        self.editing()?.stage_delete(&store, memberships)
    }

    /// Stage deletion of every membership selected for bulk action.
    pub fn stage_delete_selected(&mut self) -> Result<usize> {
        let selected = self.store().selected();
        self.stage_delete(&selected)?;
        Ok(selected.len())
    }

    pub fn stage_update(
        &mut self,
        id: MembershipId,
        title: impl Into<String>,
        permission_level: PermissionLevel,
    ) -> Result<()> {
        let store = self.dispatcher.store().clone();
        self.editing()?
            .stage_update(&store, id, title.into(), permission_level)
    }

    /// Prompt an edit dialog should open with for `id`.
    ///
    /// Shows the staged values when the record already has a staged edit.
    pub fn edit_prompt(&self, id: MembershipId) -> Result<EditPrompt> {
        let ledger = self.ledger().ok_or(RosterError::NotEditing)?;
        let (title, permission_level) = ledger.edit_defaults(self.store(), id)?;
        let member_name = self
            .store()
            .get(id)
            .map(|m| m.user.full_name())
            .unwrap_or_default();

        Ok(EditPrompt {
            membership_id: id,
            member_name,
            title,
            permission_level,
        })
    }

    /// Open `dialog` for `id` and stage the answer if it is confirmed.
    pub async fn edit_membership(
        &mut self,
        id: MembershipId,
        dialog: &dyn EditDialog,
    ) -> Result<EditDecision> {
        let prompt = self.edit_prompt(id)?;
        let decision = dialog.prompt(prompt).await?;

        match &decision {
            EditDecision::Confirmed {
                title,
                permission_level,
            } => self.stage_update(id, title.clone(), *permission_level)?,
            EditDecision::Cancelled => {
                debug!(membership_id = %id, "Edit dialog cancelled");
            }
        }
        Ok(decision)
    }

    /// Number of staged changes; zero outside an edit session.
    pub fn change_count(&self) -> usize {
        self.ledger()
            .map(|ledger| ledger.change_count(self.store()))
            .unwrap_or(0)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.change_count() > 0
    }
}
