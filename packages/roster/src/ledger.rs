//! Staging ledger.
//!
//! Records which memberships an edit session proposes to delete and which
//! carry a staged title/permission edit. Deletions are applied to the store
//! optimistically; edits live in the records' overlay fields until commit.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{Result, RosterError};
use crate::model::{Membership, MembershipId, PermissionLevel};
use crate::store::MembershipStore;

#[derive(Debug, Clone, Default)]
pub struct StagingLedger {
    deletes: IndexMap<MembershipId, Membership>,
    updates: IndexSet<MembershipId>,
}

impl StagingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `memberships` from the store and record them for deletion.
    ///
    /// Entries are deduplicated by id. Any staged edit on a deleted record is
    /// dropped with it. Bulk selection is cleared. Fails without touching
    /// anything if a membership has no id.
    pub fn stage_delete(&mut self, store: &MembershipStore, memberships: &[Membership]) -> Result<()> {
        let ids = memberships
            .iter()
            .map(|m| m.id.ok_or(RosterError::MissingId))
            .collect::<Result<Vec<_>>>()?;

        for (id, membership) in ids.into_iter().zip(memberships) {
            let removed = store.remove(id).unwrap_or_else(|| membership.clone());
            self.updates.shift_remove(&id);
            self.deletes.entry(id).or_insert_with(|| removed.committed());
            debug!(membership_id = %id, "Staged membership deletion");
        }

        store.clear_selection();
        Ok(())
    }

    /// Stage a title/permission edit on the stored record.
    ///
    /// Staging the same record again overwrites the overlay; the record is
    /// tracked once.
    pub fn stage_update(
        &mut self,
        store: &MembershipStore,
        id: MembershipId,
        title: String,
        permission_level: PermissionLevel,
    ) -> Result<()> {
        let staged = store.update(id, |m| {
            m.staged_title = Some(title);
            m.staged_permission_level = Some(permission_level);
        });
        if !staged {
            return Err(RosterError::NotFound(id));
        }

        self.updates.insert(id);
        debug!(membership_id = %id, "Staged membership update");
        Ok(())
    }

    /// Values an edit dialog should open with: the staged edit if there is
    /// one, the committed values otherwise.
    pub fn edit_defaults(
        &self,
        store: &MembershipStore,
        id: MembershipId,
    ) -> Result<(String, PermissionLevel)> {
        let membership = store.get(id).ok_or(RosterError::NotFound(id))?;
        let title = membership
            .staged_title
            .clone()
            .unwrap_or_else(|| membership.title.clone());
        let permission_level = membership.resolved_permission_level();
        Ok((title, permission_level))
    }

    /// Staged deletions plus staged edits that actually differ from the
    /// committed values.
    pub fn change_count(&self, store: &MembershipStore) -> usize {
        self.deletes.len() + self.effective_update_count(store)
    }

    pub fn has_unsaved_changes(&self, store: &MembershipStore) -> bool {
        self.change_count(store) > 0
    }

    fn effective_update_count(&self, store: &MembershipStore) -> usize {
        store.read(|roster| {
            roster
                .iter()
                .filter(|m| m.id.is_some_and(|id| self.updates.contains(&id)))
                .filter(|m| m.overlay_differs())
                .count()
        })
    }

    pub fn is_staged_for_delete(&self, id: MembershipId) -> bool {
        self.deletes.contains_key(&id)
    }

    pub fn is_staged_for_update(&self, id: MembershipId) -> bool {
        self.updates.contains(&id)
    }

    /// Records staged for deletion, in staging order.
    pub fn staged_deletes(&self) -> Vec<Membership> {
        self.deletes.values().cloned().collect()
    }

    /// Stored records whose staged edit differs from the committed values.
    pub fn staged_updates(&self, store: &MembershipStore) -> Vec<Membership> {
        self.updates
            .iter()
            .filter_map(|id| store.get(*id))
            .filter(Membership::overlay_differs)
            .collect()
    }

    /// Drop every staged overlay from the store.
    pub fn clear_overlays(&self, store: &MembershipStore) {
        for id in &self.updates {
            store.update(*id, Membership::clear_overlay);
        }
    }

    /// Put staged deletions back into the store.
    ///
    /// Uses the copy from `original_roster` when present. Records whose id is
    /// already in the store are skipped. Returns the number reinserted.
    pub fn restore_deletes(&self, store: &MembershipStore, original_roster: &[Membership]) -> usize {
        let mut restored = 0;
        for (id, staged) in &self.deletes {
            let original = original_roster
                .iter()
                .find(|m| m.id == Some(*id))
                .unwrap_or(staged);
            if store.insert_if_absent(original.committed()) {
                restored += 1;
            }
        }
        restored
    }
}
