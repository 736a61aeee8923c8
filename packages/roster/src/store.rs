//! In-memory roster for one organization.
//!
//! Every mutation is a single atomic step over the shared list and notifies
//! subscribers. There is no versioning: concurrent writers to the same id
//! resolve as last-writer-wins.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::model::{Membership, MembershipId};
use crate::observe::{Observable, Observer};
use crate::service::BaseRosterService;

/// Shared handle to the roster. Clones point at the same list.
#[derive(Debug, Clone)]
pub struct MembershipStore {
    roster: Arc<Observable<Vec<Membership>>>,
}

impl MembershipStore {
    pub fn new(memberships: Vec<Membership>) -> Self {
        Self {
            roster: Arc::new(Observable::new(memberships)),
        }
    }

    /// Fetch the organization's roster and build a store from it.
    pub async fn load(service: &dyn BaseRosterService, org_slug: &str) -> Result<Self> {
        let memberships = service.list(org_slug).await?;
        debug!(org = org_slug, count = memberships.len(), "Roster loaded");
        Ok(Self::new(memberships))
    }

    /// Deep copy of the current roster.
    pub fn snapshot(&self) -> Vec<Membership> {
        self.roster.get()
    }

    /// Run `read` against the roster without copying it.
    pub(crate) fn read<R>(&self, read: impl FnOnce(&[Membership]) -> R) -> R {
        self.roster.read(|roster| read(roster))
    }

    pub fn subscribe(&self) -> Observer<Vec<Membership>> {
        self.roster.subscribe()
    }

    pub fn len(&self) -> usize {
        self.roster.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: MembershipId) -> Option<Membership> {
        self.roster
            .read(|roster| roster.iter().find(|m| m.id == Some(id)).cloned())
    }

    pub fn contains(&self, id: MembershipId) -> bool {
        self.roster
            .read(|roster| roster.iter().any(|m| m.id == Some(id)))
    }

    /// Memberships currently awaiting a join decision.
    pub fn pending(&self) -> Vec<Membership> {
        self.filtered(Membership::is_pending)
    }

    pub fn selected(&self) -> Vec<Membership> {
        self.filtered(|m| m.selected_for_bulk_action)
    }

    fn filtered(&self, keep: impl Fn(&Membership) -> bool) -> Vec<Membership> {
        self.roster
            .read(|roster| roster.iter().filter(|m| keep(*m)).cloned().collect())
    }

    pub fn insert(&self, membership: Membership) {
        self.roster.modify(|roster| {
            roster.push(membership);
            true
        });
    }

    /// Insert unless a record with the same id is already present.
    ///
    /// Returns `true` if the record was inserted.
    pub fn insert_if_absent(&self, membership: Membership) -> bool {
        self.roster.modify(|roster| {
            let exists = membership.id.is_some() && roster.iter().any(|m| m.id == membership.id);
            if !exists {
                roster.push(membership);
            }
            !exists
        })
    }

    /// Remove the record with `id` and insert `membership` under that id, in
    /// one step.
    ///
    /// Returns `false` and leaves the roster untouched if `id` is not present.
    pub fn replace(&self, id: MembershipId, mut membership: Membership) -> bool {
        membership.id = Some(id);
        self.roster.modify(|roster| {
            let Some(index) = roster.iter().position(|m| m.id == Some(id)) else {
                return false;
            };
            roster.remove(index);
            roster.push(membership);
            true
        })
    }

    pub fn remove(&self, id: MembershipId) -> Option<Membership> {
        let mut removed = None;
        self.roster.modify(|roster| {
            if let Some(index) = roster.iter().position(|m| m.id == Some(id)) {
                removed = Some(roster.remove(index));
            }
            removed.is_some()
        });
        removed
    }

    /// Apply `update` to the record with `id` in place.
    ///
    /// Returns `false` if no such record exists; nothing is inserted.
    pub fn update(&self, id: MembershipId, update: impl FnOnce(&mut Membership)) -> bool {
        self.roster.modify(|roster| match roster.iter_mut().find(|m| m.id == Some(id)) {
            Some(membership) => {
                update(membership);
                true
            }
            None => false,
        })
    }

    pub fn set_selected(&self, id: MembershipId, selected: bool) -> bool {
        self.update(id, |m| m.selected_for_bulk_action = selected)
    }

    pub fn toggle_selected(&self, id: MembershipId) -> bool {
        self.update(id, |m| m.selected_for_bulk_action = !m.selected_for_bulk_action)
    }

    pub fn clear_selection(&self) {
        self.roster.modify(|roster| {
            let mut changed = false;
            for m in roster.iter_mut().filter(|m| m.selected_for_bulk_action) {
                m.selected_for_bulk_action = false;
                changed = true;
            }
            changed
        });
    }
}

impl Default for MembershipStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
