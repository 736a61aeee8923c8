// Test support - recording roster service and fixtures
//
// `MockRosterService` keeps a server-side copy of the roster, records every
// call before answering it, can fail chosen ids, and can hold answers back
// until released so tests can observe in-flight state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::{Result, RosterError};
use crate::model::{
    JoinPolicy, Membership, MembershipId, MembershipStatus, MembershipUpdate, Organization,
    OrganizationId, PermissionLevel, Term, TermId, User, UserId,
};
use crate::service::BaseRosterService;

pub const TEST_ORG_SLUG: &str = "chess-club";

/// Membership fixture. User id is `100 + id`; title `"Member"`, permission `MEMBER`.
pub fn membership(id: i64, status: MembershipStatus) -> Membership {
    Membership {
        id: Some(MembershipId(id)),
        user: User {
            id: UserId(100 + id),
            first_name: "Student".to_string(),
            last_name: id.to_string(),
            email: format!("student{}@example.edu", id),
        },
        organization_id: OrganizationId(1),
        organization_slug: TEST_ORG_SLUG.to_string(),
        title: "Member".to_string(),
        permission_level: PermissionLevel::Member,
        status,
        term: Term {
            id: TermId(2024),
            name: "Fall 2024".to_string(),
        },
        staged_title: None,
        staged_permission_level: None,
        selected_for_bulk_action: false,
    }
}

pub fn organization(join_policy: JoinPolicy) -> Organization {
    Organization {
        id: OrganizationId(1),
        slug: TEST_ORG_SLUG.to_string(),
        name: "Chess Club".to_string(),
        join_policy,
    }
}

/// A call received by [`MockRosterService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterCall {
    List { org_slug: String },
    Delete { org_slug: String, membership_id: MembershipId },
    Update { org_slug: String, update: MembershipUpdate },
}

impl RosterCall {
    pub fn membership_id(&self) -> Option<MembershipId> {
        match self {
            RosterCall::List { .. } => None,
            RosterCall::Delete { membership_id, .. } => Some(*membership_id),
            RosterCall::Update { update, .. } => Some(update.id),
        }
    }
}

#[derive(Default)]
struct MockState {
    roster: Vec<Membership>,
    calls: Vec<RosterCall>,
    failing: HashSet<MembershipId>,
}

#[derive(Clone)]
pub struct MockRosterService {
    state: Arc<Mutex<MockState>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockRosterService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            gate: None,
        }
    }

    /// Server-side roster returned by `list` and used to answer updates.
    pub fn with_roster(self, roster: Vec<Membership>) -> Self {
        self.state.lock().unwrap().roster = roster;
        self
    }

    /// Every call touching `id` fails with a 500.
    pub fn failing_for(self, id: MembershipId) -> Self {
        self.state.lock().unwrap().failing.insert(id);
        self
    }

    /// Hold every answer until [`release`](Self::release) is called.
    pub fn held(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let held calls answer.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.close();
        }
    }

    pub fn calls(&self) -> Vec<RosterCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, id: MembershipId) -> Vec<RosterCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.membership_id() == Some(id))
            .collect()
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RosterCall::List { org_slug } => Some(org_slug),
                _ => None,
            })
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<(String, MembershipId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RosterCall::Delete {
                    org_slug,
                    membership_id,
                } => Some((org_slug, membership_id)),
                _ => None,
            })
            .collect()
    }

    pub fn update_calls(&self) -> Vec<(String, MembershipUpdate)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RosterCall::Update { org_slug, update } => Some((org_slug, update)),
                _ => None,
            })
            .collect()
    }

    /// Server-side roster after the calls answered so far.
    pub fn server_roster(&self) -> Vec<Membership> {
        self.state.lock().unwrap().roster.clone()
    }

    fn record(&self, call: RosterCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let failing = call
            .membership_id()
            .is_some_and(|id| state.failing.contains(&id));
        state.calls.push(call);

        if failing {
            return Err(RosterError::Api {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_for_release(&self) {
        if let Some(gate) = &self.gate {
            // Closed gate: every waiter passes
            let _ = gate.acquire().await;
        }
    }
}

impl Default for MockRosterService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRosterService for MockRosterService {
    async fn list(&self, org_slug: &str) -> Result<Vec<Membership>> {
        self.record(RosterCall::List {
            org_slug: org_slug.to_string(),
        })?;
        self.wait_for_release().await;
        Ok(self.server_roster())
    }

    async fn delete(&self, org_slug: &str, membership_id: MembershipId) -> Result<()> {
        let recorded = self.record(RosterCall::Delete {
            org_slug: org_slug.to_string(),
            membership_id,
        });
        self.wait_for_release().await;
        recorded?;

        let mut state = self.state.lock().unwrap();
        state.roster.retain(|m| m.id != Some(membership_id));
        Ok(())
    }

    async fn update(&self, org_slug: &str, update: MembershipUpdate) -> Result<Membership> {
        let recorded = self.record(RosterCall::Update {
            org_slug: org_slug.to_string(),
            update: update.clone(),
        });
        self.wait_for_release().await;
        recorded?;

        let mut state = self.state.lock().unwrap();
        let index = match state.roster.iter().position(|m| m.id == Some(update.id)) {
            Some(index) => index,
            None => {
                let mut fresh = membership(update.id.0, MembershipStatus::Active);
                fresh.user.id = update.user_id;
                state.roster.push(fresh);
                state.roster.len() - 1
            }
        };

        let stored = &mut state.roster[index];
        if let Some(title) = update.title {
            stored.title = title;
        }
        if let Some(permission_level) = update.permission_level {
            stored.permission_level = permission_level;
        }
        if let Some(status) = update.status {
            stored.status = status;
        }
        Ok(stored.clone())
    }
}
