//! Join-policy reactor.
//!
//! Compares successive organization states and, when the join policy
//! changes, accepts or rejects every pending request in the roster. Runs
//! independently of any edit session.
//!
//! Cascade flow:
//!
//! ```text
//!   APPLY/CLOSED → OPEN   accept every pending request
//!   APPLY/OPEN   → CLOSED reject every pending request
//!   *            → APPLY  nothing
//! ```

use tracing::{debug, info};

use crate::dispatch::{Dispatch, RequestDispatcher};
use crate::model::{JoinPolicy, Membership, Organization};
use crate::observe::Observer;

/// A join-policy change between two observed organization states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyTransition {
    pub from: JoinPolicy,
    pub to: JoinPolicy,
}

/// Bulk action a transition calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cascade {
    AcceptPending,
    RejectPending,
}

/// Explicit previous/current comparison of the join policy.
pub fn detect_transition(previous: &Organization, current: &Organization) -> Option<PolicyTransition> {
    (previous.join_policy != current.join_policy).then_some(PolicyTransition {
        from: previous.join_policy,
        to: current.join_policy,
    })
}

impl PolicyTransition {
    pub fn cascade(&self) -> Option<Cascade> {
        match self.to {
            JoinPolicy::Open => Some(Cascade::AcceptPending),
            JoinPolicy::Closed => Some(Cascade::RejectPending),
            JoinPolicy::Apply => None,
        }
    }
}

pub struct PolicyReactor {
    dispatcher: RequestDispatcher,
    last_seen: Option<Organization>,
}

impl PolicyReactor {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self {
            dispatcher,
            last_seen: None,
        }
    }

    /// Start from a known organization state so its policy is not treated
    /// as a change.
    pub fn with_baseline(mut self, organization: Organization) -> Self {
        self.last_seen = Some(organization);
        self
    }

    /// Record the latest organization state and decide what it calls for.
    ///
    /// The first observed state only sets the baseline.
    pub fn decide(&mut self, current: &Organization) -> Option<Cascade> {
        let previous = self.last_seen.replace(current.clone())?;
        let transition = detect_transition(&previous, current)?;
        info!(
            org = %current.slug,
            from = %transition.from,
            to = %transition.to,
            "Join policy changed"
        );
        transition.cascade()
    }

    /// Observe a new organization state and run any cascade it triggers.
    pub fn observe(&mut self, current: &Organization) -> Dispatch {
        match self.decide(current) {
            Some(cascade) => self.run(cascade),
            None => Dispatch::empty(),
        }
    }

    /// Apply `cascade` to the requests pending right now.
    pub fn run(&self, cascade: Cascade) -> Dispatch {
        let pending = self.dispatcher.store().pending();
        info!(?cascade, pending = pending.len(), "Running join-policy cascade");
        match cascade {
            Cascade::AcceptPending => self.accept_requests(&pending),
            Cascade::RejectPending => self.reject_requests(&pending),
        }
    }

    pub fn accept_request(&self, membership: &Membership) -> Dispatch {
        self.accept_requests(std::slice::from_ref(membership))
    }

    pub fn reject_request(&self, membership: &Membership) -> Dispatch {
        self.reject_requests(std::slice::from_ref(membership))
    }

    pub fn accept_requests(&self, memberships: &[Membership]) -> Dispatch {
        let mut dispatch = Dispatch::empty();
        for membership in memberships {
            dispatch.push(self.dispatcher.accept(membership));
        }
        dispatch
    }

    pub fn reject_requests(&self, memberships: &[Membership]) -> Dispatch {
        let mut dispatch = Dispatch::empty();
        for membership in memberships {
            dispatch.push(self.dispatcher.reject(membership));
        }
        dispatch
    }

    /// Accept every selected pending request and clear the selection.
    pub fn accept_selected(&self) -> Dispatch {
        let selected = self.dispatcher.store().selected();
        self.dispatcher.store().clear_selection();
        self.accept_requests(&selected)
    }

    /// Reject every selected pending request and clear the selection.
    pub fn reject_selected(&self) -> Dispatch {
        let selected = self.dispatcher.store().selected();
        self.dispatcher.store().clear_selection();
        self.reject_requests(&selected)
    }

    /// Follow organization states until the observable is dropped.
    ///
    /// The value current at call time becomes the baseline unless one was
    /// already set. Calls issued by cascades are not awaited.
    pub async fn watch(mut self, mut organizations: Observer<Organization>) {
        if self.last_seen.is_none() {
            self.last_seen = Some(organizations.current());
        }

        while let Some(organization) = organizations.changed().await {
            let dispatch = self.observe(&organization);
            if !dispatch.is_empty() {
                debug!(calls = dispatch.len(), "Cascade dispatched");
            }
        }

        debug!("Organization observable dropped, policy reactor stopping");
    }
}

impl std::fmt::Debug for PolicyReactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyReactor")
            .field("last_seen", &self.last_seen.as_ref().map(|o| o.join_policy))
            .finish()
    }
}
