//! Request dispatcher.
//!
//! Translates staged and cascaded operations into roster service calls and
//! reconciles the responses back into the [`MembershipStore`].
//!
//! # Guarantees
//!
//! - **One call per operation**: no batching, no retry, no timeout
//! - **Non-blocking**: every call is spawned; the caller gets a [`Dispatch`]
//!   handle it may await or drop
//! - **No ordering**: calls settle in whatever order the server answers
//! - **No compensation**: a failed call leaves local state untouched and is
//!   reported as [`RosterEvent::OperationFailed`]
//!
//! Dispatching must happen inside a tokio runtime.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::{Operation, RosterEvent};
use crate::model::{Membership, MembershipId, DEFAULT_TITLE};
use crate::service::BaseRosterService;
use crate::store::MembershipStore;

/// Default channel capacity for outcome events.
const DEFAULT_CAPACITY: usize = 1024;

/// Handle over a set of in-flight remote calls.
///
/// Dropping it does not cancel anything.
#[derive(Debug, Default)]
pub struct Dispatch {
    handles: Vec<JoinHandle<RosterEvent>>,
}

impl Dispatch {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub(crate) fn push(&mut self, handle: Option<JoinHandle<RosterEvent>>) {
        self.handles.extend(handle);
    }

    /// Wait for every call to settle and collect the outcomes.
    pub async fn settled(self) -> Vec<RosterEvent> {
        join_all(self.handles)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(error = %e, "Dispatched roster call did not complete");
                    None
                }
            })
            .collect()
    }
}

/// Stateless bridge between the roster engine and [`BaseRosterService`].
#[derive(Clone)]
pub struct RequestDispatcher {
    service: Arc<dyn BaseRosterService>,
    store: MembershipStore,
    events: broadcast::Sender<RosterEvent>,
    default_title: Arc<str>,
}

impl RequestDispatcher {
    pub fn new(service: Arc<dyn BaseRosterService>, store: MembershipStore) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            service,
            store,
            events,
            default_title: Arc::from(DEFAULT_TITLE),
        }
    }

    /// Title substituted when a staged title resolves to blank.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = Arc::from(title.into());
        self
    }

    pub fn store(&self) -> &MembershipStore {
        &self.store
    }

    /// Subscribe to outcome events of every call issued after subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    /// Delete a membership staged for deletion.
    ///
    /// The record is expected to be gone from the store already; a success
    /// removes it again in case it was reinserted meanwhile.
    pub fn delete(&self, membership: &Membership) -> Option<JoinHandle<RosterEvent>> {
        let id = self.require_id(membership, Operation::Delete)?;
        let service = self.service.clone();
        let store = self.store.clone();
        let slug = membership.organization_slug.clone();

        Some(self.spawn(Operation::Delete, id, async move {
            service.delete(&slug, id).await?;
            store.remove(id);
            Ok(RosterEvent::MembershipDeleted { membership_id: id })
        }))
    }

    /// Persist a staged title/permission edit.
    ///
    /// On success the returned values are written into the stored record in
    /// place. A record removed in the meantime is not brought back.
    pub fn update(&self, membership: &Membership) -> Option<JoinHandle<RosterEvent>> {
        let id = self.require_id(membership, Operation::Update)?;
        let request = membership.staged_update_request(&self.default_title)?;
        let service = self.service.clone();
        let store = self.store.clone();
        let slug = membership.organization_slug.clone();

        Some(self.spawn(Operation::Update, id, async move {
            let saved = service.update(&slug, request).await?;
            let reconciled = store.update(id, |m| {
                m.title = saved.title.clone();
                m.permission_level = saved.permission_level;
            });
            if !reconciled {
                debug!(membership_id = %id, "Updated membership no longer in roster");
            }
            Ok(RosterEvent::MembershipUpdated {
                membership_id: id,
                title: saved.title,
                permission_level: saved.permission_level,
            })
        }))
    }

    /// Activate a pending join request, keeping its title and permission level.
    ///
    /// Ignored unless the membership has an id and is pending. The server
    /// record replaces the local one under the dispatched id; a record
    /// removed in the meantime is not brought back.
    pub fn accept(&self, membership: &Membership) -> Option<JoinHandle<RosterEvent>> {
        if !membership.is_pending() {
            return None;
        }
        let id = self.require_id(membership, Operation::Accept)?;
        let request = membership.accept_request()?;
        let service = self.service.clone();
        let store = self.store.clone();
        let slug = membership.organization_slug.clone();

        Some(self.spawn(Operation::Accept, id, async move {
            let accepted = service.update(&slug, request).await?;
            if !store.replace(id, accepted) {
                debug!(membership_id = %id, "Accepted membership no longer in roster");
            }
            Ok(RosterEvent::RequestAccepted { membership_id: id })
        }))
    }

    /// Reject a pending join request.
    ///
    /// Ignored unless the membership has an id and is pending.
    pub fn reject(&self, membership: &Membership) -> Option<JoinHandle<RosterEvent>> {
        if !membership.is_pending() {
            return None;
        }
        let id = self.require_id(membership, Operation::Reject)?;
        let service = self.service.clone();
        let store = self.store.clone();
        let slug = membership.organization_slug.clone();

        Some(self.spawn(Operation::Reject, id, async move {
            service.delete(&slug, id).await?;
            store.remove(id);
            Ok(RosterEvent::RequestRejected { membership_id: id })
        }))
    }

    fn require_id(&self, membership: &Membership, operation: Operation) -> Option<MembershipId> {
        if membership.id.is_none() {
            warn!(
                operation = %operation,
                user = %membership.user.id,
                "Skipping roster call for membership without id"
            );
        }
        membership.id
    }

    fn spawn<F>(&self, operation: Operation, id: MembershipId, call: F) -> JoinHandle<RosterEvent>
    where
        F: Future<Output = Result<RosterEvent>> + Send + 'static,
    {
        let events = self.events.clone();
        debug!(operation = %operation, membership_id = %id, "Dispatching roster call");

        tokio::spawn(async move {
            let event = match call.await {
                Ok(event) => {
                    debug!(operation = %operation, membership_id = %id, "Roster call succeeded");
                    event
                }
                Err(e) => {
                    warn!(
                        operation = %operation,
                        membership_id = %id,
                        remote = e.is_remote(),
                        error = %e,
                        "Roster call failed, local roster may be out of sync"
                    );
                    RosterEvent::OperationFailed {
                        operation,
                        membership_id: id,
                        reason: e.to_string(),
                    }
                }
            };
            // No subscribers is fine
            let _ = events.send(event.clone());
            event
        })
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("store_len", &self.store.len())
            .field("subscriber_count", &self.events.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MembershipStatus, PermissionLevel};
    use crate::testing::{membership, MockRosterService};

    fn dispatcher(service: MockRosterService, roster: Vec<Membership>) -> RequestDispatcher {
        RequestDispatcher::new(Arc::new(service), MembershipStore::new(roster))
    }

    #[tokio::test]
    async fn update_writes_server_values_in_place() {
        let service = MockRosterService::new();
        let mut m = membership(2, MembershipStatus::Active);
        m.staged_title = Some("Treasurer".into());
        m.staged_permission_level = Some(PermissionLevel::Admin);
        let dispatcher = dispatcher(service.clone(), vec![m.clone()]);

        let event = dispatcher.update(&m).unwrap().await.unwrap();

        assert_eq!(
            event,
            RosterEvent::MembershipUpdated {
                membership_id: MembershipId(2),
                title: "Treasurer".into(),
                permission_level: PermissionLevel::Admin,
            }
        );
        let stored = dispatcher.store().get(MembershipId(2)).unwrap();
        assert_eq!(stored.title, "Treasurer");
        assert_eq!(stored.permission_level, PermissionLevel::Admin);
        assert_eq!(service.update_calls().len(), 1);
    }

    #[tokio::test]
    async fn blank_title_uses_configured_default() {
        let service = MockRosterService::new();
        let mut m = membership(2, MembershipStatus::Active);
        m.staged_title = Some("  ".into());
        let dispatcher = dispatcher(service.clone(), vec![m.clone()]).with_default_title("Associate");

        dispatcher.update(&m).unwrap().await.unwrap();

        let calls = service.update_calls();
        assert_eq!(calls[0].1.title.as_deref(), Some("Associate"));
    }

    #[tokio::test]
    async fn update_does_not_resurrect_removed_record() {
        let service = MockRosterService::new();
        let mut m = membership(3, MembershipStatus::Active);
        m.staged_title = Some("Chair".into());
        let dispatcher = dispatcher(service, vec![]);

        dispatcher.update(&m).unwrap().await.unwrap();

        assert!(dispatcher.store().is_empty());
    }

    #[tokio::test]
    async fn accept_after_delete_does_not_resurrect_request() {
        let service = MockRosterService::new();
        let five = membership(5, MembershipStatus::Pending);
        let dispatcher = dispatcher(service, vec![five.clone()]);

        dispatcher.delete(&five).unwrap().await.unwrap();
        assert!(!dispatcher.store().contains(MembershipId(5)));

        let event = dispatcher.accept(&five).unwrap().await.unwrap();

        assert_eq!(
            event,
            RosterEvent::RequestAccepted {
                membership_id: MembershipId(5)
            }
        );
        assert!(dispatcher.store().is_empty());
    }

    #[tokio::test]
    async fn accept_and_reject_require_pending_status() {
        let service = MockRosterService::new();
        let active = membership(1, MembershipStatus::Active);
        let dispatcher = dispatcher(service.clone(), vec![active.clone()]);

        assert!(dispatcher.accept(&active).is_none());
        assert!(dispatcher.reject(&active).is_none());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_id_is_never_dispatched() {
        let service = MockRosterService::new();
        let mut m = membership(1, MembershipStatus::Pending);
        m.id = None;
        let dispatcher = dispatcher(service.clone(), vec![]);

        assert!(dispatcher.accept(&m).is_none());
        assert!(dispatcher.delete(&m).is_none());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn failures_are_reported_and_broadcast() {
        let service = MockRosterService::new().failing_for(MembershipId(5));
        let m = membership(5, MembershipStatus::Pending);
        let dispatcher = dispatcher(service, vec![m.clone()]);
        let mut events = dispatcher.subscribe();

        let event = dispatcher.reject(&m).unwrap().await.unwrap();

        assert!(event.is_failure());
        assert_eq!(event.operation(), Operation::Reject);
        assert_eq!(events.recv().await.unwrap(), event);
        // Rejection failed, so the request stays in the roster
        assert!(dispatcher.store().contains(MembershipId(5)));
    }

    #[tokio::test]
    async fn settled_collects_all_outcomes() {
        let service = MockRosterService::new();
        let roster = vec![
            membership(1, MembershipStatus::Pending),
            membership(2, MembershipStatus::Pending),
        ];
        let dispatcher = dispatcher(service, roster.clone());

        let mut dispatch = Dispatch::empty();
        for m in &roster {
            dispatch.push(dispatcher.accept(m));
        }
        assert_eq!(dispatch.len(), 2);

        let events = dispatch.settled().await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.operation() == Operation::Accept));
        assert!(dispatcher.store().pending().is_empty());
    }
}
