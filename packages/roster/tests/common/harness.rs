//! Test harness wiring the roster engine to a recording mock service.
//!
//! Each test gets a fresh store seeded with [`club_roster`], a mock service
//! holding the same roster server-side, and a dispatcher over both.

use std::sync::Arc;

use roster::testing::{organization, MockRosterService};
use roster::{
    EditSession, JoinPolicy, MembershipStore, Observable, Organization, PolicyReactor,
    RequestDispatcher,
};
use test_context::AsyncTestContext;

use super::club_roster;

/// Test harness over an in-memory roster.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(RosterHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut RosterHarness) {
///     let mut session = ctx.session();
///     // ... test code
/// }
/// ```
pub struct RosterHarness {
    pub service: MockRosterService,
    pub store: MembershipStore,
    pub dispatcher: RequestDispatcher,
    pub organization: Observable<Organization>,
}

impl AsyncTestContext for RosterHarness {
    async fn setup() -> Self {
        Self::new(MockRosterService::new())
    }

    async fn teardown(self) {
        // Spawned calls finish or are dropped with the runtime
    }
}

impl RosterHarness {
    pub fn new(service: MockRosterService) -> Self {
        // Initialize tracing subscriber to respect RUST_LOG environment variable.
        // Run tests with: RUST_LOG=roster=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let service = service.with_roster(club_roster());
        let store = MembershipStore::new(club_roster());
        let dispatcher = RequestDispatcher::new(Arc::new(service.clone()), store.clone());

        Self {
            service,
            store,
            dispatcher,
            organization: Observable::new(organization(JoinPolicy::Apply)),
        }
    }

    /// Harness whose service answers only after `service.release()`.
    pub fn held() -> Self {
        Self::new(MockRosterService::new().held())
    }

    pub fn session(&self) -> EditSession {
        EditSession::new(self.dispatcher.clone())
    }

    /// Reactor with the current organization state as its baseline.
    pub fn reactor(&self) -> PolicyReactor {
        PolicyReactor::new(self.dispatcher.clone()).with_baseline(self.organization.get())
    }

    pub fn set_join_policy(&self, join_policy: JoinPolicy) {
        self.organization.modify(|org| {
            let changed = org.join_policy != join_policy;
            org.join_policy = join_policy;
            changed
        });
    }
}

/// Poll until `done` holds, failing the test after a second.
pub async fn eventually(mut done: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(1);
    while !done() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }
}
