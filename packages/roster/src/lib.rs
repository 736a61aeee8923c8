//! # Roster
//!
//! Staged bulk editing and join-policy reconciliation for an organization's
//! membership roster.
//!
//! ## Architecture
//!
//! ```text
//! UI intents
//!     │
//!     ├─► EditSession ──► StagingLedger ──► MembershipStore   (sync, optimistic)
//!     │        │ confirm_update()                 ▲
//!     │        ▼                                  │ reconcile
//!     │   RequestDispatcher ──spawn──► BaseRosterService
//!     │        ▲
//!     └─► PolicyReactor (join policy OPEN/CLOSED → accept/reject pending)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Overlays are proposals** - `staged_*` fields never become committed
//!    values except through a successful update response
//! 2. **Identity is the key** - ledger entries and responses are matched by
//!    membership id only
//! 3. **Cancel is a true revert** - without a concurrent cascade, cancelling
//!    restores the roster as it was when editing started
//! 4. **No-op edits are free** - a staged edit equal to the committed values
//!    is neither counted nor dispatched
//!
//! ## Guarantees
//!
//! - **Fire-and-forget calls**: nothing waits for the server unless the
//!   caller awaits the returned [`Dispatch`]
//! - **No ordering**: deletes, updates and cascade calls settle in any order
//! - **Last writer wins**: concurrent writes to the same id are not detected
//! - **Failures are observable**: failed calls are logged and broadcast as
//!   [`RosterEvent::OperationFailed`]; nothing is retried or compensated
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roster::{EditSession, MembershipStore, PermissionLevel, PolicyReactor, RequestDispatcher, RosterClient};
//!
//! let client = Arc::new(RosterClient::new(api_url, Some(token)));
//! let store = MembershipStore::load(client.as_ref(), "chess-club").await?;
//! let dispatcher = RequestDispatcher::new(client, store);
//!
//! let mut session = EditSession::new(dispatcher.clone());
//! session.start_editing();
//! session.stage_update(membership_id, "Treasurer", PermissionLevel::Admin)?;
//! let outcomes = session.confirm_update().settled().await;
//!
//! tokio::spawn(PolicyReactor::new(dispatcher).watch(organization.subscribe()));
//! ```

mod client;
mod config;
mod dialog;
mod dispatch;
mod error;
mod events;
mod ledger;
mod model;
mod observe;
mod policy;
mod service;
mod session;
mod store;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::RosterClient;
pub use config::Config;
pub use dialog::{DialogChannel, DialogRequest, EditDecision, EditDialog, EditPrompt};
pub use dispatch::{Dispatch, RequestDispatcher};
pub use error::{Result, RosterError};
pub use events::{Operation, RosterEvent};
pub use ledger::StagingLedger;
pub use model::{
    JoinPolicy, Membership, MembershipId, MembershipStatus, MembershipUpdate, Organization,
    OrganizationId, PermissionLevel, Term, TermId, User, UserId, DEFAULT_TITLE,
};
pub use observe::{Observable, Observer};
pub use policy::{detect_transition, Cascade, PolicyReactor, PolicyTransition};
pub use service::BaseRosterService;
pub use session::{EditSession, SessionState};
pub use store::MembershipStore;

// Re-export commonly used external types
pub use async_trait::async_trait;
