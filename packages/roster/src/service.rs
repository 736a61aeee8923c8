// Roster service boundary
//
// Infrastructure trait only. The HTTP binding lives in `client`, the
// recording mock in `testing`.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Membership, MembershipId, MembershipUpdate};

#[async_trait]
pub trait BaseRosterService: Send + Sync {
    /// Fetch every membership of an organization.
    async fn list(&self, org_slug: &str) -> Result<Vec<Membership>>;

    /// Delete one membership.
    async fn delete(&self, org_slug: &str, membership_id: MembershipId) -> Result<()>;

    /// Partially update one membership and return the stored record.
    ///
    /// Optional fields left as `None` are not changed server-side.
    async fn update(&self, org_slug: &str, update: MembershipUpdate) -> Result<Membership>;
}
