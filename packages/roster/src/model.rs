//! Roster domain types.
//!
//! Wire format is camelCase JSON with SCREAMING_CASE enum values, matching
//! the roster API. Overlay and selection fields are local-only and never
//! serialized.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Title assigned when a staged title resolves to blank.
pub const DEFAULT_TITLE: &str = "Member";

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identity assigned by the remote store. Sole key for dedup and reconciliation.
    MembershipId
);
numeric_id!(UserId);
numeric_id!(OrganizationId);
numeric_id!(TermId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    Member,
    Admin,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::Member => write!(f, "MEMBER"),
            PermissionLevel::Admin => write!(f, "ADMIN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Active,
    Pending,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipStatus::Active => write!(f, "ACTIVE"),
            MembershipStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// How an organization handles incoming join requests.
///
/// - `Open`: requests are accepted automatically
/// - `Apply`: requests wait for manual review
/// - `Closed`: requests are rejected automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinPolicy {
    Open,
    Apply,
    Closed,
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinPolicy::Open => write!(f, "OPEN"),
            JoinPolicy::Apply => write!(f, "APPLY"),
            JoinPolicy::Closed => write!(f, "CLOSED"),
        }
    }
}

impl FromStr for JoinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(JoinPolicy::Open),
            "APPLY" => Ok(JoinPolicy::Apply),
            "CLOSED" => Ok(JoinPolicy::Closed),
            other => Err(format!("unknown join policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Academic term a membership applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: TermId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub join_policy: JoinPolicy,
}

/// One user's membership in one organization for one term.
///
/// `staged_title` and `staged_permission_level` are a proposed replacement
/// for the committed fields. They are `None` unless an edit is staged and
/// only become authoritative once a commit succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Option<MembershipId>,
    pub user: User,
    pub organization_id: OrganizationId,
    pub organization_slug: String,
    pub title: String,
    pub permission_level: PermissionLevel,
    pub status: MembershipStatus,
    pub term: Term,

    #[serde(skip)]
    pub staged_title: Option<String>,
    #[serde(skip)]
    pub staged_permission_level: Option<PermissionLevel>,
    #[serde(skip)]
    pub selected_for_bulk_action: bool,
}

impl Membership {
    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    pub fn has_overlay(&self) -> bool {
        self.staged_title.is_some() || self.staged_permission_level.is_some()
    }

    /// Whether the staged overlay proposes a value different from the committed one.
    ///
    /// Compares the raw staged title. A blank staged title counts as a change
    /// even when the fallback it resolves to equals the committed title.
    pub fn overlay_differs(&self) -> bool {
        let title_changed = self
            .staged_title
            .as_ref()
            .is_some_and(|staged| *staged != self.title);
        let level_changed = self
            .staged_permission_level
            .is_some_and(|staged| staged != self.permission_level);
        title_changed || level_changed
    }

    /// Title that a commit would send: staged if present, committed otherwise,
    /// with blank titles replaced by `fallback`.
    pub fn resolved_title(&self, fallback: &str) -> String {
        let title = self.staged_title.as_deref().unwrap_or(&self.title);
        if title.trim().is_empty() {
            fallback.to_string()
        } else {
            title.to_string()
        }
    }

    pub fn resolved_permission_level(&self) -> PermissionLevel {
        self.staged_permission_level
            .unwrap_or(self.permission_level)
    }

    pub fn clear_overlay(&mut self) {
        self.staged_title = None;
        self.staged_permission_level = None;
    }

    /// Committed fields only, with ephemeral state dropped.
    pub fn committed(&self) -> Membership {
        let mut copy = self.clone();
        copy.clear_overlay();
        copy.selected_for_bulk_action = false;
        copy
    }

    fn update_base(&self, id: MembershipId) -> MembershipUpdate {
        MembershipUpdate {
            id,
            user_id: self.user.id,
            organization_id: self.organization_id,
            term_id: self.term.id,
            title: None,
            permission_level: None,
            status: None,
        }
    }

    /// Update request carrying the resolved staged edit. `None` without an id.
    pub fn staged_update_request(&self, fallback_title: &str) -> Option<MembershipUpdate> {
        let id = self.id?;
        Some(MembershipUpdate {
            title: Some(self.resolved_title(fallback_title)),
            permission_level: Some(self.resolved_permission_level()),
            ..self.update_base(id)
        })
    }

    /// Update request that activates a pending request while preserving its role.
    pub fn accept_request(&self) -> Option<MembershipUpdate> {
        let id = self.id?;
        Some(MembershipUpdate {
            title: Some(self.title.clone()),
            permission_level: Some(self.permission_level),
            status: Some(MembershipStatus::Active),
            ..self.update_base(id)
        })
    }
}

/// Partial update payload. Omitted optional fields are left unchanged server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipUpdate {
    pub id: MembershipId,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub term_id: TermId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<PermissionLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MembershipStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::membership;

    #[test]
    fn overlay_equal_to_committed_is_not_a_diff() {
        let mut m = membership(4, MembershipStatus::Active);
        m.staged_title = Some("Member".into());
        m.staged_permission_level = Some(PermissionLevel::Member);

        assert!(m.has_overlay());
        assert!(!m.overlay_differs());
    }

    #[test]
    fn blank_staged_title_is_a_diff_even_when_it_resolves_to_committed() {
        let mut m = membership(4, MembershipStatus::Active);
        m.staged_title = Some(String::new());

        assert!(m.overlay_differs());
        assert_eq!(m.resolved_title(DEFAULT_TITLE), m.title);
        let request = m.staged_update_request(DEFAULT_TITLE).unwrap();
        assert_eq!(request.title.as_deref(), Some("Member"));
    }

    #[test]
    fn blank_staged_title_falls_back_to_default() {
        let mut m = membership(1, MembershipStatus::Active);
        m.title = "Treasurer".into();
        m.staged_title = Some("   ".into());

        assert_eq!(m.resolved_title(DEFAULT_TITLE), "Member");
    }

    #[test]
    fn accept_request_preserves_role() {
        let mut m = membership(1, MembershipStatus::Pending);
        m.title = "Secretary".into();
        m.permission_level = PermissionLevel::Admin;

        let update = m.accept_request().unwrap();
        assert_eq!(update.status, Some(MembershipStatus::Active));
        assert_eq!(update.title.as_deref(), Some("Secretary"));
        assert_eq!(update.permission_level, Some(PermissionLevel::Admin));
    }

    #[test]
    fn update_payload_omits_unset_fields() {
        let m = membership(7, MembershipStatus::Active);
        let mut update = m.staged_update_request(DEFAULT_TITLE).unwrap();
        update.permission_level = None;

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["userId"], 107);
        assert_eq!(json["title"], "Member");
        assert!(json.get("permissionLevel").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn overlay_is_never_serialized() {
        let mut m = membership(2, MembershipStatus::Active);
        m.staged_title = Some("Treasurer".into());
        m.selected_for_bulk_action = true;

        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("stagedTitle").is_none());
        assert!(json.get("selectedForBulkAction").is_none());
        assert_eq!(json["permissionLevel"], "MEMBER");
        assert_eq!(json["status"], "ACTIVE");
    }

    #[test]
    fn join_policy_parses_case_insensitively() {
        assert_eq!("open".parse::<JoinPolicy>().unwrap(), JoinPolicy::Open);
        assert_eq!("CLOSED".parse::<JoinPolicy>().unwrap(), JoinPolicy::Closed);
        assert!("sometimes".parse::<JoinPolicy>().is_err());
    }
}
