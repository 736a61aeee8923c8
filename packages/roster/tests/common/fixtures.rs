//! Roster fixtures shared by the integration tests.

use roster::testing::membership;
use roster::{Membership, MembershipId, MembershipStatus, PermissionLevel};

/// Four active members (ids 1-4) and two pending requests (ids 5-6).
pub fn club_roster() -> Vec<Membership> {
    let mut roster: Vec<Membership> = (1..=4)
        .map(|n| membership(n, MembershipStatus::Active))
        .collect();
    roster[0].title = "President".to_string();
    roster[0].permission_level = PermissionLevel::Admin;
    roster.push(membership(5, MembershipStatus::Pending));
    roster.push(membership(6, MembershipStatus::Pending));
    roster
}

pub fn ids(memberships: &[Membership]) -> Vec<MembershipId> {
    let mut ids: Vec<_> = memberships.iter().filter_map(|m| m.id).collect();
    ids.sort();
    ids
}

/// Roster sorted by id with ephemeral fields dropped, for set comparisons.
pub fn normalized(memberships: Vec<Membership>) -> Vec<Membership> {
    let mut roster: Vec<_> = memberships.iter().map(Membership::committed).collect();
    roster.sort_by_key(|m| m.id);
    roster
}
