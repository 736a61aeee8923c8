//! Edit session staging and cancellation.

mod common;

use crate::common::{club_roster, ids, normalized, RosterHarness};
use roster::{MembershipId, PermissionLevel, RosterError, SessionState};
use test_context::test_context;

// =============================================================================
// Cancel reverts
// =============================================================================

/// Staged edit is dropped on cancel and the committed values come back.
#[test_context(RosterHarness)]
#[tokio::test]
async fn cancel_reverts_staged_update(ctx: &mut RosterHarness) {
    let mut session = ctx.session();

    session.start_editing();
    session
        .stage_update(MembershipId(2), "Treasurer", PermissionLevel::Admin)
        .unwrap();
    session.cancel_editing();

    let reverted = ctx.store.get(MembershipId(2)).unwrap();
    assert_eq!(reverted.title, "Member");
    assert_eq!(reverted.permission_level, PermissionLevel::Member);
    assert!(!reverted.has_overlay());
    assert_eq!(session.state(), SessionState::Viewing);
}

/// Any mix of staged deletes and edits cancels back to the starting roster.
#[test_context(RosterHarness)]
#[tokio::test]
async fn cancel_restores_starting_roster(ctx: &mut RosterHarness) {
    let mut session = ctx.session();
    let before = normalized(ctx.store.snapshot());

    session.start_editing();
    session
        .stage_update(MembershipId(1), "", PermissionLevel::Member)
        .unwrap();
    let first = ctx.store.get(MembershipId(3)).unwrap();
    session.stage_delete(&[first]).unwrap();
    session
        .stage_update(MembershipId(4), "Secretary", PermissionLevel::Admin)
        .unwrap();
    ctx.store.set_selected(MembershipId(4), true);
    ctx.store.set_selected(MembershipId(5), true);
    session.stage_delete_selected().unwrap();
    session
        .stage_update(MembershipId(2), "Chair", PermissionLevel::Member)
        .unwrap();
    assert_eq!(ctx.store.len(), 3);

    session.cancel_editing();

    assert_eq!(normalized(ctx.store.snapshot()), before);
    assert!(ctx.store.snapshot().iter().all(|m| !m.has_overlay()));
    assert!(ctx.service.calls().is_empty());
}

/// A deleted record that reappeared meanwhile is not duplicated on cancel.
#[test_context(RosterHarness)]
#[tokio::test]
async fn cancel_does_not_duplicate_reappeared_record(ctx: &mut RosterHarness) {
    let mut session = ctx.session();

    session.start_editing();
    let target = ctx.store.get(MembershipId(3)).unwrap();
    session.stage_delete(&[target.clone()]).unwrap();
    ctx.store.insert(target);
    session.cancel_editing();

    assert_eq!(ids(&ctx.store.snapshot()), ids(&club_roster()));
}

// =============================================================================
// Change count
// =============================================================================

/// Staging values equal to the committed ones counts as no change.
#[test_context(RosterHarness)]
#[tokio::test]
async fn no_op_update_counts_zero(ctx: &mut RosterHarness) {
    let mut session = ctx.session();

    session.start_editing();
    session
        .stage_update(MembershipId(4), "Member", PermissionLevel::Member)
        .unwrap();

    assert_eq!(session.change_count(), 0);
    assert!(!session.has_unsaved_changes());
}

/// Count tracks deletes plus edits that really differ, across restaging.
#[test_context(RosterHarness)]
#[tokio::test]
async fn change_count_matches_real_diffs(ctx: &mut RosterHarness) {
    let mut session = ctx.session();
    session.start_editing();

    session
        .stage_update(MembershipId(2), "Treasurer", PermissionLevel::Member)
        .unwrap();
    assert_eq!(session.change_count(), 1);

    session
        .stage_update(MembershipId(2), "Treasurer", PermissionLevel::Admin)
        .unwrap();
    assert_eq!(session.change_count(), 1);

    session
        .stage_update(MembershipId(1), "President", PermissionLevel::Admin)
        .unwrap();
    assert_eq!(session.change_count(), 1);

    let target = ctx.store.get(MembershipId(3)).unwrap();
    session.stage_delete(&[target.clone(), target]).unwrap();
    assert_eq!(session.change_count(), 2);

    session
        .stage_update(MembershipId(2), "Member", PermissionLevel::Member)
        .unwrap();
    assert_eq!(session.change_count(), 1);
    assert!(session.has_unsaved_changes());
}

// =============================================================================
// Staged edit visibility
// =============================================================================

/// Reopening an edit shows the staged values, not the committed ones.
#[test_context(RosterHarness)]
#[tokio::test]
async fn reopened_edit_shows_staged_values(ctx: &mut RosterHarness) {
    let mut session = ctx.session();
    session.start_editing();

    let prompt = session.edit_prompt(MembershipId(1)).unwrap();
    assert_eq!(prompt.title, "President");
    assert_eq!(prompt.member_name, "Student 1");

    session
        .stage_update(MembershipId(1), "Vice President", PermissionLevel::Member)
        .unwrap();

    let prompt = session.edit_prompt(MembershipId(1)).unwrap();
    assert_eq!(prompt.title, "Vice President");
    assert_eq!(prompt.permission_level, PermissionLevel::Member);
}

/// Prompts are only available inside a session.
#[test_context(RosterHarness)]
#[tokio::test]
async fn edit_prompt_requires_session(ctx: &mut RosterHarness) {
    let session = ctx.session();
    let err = session.edit_prompt(MembershipId(1)).unwrap_err();
    assert!(matches!(err, RosterError::NotEditing));
}
