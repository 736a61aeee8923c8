//! Roster and outcome rendering

use colored::Colorize;
use roster::{Membership, RosterEvent};

pub fn print_roster(memberships: &[Membership]) {
    if memberships.is_empty() {
        println!("{}", "No memberships".dimmed());
        return;
    }

    for (index, membership) in memberships.iter().enumerate() {
        println!("{}", roster_line(index, membership));
    }
}

pub fn roster_line(index: usize, membership: &Membership) -> String {
    let marker = if membership.selected_for_bulk_action {
        "[x]"
    } else {
        "[ ]"
    };
    let status = if membership.is_pending() {
        "pending".yellow()
    } else {
        "active".green()
    };
    let mut line = format!(
        "{} {:>3}. {:<28} {:<20} {:<7} {}",
        marker,
        index + 1,
        membership.user.full_name(),
        membership.title,
        membership.permission_level.to_string(),
        status
    );

    if membership.overlay_differs() {
        let staged = format!(
            "-> {} / {}",
            membership
                .staged_title
                .as_deref()
                .unwrap_or(&membership.title),
            membership.resolved_permission_level()
        );
        line.push_str(&format!("  {}", staged.cyan()));
    }
    line
}

pub fn print_outcomes(events: &[RosterEvent]) {
    let failed = events.iter().filter(|e| e.is_failure()).count();

    for event in events {
        match event {
            RosterEvent::OperationFailed {
                operation,
                membership_id,
                reason,
            } => println!(
                "  {} {} #{}: {}",
                "✗".red(),
                operation,
                membership_id,
                reason
            ),
            other => println!(
                "  {} {} #{}",
                "✓".green(),
                other.operation(),
                other.membership_id()
            ),
        }
    }

    if failed > 0 {
        println!(
            "{}",
            format!("{} of {} calls failed", failed, events.len()).red()
        );
    }
}
