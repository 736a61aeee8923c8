//! One-shot join-policy cascade

use anyhow::Result;
use roster::{JoinPolicy, Organization, OrganizationId, PolicyReactor};

use crate::context::{AppContext, Tone};
use crate::render;

pub async fn run(ctx: &AppContext, from: JoinPolicy, to: JoinPolicy) -> Result<()> {
    let store = ctx.load_roster().await?;
    let organization_id = store
        .snapshot()
        .first()
        .map(|m| m.organization_id)
        .unwrap_or(OrganizationId(0));

    let before = Organization {
        id: organization_id,
        slug: ctx.config.org_slug.clone(),
        name: ctx.config.org_slug.clone(),
        join_policy: from,
    };
    let after = Organization {
        join_policy: to,
        ..before.clone()
    };

    let pending = store.pending().len();
    let mut reactor = PolicyReactor::new(ctx.dispatcher(store)).with_baseline(before);

    ctx.heading(&format!("join policy {} -> {}", from, to));
    if from != to
        && pending > 0
        && !ctx.confirm(&format!("{} pending requests may be affected. Continue?", pending), true)?
    {
        return Ok(());
    }

    let dispatch = reactor.observe(&after);
    if dispatch.is_empty() {
        ctx.say(Tone::Warning, "No pending requests affected");
        return Ok(());
    }

    let events = dispatch.settled().await;
    render::print_outcomes(&events);
    ctx.say(Tone::Success, &format!("Processed {} pending requests", events.len()));
    Ok(())
}
