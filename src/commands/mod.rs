//! Discord bot commands.
//!
//! Thin wrappers around the core update functions: each command locks the
//! store, calls into the core, persists when it mutated, and renders the
//! typed result. Failures inside a command are reported to the requester
//! and never crash the poll loop or other in-flight commands.

pub mod admin;
pub mod bounty;
pub mod clan;
pub mod stats;

use crate::types::{Context, Data, Error};

/// Every command, in registration order.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        stats::help(),
        stats::status(),
        stats::stats(),
        stats::rivalry(),
        stats::myrivalry(),
        stats::pvpleaderboard(),
        stats::top(),
        clan::createclan(),
        clan::joinclan(),
        clan::leaveclan(),
        clan::claninfo(),
        clan::clanleaderboard(),
        clan::transferleader(),
        bounty::bounty(),
        bounty::cancelbounty(),
        bounty::bounties(),
        admin::setupclan(),
        admin::setleader(),
        admin::renameclan(),
        admin::deleteclan(),
        admin::addtoclan(),
        admin::removefromclan(),
        admin::resetstats(),
        admin::cancelbountyadmin(),
        admin::setpoints(),
        admin::addpoints(),
        admin::givekill(),
        admin::addtime(),
        admin::uploadlogs(),
        admin::listplayers(),
        admin::config(),
        admin::setconfig(),
        admin::setchannel(),
        admin::setlogschannel(),
    ]
}

/// The invoking user's display name, which doubles as their player name.
/// Player records are keyed by free-form display names, not account ids.
pub(crate) async fn invoker_name(context: &Context<'_>) -> String {
    match context.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => context.author().display_name().to_string(),
    }
}

/// Whether the invoking user is the configured administrator.
pub(crate) fn is_owner(context: &Context<'_>) -> bool {
    context.author().id.get() == context.data().config.owner_id
}

/// Owner gate for admin commands; replies and returns `false` on rejection.
pub(crate) async fn ensure_owner(context: &Context<'_>) -> Result<bool, Error> {
    if !is_owner(context) {
        context
            .say("❌ Access denied: this command is owner-only.")
            .await?;
        return Ok(false);
    }
    Ok(true)
}

/// Ephemeral reply used by admin commands.
pub(crate) async fn reply_private(
    context: &Context<'_>,
    text: impl Into<String>,
) -> Result<(), Error> {
    context
        .send(
            poise::CreateReply::default()
                .content(text.into())
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
