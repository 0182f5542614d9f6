//! Administrator commands, gated on the configured owner id. Replies are
//! ephemeral so moderation actions do not clutter the channel.

use poise::serenity_prelude as serenity;

use crate::types::{Context, Error};
use clanwarden::events::process_events;
use clanwarden::logparse::parse_log;

use super::{ensure_owner, reply_private};

/// Create a clan with a leader and a full member roster in one step.
#[poise::command(slash_command)]
pub async fn setupclan(
    context: Context<'_>,
    #[description = "Clan name"] name: String,
    #[description = "Clan leader"] leader: String,
    #[description = "Comma-separated member names"] members: Option<String>,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let roster: Vec<String> = members
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.setup_clan(&name, &leader, &roster) {
            Ok(added) => {
                store.persist();
                format!(
                    "⚔️ Clan **{name}** set up with {} members: {}",
                    added.len(),
                    added.join(", ")
                )
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Force a clan's leader, regardless of who currently holds the title.
#[poise::command(slash_command)]
pub async fn setleader(
    context: Context<'_>,
    #[description = "Clan name"] clan: String,
    #[description = "The member to promote"] leader: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.set_leader(&clan, &leader) {
            Ok(previous) => {
                store.persist();
                match previous {
                    Some(old) => format!("👑 **{leader}** now leads **{clan}** (was {old})."),
                    None => format!("👑 **{leader}** now leads **{clan}**."),
                }
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Rename a clan; memberships and bounty escrows follow the new name.
#[poise::command(slash_command)]
pub async fn renameclan(
    context: Context<'_>,
    #[description = "Current name"] old: String,
    #[description = "New name"] new: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.rename_clan(&old, &new) {
            Ok(()) => {
                store.persist();
                format!("✏️ Clan **{old}** is now **{new}**.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Disband a clan. Its pending bounty escrows are forfeited, not refunded.
#[poise::command(slash_command)]
pub async fn deleteclan(
    context: Context<'_>,
    #[description = "Clan name"] name: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.delete_clan(&name) {
            Ok(outcome) => {
                store.persist();
                format!(
                    "💥 Clan **{name}** disbanded: {} members released, {} escrowed points forfeited.",
                    outcome.members_removed, outcome.forfeited_points
                )
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Move a player into a clan, bypassing the self-service flow.
#[poise::command(slash_command)]
pub async fn addtoclan(
    context: Context<'_>,
    #[description = "Player name"] player: String,
    #[description = "Clan name"] clan: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.add_to_clan(&player, &clan) {
            Ok(()) => {
                store.persist();
                format!("🛡️ **{player}** placed into **{clan}**.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Remove a player from their clan.
#[poise::command(slash_command)]
pub async fn removefromclan(
    context: Context<'_>,
    #[description = "Player name"] player: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.remove_member(&player) {
            Ok(clan) => {
                store.persist();
                format!("👋 **{player}** removed from **{clan}**.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Wipe a player's stats back to a fresh record. Clan membership survives.
#[poise::command(slash_command)]
pub async fn resetstats(
    context: Context<'_>,
    #[description = "Player name"] player: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.reset_player(&player) {
            Ok(()) => {
                store.persist();
                format!("🧹 Stats for **{player}** wiped.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Force-cancel any bounty, optionally refunding the proposer clan.
#[poise::command(slash_command)]
pub async fn cancelbountyadmin(
    context: Context<'_>,
    #[description = "The bounty's target"] target: String,
    #[description = "Refund the escrow to the proposer clan"] refund: bool,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.force_cancel_bounty(&target, refund) {
            Ok((bounty, refunded)) => {
                store.persist();
                if refunded {
                    format!(
                        "↩️ Bounty on **{target}** removed; {} points refunded to **{}**.",
                        bounty.points, bounty.proposer_clan
                    )
                } else {
                    format!(
                        "🗑️ Bounty on **{target}** removed; {} escrowed points forfeited.",
                        bounty.points
                    )
                }
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Set a clan's points to an exact value.
#[poise::command(slash_command)]
pub async fn setpoints(
    context: Context<'_>,
    #[description = "Clan name"] clan: String,
    #[description = "New point total"] points: i64,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let Ok(points) = u32::try_from(points) else {
        return reply_private(&context, "❌ Points must be zero or more.").await;
    };
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.set_points(&clan, points) {
            Ok(()) => {
                store.persist();
                format!("💎 **{clan}** set to {points} points.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Add (or with a negative amount, remove) clan points. Totals floor at 0.
#[poise::command(slash_command)]
pub async fn addpoints(
    context: Context<'_>,
    #[description = "Clan name"] clan: String,
    #[description = "Points to add (negative to remove)"] amount: i64,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.adjust_points(&clan, amount) {
            Ok(total) => {
                store.persist();
                format!("💎 **{clan}** now has {total} points.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Record a manual PvP kill, with all the usual side effects.
#[poise::command(slash_command)]
pub async fn givekill(
    context: Context<'_>,
    #[description = "The killer"] killer: String,
    #[description = "The victim"] victim: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        let mut kill_log = Vec::new();
        clanwarden::events::process_kill(&mut store.data, &killer, &victim, &mut kill_log);
        store.persist();
        format!("⚔️ Recorded: {}", kill_log.join("; "))
    };
    reply_private(&context, reply).await
}

/// Credit playtime minutes to a player, as if a session just ended.
#[poise::command(slash_command)]
pub async fn addtime(
    context: Context<'_>,
    #[description = "Player name"] player: String,
    #[description = "Minutes to credit"] minutes: f64,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    if !minutes.is_finite() || minutes <= 0.0 {
        return reply_private(&context, "❌ Minutes must be a positive number.").await;
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        store.data.update_playtime(&player, minutes);
        store.persist();
        let total = store.data.players[&player].hours();
        format!("⏱️ Credited {minutes:.1} minutes to **{player}** (now {total:.1} h).")
    };
    reply_private(&context, reply).await
}

/// Ingest a Minecraft server log file and apply every recognized event.
#[poise::command(slash_command)]
pub async fn uploadlogs(
    context: Context<'_>,
    #[description = "A .log or .txt server log file"] file: serenity::Attachment,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    if !file.filename.ends_with(".log") && !file.filename.ends_with(".txt") {
        return reply_private(&context, "❌ Only .log and .txt files are accepted.").await;
    }
    context.defer_ephemeral().await?;

    let bytes = file.download().await?;
    let content = String::from_utf8_lossy(&bytes);
    let events = parse_log(&content);

    let reply = {
        let mut store = context.data().store.lock().await;
        let summary = process_events(&mut store.data, &events);
        store.persist();

        let mut text = format!(
            "📜 **Log processed** ({} events)\n\
             👋 {} joins, ⚔️ {} PvP kills, 🧟 {} zombie deaths, 💀 {} other deaths",
            events.len(),
            summary.joins.len(),
            summary.kills.len(),
            summary.zombie_deaths.len(),
            summary.deaths.len(),
        );
        if !summary.kills.is_empty() {
            text.push_str("\n\nKills:");
            for line in summary.kills.iter().take(15) {
                text.push_str(&format!("\n⚔️ {line}"));
            }
            if summary.kills.len() > 15 {
                text.push_str(&format!("\n… and {} more", summary.kills.len() - 15));
            }
        }
        text
    };
    reply_private(&context, reply).await
}

/// Every tracked player, with hours and clan.
#[poise::command(slash_command)]
pub async fn listplayers(context: Context<'_>) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let store = context.data().store.lock().await;
        if store.data.players.is_empty() {
            "💤 No players tracked yet.".to_string()
        } else {
            let mut text = format!("👥 **Tracked players** ({})", store.data.players.len());
            for (name, record) in &store.data.players {
                let clan = store
                    .data
                    .clan_of(name)
                    .map(|clan| format!(" [{clan}]"))
                    .unwrap_or_default();
                text.push_str(&format!(
                    "\n• **{name}**{clan}: {:.1} h, {} kills, {} deaths",
                    record.hours(),
                    record.kills,
                    record.deaths
                ));
            }
            text
        }
    };
    reply_private(&context, reply).await
}

/// Show every tunable value.
#[poise::command(slash_command)]
pub async fn config(context: Context<'_>) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let store = context.data().store.lock().await;
        let mut text = "⚙️ **Runtime configuration**".to_string();
        for (key, value) in store.data.config.entries() {
            text.push_str(&format!("\n• `{key}` = {value}"));
        }
        text
    };
    reply_private(&context, reply).await
}

/// Change one tunable value. Takes effect immediately and is persisted.
#[poise::command(slash_command)]
pub async fn setconfig(
    context: Context<'_>,
    #[description = "Config key"] key: String,
    #[description = "New value"] value: String,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.config.set_key(&key, &value) {
            Ok(()) => {
                store.persist();
                format!("⚙️ `{key}` set to {value}.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    reply_private(&context, reply).await
}

/// Pick the channel that receives server online/offline announcements.
#[poise::command(slash_command)]
pub async fn setchannel(
    context: Context<'_>,
    #[description = "Announcement channel"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    {
        let mut store = context.data().store.lock().await;
        store.data.config.announcement_channel_id = channel.id.get();
        store.persist();
    }
    channel
        .id
        .say(
            context.serenity_context(),
            "🔔 This channel will now receive server announcements.",
        )
        .await?;
    reply_private(&context, format!("📢 Announcements go to <#{}>.", channel.id)).await
}

/// Pick the channel that receives connect/disconnect notices.
#[poise::command(slash_command)]
pub async fn setlogschannel(
    context: Context<'_>,
    #[description = "Activity log channel"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    if !ensure_owner(&context).await? {
        return Ok(());
    }
    {
        let mut store = context.data().store.lock().await;
        store.data.config.logs_channel_id = channel.id.get();
        store.persist();
    }
    channel
        .id
        .say(
            context.serenity_context(),
            "📋 This channel will now receive player connect and disconnect notices.",
        )
        .await?;
    reply_private(&context, format!("📋 Activity notices go to <#{}>.", channel.id)).await
}
