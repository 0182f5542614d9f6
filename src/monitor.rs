//! The periodic server poller.
//!
//! One task owns the session tracker and drives the whole presence state
//! machine: it pings the server off the async path, reconciles the live
//! player list against tracked sessions, flushes playtime for departures,
//! and emits channel notifications. Ticks never overlap; a slow query just
//! delays that tick's reconciliation.

use clanwarden::config::Config;
use clanwarden::mc_server::{self, ServerSnapshot};
use clanwarden::session::SessionTracker;
use clanwarden::store::Store;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const POLL_PERIOD: Duration = Duration::from_secs(180);

pub async fn run(ctx: serenity::Context, config: Config, store: Arc<Mutex<Store>>) {
    let mut tracker = SessionTracker::new();
    let mut previous_online: Option<bool> = None;

    let mut interval = tokio::time::interval(POLL_PERIOD);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        // The status query blocks on network I/O; keep it off the async path
        // so interactive commands stay responsive during a slow ping.
        let address = config.mc_server_address.clone();
        let snapshot = match tokio::task::spawn_blocking(move || mc_server::check_server(&address))
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("status query task failed: {}", e);
                ServerSnapshot::default()
            }
        };

        tick(&ctx, &store, &mut tracker, &snapshot).await;

        if previous_online.is_some_and(|prev| prev != snapshot.online) {
            announce_transition(&ctx, &store, snapshot.online).await;
        }
        previous_online = Some(snapshot.online);
    }
}

async fn tick(
    ctx: &serenity::Context,
    store: &Arc<Mutex<Store>>,
    tracker: &mut SessionTracker,
    snapshot: &ServerSnapshot,
) {
    let now = chrono::Utc::now();

    if snapshot.online {
        ctx.set_activity(Some(serenity::ActivityData::playing(format!(
            "🟢 {}/{} players",
            snapshot.player_count, snapshot.max_players
        ))));

        let outcome = tracker.reconcile(&snapshot.player_list, now);
        let logs_channel = { store.lock().await.data.config.logs_channel_id };

        for name in &outcome.joined {
            notify(ctx, logs_channel, format!("🟢 **{}** connected", name)).await;
        }
        for (name, minutes) in &outcome.departed {
            {
                let mut guard = store.lock().await;
                guard.data.update_playtime(name, *minutes);
                guard.persist();
            }
            notify(
                ctx,
                logs_channel,
                format!("🔴 **{}** disconnected ({} min)", name, *minutes as i64),
            )
            .await;
            evaluate_active_role(ctx, store, name).await;
        }
    } else {
        ctx.set_activity(Some(serenity::ActivityData::playing("🔴 server offline")));

        // A server outage must not leave anyone stuck online accruing time.
        let departed = tracker.flush_all(now);
        if !departed.is_empty() {
            info!("server offline, flushing {} tracked sessions", departed.len());
            let mut guard = store.lock().await;
            for (name, minutes) in &departed {
                guard.data.update_playtime(name, *minutes);
            }
            guard.persist();
        }
    }
}

/// Announce an online/offline flip, exactly once per transition.
async fn announce_transition(
    ctx: &serenity::Context,
    store: &Arc<Mutex<Store>>,
    online: bool,
) {
    let channel_id = { store.lock().await.data.config.announcement_channel_id };
    if channel_id == 0 {
        return;
    }

    let embed = if online {
        serenity::CreateEmbed::new()
            .title("🟢 Server is online!")
            .description("The server is reachable again.")
            .colour(serenity::Colour::DARK_GREEN)
    } else {
        serenity::CreateEmbed::new()
            .title("🔴 Server is offline")
            .colour(serenity::Colour::RED)
    };
    let mut message = serenity::CreateMessage::new().embed(embed);
    if online {
        message = message.content("@everyone");
    }

    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, message)
        .await
    {
        warn!("failed to send status announcement: {}", e);
    }
}

async fn notify(ctx: &serenity::Context, channel_id: u64, text: String) {
    if channel_id == 0 {
        return;
    }
    if let Err(e) = serenity::ChannelId::new(channel_id).say(&ctx.http, text).await {
        warn!("failed to send log notice: {}", e);
    }
}

/// Grant the configured activity role to a player past the hour threshold.
async fn evaluate_active_role(
    ctx: &serenity::Context,
    store: &Arc<Mutex<Store>>,
    player: &str,
) {
    let (role_name, qualifies) = {
        let guard = store.lock().await;
        let cfg = &guard.data.config;
        let minutes = guard
            .data
            .players
            .get(player)
            .map_or(0.0, |r| r.total_minutes);
        (
            cfg.active_role_name.clone(),
            minutes >= cfg.hours_for_active_role as f64 * 60.0,
        )
    };
    if !qualifies {
        return;
    }

    for guild_id in ctx.cache.guilds() {
        if let Err(e) = grant_role_in_guild(ctx, guild_id, player, &role_name).await {
            warn!(
                "failed to grant role '{}' to {} in guild {}: {}",
                role_name, player, guild_id, e
            );
        }
    }
}

/// Find (or create) the role and attach it to the guild member whose
/// name or nickname matches the Minecraft player name.
async fn grant_role_in_guild(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    player: &str,
    role_name: &str,
) -> Result<(), serenity::Error> {
    let roles = guild_id.roles(&ctx.http).await?;
    let role_id = match roles.values().find(|role| role.name == role_name) {
        Some(role) => role.id,
        None => {
            guild_id
                .create_role(
                    &ctx.http,
                    serenity::EditRole::new()
                        .name(role_name)
                        .colour(serenity::Colour::GOLD),
                )
                .await?
                .id
        }
    };

    let members = guild_id.members(&ctx.http, None, None).await?;
    for member in members {
        if member.display_name() == player || member.user.name == player {
            if !member.roles.contains(&role_id) {
                member.add_role(&ctx.http, role_id).await?;
                info!("granted role '{}' to {}", role_name, player);
            }
            break;
        }
    }
    Ok(())
}
