//! Clan lifecycle commands available to every member.

use crate::types::{Context, Error};
use clanwarden::store::StoreData;

use super::invoker_name;

/// Found a new clan, with you as its leader.
#[poise::command(slash_command)]
pub async fn createclan(
    context: Context<'_>,
    #[description = "Clan name"] name: String,
) -> Result<(), Error> {
    let founder = invoker_name(&context).await;
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.create_clan(&name, &founder) {
            Ok(()) => {
                store.persist();
                format!("⚔️ Clan **{name}** founded! **{founder}** leads it.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    context.say(reply).await?;
    Ok(())
}

/// Join an existing clan.
#[poise::command(slash_command)]
pub async fn joinclan(
    context: Context<'_>,
    #[description = "Clan to join"] name: String,
) -> Result<(), Error> {
    let player = invoker_name(&context).await;
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.join_clan(&player, &name) {
            Ok(count) => {
                store.persist();
                format!("🛡️ **{player}** joined **{name}** ({count} members).")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    context.say(reply).await?;
    Ok(())
}

/// Leave your current clan.
#[poise::command(slash_command)]
pub async fn leaveclan(context: Context<'_>) -> Result<(), Error> {
    let player = invoker_name(&context).await;
    let reply = {
        let mut store = context.data().store.lock().await;
        let was_leader = store
            .data
            .clan_of(&player)
            .is_some_and(|clan| store.data.is_clan_leader(&player, clan));
        match store.data.remove_member(&player) {
            Ok(clan) => {
                store.persist();
                let mut text = format!("👋 **{player}** left **{clan}**.");
                if was_leader {
                    match store.data.clans.get(&clan).and_then(|c| c.leader.clone()) {
                        Some(leader) => {
                            text.push_str(&format!(" **{leader}** now leads the clan."))
                        }
                        None => text.push_str(" The clan is now leaderless."),
                    }
                }
                text
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    context.say(reply).await?;
    Ok(())
}

/// Details about a clan: leader, points and member roster.
#[poise::command(slash_command)]
pub async fn claninfo(
    context: Context<'_>,
    #[description = "Clan name"] name: String,
) -> Result<(), Error> {
    let reply = {
        let store = context.data().store.lock().await;
        render_clan_info(&store.data, &name)
    };
    context.say(reply).await?;
    Ok(())
}

/// Clans ranked by points.
#[poise::command(slash_command)]
pub async fn clanleaderboard(context: Context<'_>) -> Result<(), Error> {
    let reply = {
        let store = context.data().store.lock().await;
        render_clan_leaderboard(&store.data)
    };
    context.say(reply).await?;
    Ok(())
}

/// Hand clan leadership to another member (leader only).
#[poise::command(slash_command)]
pub async fn transferleader(
    context: Context<'_>,
    #[description = "The member to promote"] successor: String,
) -> Result<(), Error> {
    let leader = invoker_name(&context).await;
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.transfer_leader(&leader, &successor) {
            Ok(clan) => {
                store.persist();
                format!("👑 **{successor}** now leads **{clan}**.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    context.say(reply).await?;
    Ok(())
}

fn render_clan_info(data: &StoreData, name: &str) -> String {
    let Some(clan) = data.clans.get(name) else {
        return format!("❌ No clan named **{name}**.");
    };

    let leader = clan.leader.as_deref().unwrap_or("(leaderless)");
    let members = data.members_of(name);
    let roster = if members.is_empty() {
        "(empty)".to_string()
    } else {
        members.join(", ")
    };

    format!(
        "🏰 **Clan {name}**\n\
         👑 Leader: {leader}\n\
         💎 Points: {}\n\
         📅 Founded: {}\n\
         👥 Members ({}): {roster}",
        clan.points,
        clan.created.format("%Y-%m-%d"),
        members.len(),
    )
}

fn render_clan_leaderboard(data: &StoreData) -> String {
    let mut ranked: Vec<_> = data.clans.iter().collect();
    ranked.sort_by(|a, b| b.1.points.cmp(&a.1.points));

    if ranked.is_empty() {
        return "🏜️ No clans exist yet. Found one with /createclan!".to_string();
    }

    let mut reply = "🏆 **Clan Leaderboard**".to_string();
    for (rank, (name, clan)) in ranked.iter().take(10).enumerate() {
        let medal = match rank {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "▪️",
        };
        reply.push_str(&format!(
            "\n{medal} **{name}**: {} points ({} members)",
            clan.points,
            data.members_of(name).len(),
        ));
    }
    reply
}
