//! Read-only commands: server status, player stats and leaderboards.

use poise::serenity_prelude as serenity;

use crate::types::{Context, Error};
use clanwarden::mc_server;
use clanwarden::store::StoreData;

use super::invoker_name;

const HELP_PLAYER_SECTIONS: &[(&str, &str)] = &[
    (
        "📊 Server & stats",
        "`/status` live server status\n\
         `/stats [player]` full stat sheet\n\
         `/rivalry <a> <b>` head-to-head kills\n\
         `/myrivalry <opponent>` your side of a rivalry\n\
         `/pvpleaderboard` top killers\n\
         `/top` top hours played",
    ),
    (
        "🏰 Clans",
        "`/createclan <name>` found a clan\n\
         `/joinclan <name>` join one\n\
         `/leaveclan` leave yours\n\
         `/claninfo <name>` roster and points\n\
         `/clanleaderboard` clans by points\n\
         `/transferleader <member>` hand over leadership",
    ),
    (
        "💰 Bounties",
        "`/bounty <target> <points>` post one (clan leaders)\n\
         `/cancelbounty <target>` refund your clan's bounty\n\
         `/bounties` list active bounties",
    ),
];

const HELP_ADMIN_SECTIONS: &[(&str, &str)] = &[
    (
        "🏰 Clan management",
        "`/setupclan` `/setleader` `/renameclan` `/deleteclan`\n\
         `/addtoclan` `/removefromclan`",
    ),
    (
        "📈 Points & records",
        "`/setpoints` `/addpoints` `/givekill` `/addtime` `/resetstats`\n\
         `/cancelbountyadmin`",
    ),
    (
        "📜 Data & configuration",
        "`/uploadlogs` `/listplayers` `/config` `/setconfig`\n\
         `/setchannel` `/setlogschannel`",
    ),
];

/// Overview of every command.
#[poise::command(slash_command)]
pub async fn help(context: Context<'_>) -> Result<(), Error> {
    let mut players = serenity::CreateEmbed::new()
        .title("📖 Player commands")
        .colour(serenity::Colour::BLUE);
    for (title, body) in HELP_PLAYER_SECTIONS {
        players = players.field(*title, *body, false);
    }
    let mut admin = serenity::CreateEmbed::new()
        .title("🔒 Admin commands (owner only)")
        .colour(serenity::Colour::DARK_RED);
    for (title, body) in HELP_ADMIN_SECTIONS {
        admin = admin.field(*title, *body, false);
    }
    context
        .send(poise::CreateReply::default().embed(players).embed(admin))
        .await?;
    Ok(())
}

/// Live status of the Minecraft server.
#[poise::command(slash_command)]
pub async fn status(context: Context<'_>) -> Result<(), Error> {
    context.defer().await?;

    let address = context.data().config.mc_server_address.clone();
    let snapshot =
        tokio::task::spawn_blocking(move || mc_server::check_server(&address)).await?;

    if snapshot.online {
        let mut reply = format!(
            "🎮 **Minecraft Server**\n🟢 Online: {}/{} players",
            snapshot.player_count, snapshot.max_players
        );
        if !snapshot.player_list.is_empty() {
            reply.push_str(&format!("\n👥 {}", snapshot.player_list.join(", ")));
        }
        context.say(reply).await?;
    } else {
        context.say("🎮 **Minecraft Server**\n🔴 Offline").await?;
    }
    Ok(())
}

/// Show a player's full stat sheet.
#[poise::command(slash_command)]
pub async fn stats(
    context: Context<'_>,
    #[description = "Player name (defaults to you)"] player: Option<String>,
) -> Result<(), Error> {
    let player = match player {
        Some(name) => name,
        None => invoker_name(&context).await,
    };
    let reply = {
        let store = context.data().store.lock().await;
        render_stats(&store.data, &player)
    };
    context.say(reply).await?;
    Ok(())
}

/// Head-to-head kill counts between two players.
#[poise::command(slash_command)]
pub async fn rivalry(
    context: Context<'_>,
    #[description = "First player"] player1: String,
    #[description = "Second player"] player2: String,
) -> Result<(), Error> {
    let reply = {
        let store = context.data().store.lock().await;
        render_rivalry(&store.data, &player1, &player2)
    };
    context.say(reply).await?;
    Ok(())
}

/// Your rivalry against another player.
#[poise::command(slash_command)]
pub async fn myrivalry(
    context: Context<'_>,
    #[description = "Your opponent"] opponent: String,
) -> Result<(), Error> {
    let me = invoker_name(&context).await;
    let reply = {
        let store = context.data().store.lock().await;
        render_rivalry(&store.data, &me, &opponent)
    };
    context.say(reply).await?;
    Ok(())
}

/// Top PvP killers.
#[poise::command(slash_command)]
pub async fn pvpleaderboard(context: Context<'_>) -> Result<(), Error> {
    let reply = {
        let store = context.data().store.lock().await;
        render_pvp_leaderboard(&store.data)
    };
    context.say(reply).await?;
    Ok(())
}

/// Top players by hours played.
#[poise::command(slash_command)]
pub async fn top(context: Context<'_>) -> Result<(), Error> {
    let reply = {
        let store = context.data().store.lock().await;
        render_playtime_leaderboard(&store.data)
    };
    context.say(reply).await?;
    Ok(())
}

fn render_stats(data: &StoreData, player: &str) -> String {
    let Some(record) = data.players.get(player) else {
        return format!("❌ No data recorded for **{player}**.");
    };

    let clan = data
        .clan_of(player)
        .map(|name| format!("[{name}]"))
        .unwrap_or_else(|| "none".to_string());

    let mut reply = format!(
        "📊 **Stats for {player}**\n\
         ⏱️ {:.1} h over {} sessions\n\
         🛡️ Clan: {clan}\n\
         ⚔️ {} kills / ☠️ {} deaths (K/D {:.2})\n\
         🧟 {} zombies slain / 🏴 {} inter-clan kills",
        record.hours(),
        record.sessions,
        record.kills,
        record.deaths,
        record.kd_ratio(),
        record.zombie_kills,
        record.clan_kills,
    );

    if let Some(bounty) = data.bounties.get(player) {
        reply.push_str(&format!(
            "\n💰 Bounty on their head: {} points, posted by [{}]",
            bounty.points, bounty.proposer_clan
        ));
    }

    if let Some((victim, score)) = record
        .rivals
        .iter()
        .filter(|(_, score)| score.kills > 0)
        .max_by_key(|(_, score)| score.kills)
    {
        reply.push_str(&format!("\n🔪 Favorite victim: **{victim}** ({}×)", score.kills));
    }
    if let Some((nemesis, score)) = record
        .rivals
        .iter()
        .filter(|(_, score)| score.deaths > 0)
        .max_by_key(|(_, score)| score.deaths)
    {
        reply.push_str(&format!("\n😤 Nemesis: **{nemesis}** ({}×)", score.deaths));
    }

    if !record.achievements.is_empty() {
        let names: Vec<&str> = record
            .achievements
            .iter()
            .map(|id| id.info().name)
            .collect();
        reply.push_str(&format!(
            "\n🏆 Achievements ({}): {}",
            names.len(),
            names.join(", ")
        ));
    }

    reply
}

fn render_rivalry(data: &StoreData, player1: &str, player2: &str) -> String {
    let (Some(first), Some(second)) = (data.players.get(player1), data.players.get(player2))
    else {
        return "❌ One of those players has no recorded data.".to_string();
    };

    let kills_1 = first.rivals.get(player2).map_or(0, |score| score.kills);
    let kills_2 = second.rivals.get(player1).map_or(0, |score| score.kills);

    if kills_1 == 0 && kills_2 == 0 {
        return format!("🕊️ **{player1}** and **{player2}** have never fought.");
    }

    let verdict = if kills_1 > kills_2 {
        format!("**{player1}** dominates this rivalry.")
    } else if kills_2 > kills_1 {
        format!("**{player2}** dominates this rivalry.")
    } else {
        "Perfectly even.".to_string()
    };

    format!(
        "⚔️ **Rivalry: {player1} vs {player2}**\n\
         {player1}: {kills_1} kills\n\
         {player2}: {kills_2} kills\n\
         {verdict}"
    )
}

fn render_pvp_leaderboard(data: &StoreData) -> String {
    let mut ranked: Vec<_> = data
        .players
        .iter()
        .filter(|(_, record)| record.kills > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.kills.cmp(&a.1.kills));

    if ranked.is_empty() {
        return "🕊️ Nobody has a PvP kill yet.".to_string();
    }

    let mut reply = "⚔️ **PvP Leaderboard**".to_string();
    for (rank, (name, record)) in ranked.iter().take(10).enumerate() {
        let clan = data
            .clan_of(name)
            .map(|clan| format!(" [{clan}]"))
            .unwrap_or_default();
        reply.push_str(&format!(
            "\n{}. **{name}**{clan}: {} kills, {} deaths (K/D {:.2})",
            rank + 1,
            record.kills,
            record.deaths,
            record.kd_ratio(),
        ));
    }
    reply
}

fn render_playtime_leaderboard(data: &StoreData) -> String {
    let mut ranked: Vec<_> = data
        .players
        .iter()
        .filter(|(_, record)| record.total_minutes > 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        b.1.total_minutes
            .partial_cmp(&a.1.total_minutes)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if ranked.is_empty() {
        return "💤 No playtime recorded yet.".to_string();
    }

    let mut reply = "⏱️ **Playtime Leaderboard**".to_string();
    for (rank, (name, record)) in ranked.iter().take(10).enumerate() {
        let clan = data
            .clan_of(name)
            .map(|clan| format!(" [{clan}]"))
            .unwrap_or_default();
        reply.push_str(&format!(
            "\n{}. **{name}**{clan}: {:.1} h over {} sessions",
            rank + 1,
            record.hours(),
            record.sessions,
        ));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StoreData {
        let mut data = StoreData::default();
        data.create_clan("Alpha", "Steve").unwrap();
        let steve = data.player_mut("Steve");
        steve.total_minutes = 150.0;
        steve.sessions = 3;
        steve.kills = 7;
        steve.deaths = 2;
        data.record_rivalry("Steve", "Alex");
        data.record_rivalry("Steve", "Alex");
        data
    }

    #[test]
    fn test_help_covers_every_command() {
        let sections: String = HELP_PLAYER_SECTIONS
            .iter()
            .chain(HELP_ADMIN_SECTIONS)
            .map(|(_, body)| *body)
            .collect();
        for command in super::super::all() {
            if command.name == "help" {
                continue;
            }
            assert!(
                sections.contains(&format!("/{}", command.name)),
                "command {} missing from the help text",
                command.name
            );
        }
    }

    #[test]
    fn test_stats_unknown_player() {
        let data = StoreData::default();
        assert!(render_stats(&data, "Ghost").starts_with("❌"));
    }

    #[test]
    fn test_stats_shows_clan_and_rivals() {
        let data = seeded();
        let reply = render_stats(&data, "Steve");
        assert!(reply.contains("[Alpha]"));
        assert!(reply.contains("Favorite victim: **Alex** (2×)"));
        let alex = render_stats(&data, "Alex");
        assert!(alex.contains("Nemesis: **Steve** (2×)"));
    }

    #[test]
    fn test_rivalry_requires_both_records() {
        let data = seeded();
        assert!(render_rivalry(&data, "Steve", "Ghost").starts_with("❌"));
    }

    #[test]
    fn test_rivalry_verdict() {
        let data = seeded();
        let reply = render_rivalry(&data, "Steve", "Alex");
        assert!(reply.contains("Steve: 2 kills"));
        assert!(reply.contains("Alex: 0 kills"));
        assert!(reply.contains("**Steve** dominates"));
    }

    #[test]
    fn test_pvp_leaderboard_ranks_by_kills() {
        let mut data = seeded();
        data.player_mut("Alex").kills = 20;
        let reply = render_pvp_leaderboard(&data);
        let alex = reply.find("Alex").unwrap();
        let steve = reply.find("Steve").unwrap();
        assert!(alex < steve);
    }

    #[test]
    fn test_playtime_leaderboard_empty() {
        let data = StoreData::default();
        assert!(render_playtime_leaderboard(&data).starts_with("💤"));
    }
}
