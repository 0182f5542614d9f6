//! Bounty commands. Escrow model: posting a bounty debits the proposer
//! clan immediately, payout or refund settles the escrow later.

use crate::types::{Context, Error};
use clanwarden::store::StoreData;

use super::{invoker_name, is_owner};

/// Post a bounty on a player's head (clan leaders only).
#[poise::command(slash_command)]
pub async fn bounty(
    context: Context<'_>,
    #[description = "The player to put a price on"] target: String,
    #[description = "Points to escrow from your clan"] points: i64,
) -> Result<(), Error> {
    let proposer = invoker_name(&context).await;
    let Ok(points) = u32::try_from(points) else {
        context
            .say("❌ The amount must be a positive number of points.")
            .await?;
        return Ok(());
    };

    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.post_bounty(&proposer, &target, points) {
            Ok(()) => {
                store.persist();
                format!(
                    "💰 **Bounty posted!** {points} points on **{target}**'s head.\n\
                     First player from another clan to kill them claims the reward.\n\
                     ⚖️ Kills by [{}] members pay nothing; the bounty stays up.",
                    store.data.clan_of(&proposer).unwrap_or("?"),
                )
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    context.say(reply).await?;
    Ok(())
}

/// Cancel a bounty your clan posted; the escrow returns to the clan.
#[poise::command(slash_command)]
pub async fn cancelbounty(
    context: Context<'_>,
    #[description = "The bounty's target"] target: String,
) -> Result<(), Error> {
    let actor = invoker_name(&context).await;
    let admin = is_owner(&context);
    let reply = {
        let mut store = context.data().store.lock().await;
        match store.data.cancel_bounty(&actor, admin, &target) {
            Ok((clan, points)) => {
                store.persist();
                format!("↩️ Bounty on **{target}** cancelled; {points} points refunded to **{clan}**.")
            }
            Err(e) => format!("❌ {e}"),
        }
    };
    context.say(reply).await?;
    Ok(())
}

/// List every active bounty.
#[poise::command(slash_command)]
pub async fn bounties(context: Context<'_>) -> Result<(), Error> {
    let reply = {
        let store = context.data().store.lock().await;
        render_bounties(&store.data)
    };
    context.say(reply).await?;
    Ok(())
}

fn render_bounties(data: &StoreData) -> String {
    if data.bounties.is_empty() {
        return "🕊️ No active bounties.".to_string();
    }

    let mut reply = "💀 **Active Bounties**".to_string();
    for (target, bounty) in &data.bounties {
        reply.push_str(&format!(
            "\n🎯 **{target}**: {} points, posted by **{}** of [{}] on {}",
            bounty.points,
            bounty.proposed_by,
            bounty.proposer_clan,
            bounty.created.format("%Y-%m-%d %H:%M"),
        ));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounties_empty() {
        let data = StoreData::default();
        assert!(render_bounties(&data).starts_with("🕊️"));
    }

    #[test]
    fn test_bounties_listing() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        data.set_points("Red", 200).unwrap();
        data.player_mut("Alex");
        data.post_bounty("Steve", "Alex", 150).unwrap();
        let reply = render_bounties(&data);
        assert!(reply.contains("**Alex**: 150 points"));
        assert!(reply.contains("**Steve** of [Red]"));
    }
}
