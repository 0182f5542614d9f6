use crate::commands;
use crate::monitor;
use crate::types::Data;
use clanwarden::config::Config;
use clanwarden::store::Store;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    let store = Arc::new(Mutex::new(Store::load(&config.data_path)?));

    // GUILD_MEMBERS is needed to match Minecraft names against guild
    // nicknames when granting the active role.
    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::GUILD_MEMBERS;
    let token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            ..Default::default()
        })
        .setup({
            let config = config.clone();
            let store = store.clone();
            move |context, _ready, framework| {
                Box::pin(async move {
                    poise::builtins::register_globally(context, &framework.options().commands)
                        .await?;
                    info!(
                        "connected, {} slash commands registered",
                        framework.options().commands.len()
                    );
                    tokio::spawn(monitor::run(
                        context.clone(),
                        config.clone(),
                        store.clone(),
                    ));
                    Ok(Data { config, store })
                })
            }
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;

    Ok(())
}
