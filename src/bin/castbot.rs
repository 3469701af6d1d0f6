use anyhow::{Context, Result};
use castbot::{config::Config, conversation::Conversation, db::CastingDb, discord};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    castbot::init_tracing();

    let config = Config::load()?;
    let token = config.discord_token()?.to_string();

    let db = Arc::new(CastingDb::open(&config.data_dir).await?);
    db.ping()
        .await
        .context("Database is unreachable, refusing to start the bot")?;
    info!("Database connection OK");

    let conversation = Arc::new(Conversation::new(db, config.session_ttl));
    let bot = discord::Bot::new(&token, conversation);

    let bot_handle = tokio::spawn(async move {
        if let Err(e) = bot.start().await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    bot_handle.abort();
    info!("Shutdown complete");

    Ok(())
}
