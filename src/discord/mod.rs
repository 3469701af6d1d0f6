use crate::conversation::Conversation;
use anyhow::Result;
use serenity::prelude::*;
use std::sync::Arc;

mod handler;
mod util;

use handler::*;

pub const DISCORD_MAX_LEN: usize = 2000;
pub const START_COMMAND: &str = "start";

/// Discord front end for the casting conversation.
pub struct Bot {
    token: String,
    conversation: Arc<Conversation>,
}

impl Bot {
    pub fn new(token: &str, conversation: Arc<Conversation>) -> Self {
        Self {
            token: token.to_string(),
            conversation,
        }
    }

    pub async fn start(self) -> Result<()> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = Handler {
            conversation: self.conversation,
            bot_id: Arc::new(RwLock::new(None)),
        };

        let mut client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .await?;

        client.start().await?;

        Ok(())
    }
}
