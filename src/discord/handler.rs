use super::util::{
    Press, action_rows, classify_press, extract_content, is_start_text, participant,
};
use super::{DISCORD_MAX_LEN, START_COMMAND};
use crate::conversation::{Conversation, ConversationError, Event, Participant, Reply};
use crate::utils::fit_message;
use serenity::{
    all::{
        Command, CommandInteraction, ComponentInteraction, CreateCommand,
        CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, Interaction,
        Message, Ready, UserId,
    },
    async_trait,
    prelude::*,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const STALE_LIST: &str = "This result list is out of date. Use /start for a new search.";
const FOREIGN_SCREEN: &str = "These buttons belong to another user. Use /start to begin your own search.";

pub(super) struct Handler {
    pub conversation: Arc<Conversation>,
    pub bot_id: Arc<RwLock<Option<UserId>>>,
}

impl Handler {
    async fn dispatch(&self, who: &Participant, event: Event) -> Reply {
        match self.conversation.handle(who, event).await {
            Ok(reply) => reply,
            Err(e @ ConversationError::IndexOutOfRange { .. }) => {
                warn!("Rejected navigation from user {}: {}", who.user_id, e);
                Reply::Notice(STALE_LIST.to_string())
            }
        }
    }

    async fn on_start_command(&self, ctx: &Context, cmd: &CommandInteraction) {
        let reply = self.dispatch(&participant(&cmd.user), Event::Start).await;
        let message = match reply {
            Reply::Screen { text, keyboard } => CreateInteractionResponseMessage::new()
                .content(fit_message(&text, DISCORD_MAX_LEN))
                .components(action_rows(&keyboard, cmd.user.id)),
            Reply::Notice(text) => CreateInteractionResponseMessage::new()
                .content(text)
                .ephemeral(true),
        };

        if let Err(e) = cmd
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await
        {
            error!("Failed to respond to /{}: {}", START_COMMAND, e);
        }
    }

    async fn on_component(&self, ctx: &Context, component: &ComponentInteraction) {
        let action = match classify_press(&component.data.custom_id, component.user.id) {
            Press::Own(action) => action,
            Press::Foreign => {
                debug!(
                    "User {} pressed '{}' on another user's screen",
                    component.user.id, component.data.custom_id
                );
                let notice = CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(FOREIGN_SCREEN)
                        .ephemeral(true),
                );
                if let Err(e) = component.create_response(&ctx.http, notice).await {
                    error!("Failed to answer foreign button press: {}", e);
                }
                return;
            }
            Press::Unknown => {
                warn!("Ignoring unknown button '{}'", component.data.custom_id);
                return;
            }
        };

        let reply = self
            .dispatch(&participant(&component.user), Event::Action(action))
            .await;
        let response = match reply {
            Reply::Screen { text, keyboard } => CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(fit_message(&text, DISCORD_MAX_LEN))
                    .components(action_rows(&keyboard, component.user.id)),
            ),
            Reply::Notice(text) => CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        };

        if let Err(e) = component.create_response(&ctx.http, response).await {
            error!("Failed to respond to button '{}': {}", component.data.custom_id, e);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(bot_id) = *self.bot_id.read().await else {
            return;
        };

        let is_direct = msg.guild_id.is_none();
        if !is_direct && !msg.mentions.iter().any(|u| u.id == bot_id) {
            return;
        }

        let content = extract_content(&msg, bot_id);
        if content.is_empty() {
            return;
        }

        let event = if is_start_text(&content) {
            Event::Start
        } else {
            Event::Text(content)
        };

        let typing = msg.channel_id.start_typing(&ctx.http);
        let reply = self.dispatch(&participant(&msg.author), event).await;
        typing.stop();

        let (text, keyboard) = match reply {
            Reply::Screen { text, keyboard } => (text, keyboard),
            Reply::Notice(text) => (text, Vec::new()),
        };

        let builder = CreateMessage::new()
            .content(fit_message(&text, DISCORD_MAX_LEN))
            .components(action_rows(&keyboard, msg.author.id))
            .reference_message(&msg);

        if let Err(e) = msg.channel_id.send_message(&ctx.http, builder).await {
            error!("Failed to reply in channel {}: {}", msg.channel_id, e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(cmd) if cmd.data.name == START_COMMAND => {
                self.on_start_command(&ctx, &cmd).await;
            }
            Interaction::Component(component) => {
                self.on_component(&ctx, &component).await;
            }
            _ => {}
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Bot connected as {}", ready.user.name);
        *self.bot_id.write().await = Some(ready.user.id);

        if let Err(e) = Command::create_global_command(
            &ctx.http,
            CreateCommand::new(START_COMMAND).description("Start a new role search"),
        )
        .await
        {
            error!("Failed to register /{} slash command: {}", START_COMMAND, e);
        } else {
            info!("Registered /{} slash command", START_COMMAND);
        }
    }
}
