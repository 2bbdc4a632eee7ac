//! Slack implementation of the chat service.
//!
//! This module connects to Slack in socket mode and translates its events into
//! the bot's own message, reaction, and command types:
//! - Messages and @-mentions are dispatched to the message scripts
//! - Reactions are dispatched to the best-of relay
//! - Slash commands are answered inline

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, ReactionEvent, Res, SlashCommand, Void},
    },
    interaction,
    runtime::Runtime,
    service::{brain::BrainClient, glossary::GlossaryClient},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, brain: BrainClient, glossary: GlossaryClient) -> Res<Self> {
        let client = SlackChatClient::new(config, brain, glossary).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    runtime: Runtime,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub config: Config,
    pub brain: BrainClient,
    pub glossary: GlossaryClient,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, brain: BrainClient, glossary: GlossaryClient) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            config: config.clone(),
            brain,
            glossary,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let runtime = Runtime {
            config: self.config.clone(),
            brain: self.brain.clone(),
            glossary: self.glossary.clone(),
            chat: ChatClient::from(self.clone()),
        };

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { runtime }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_link_names(true);

        if !thread_ts.is_empty() {
            request = request.with_thread_ts(SlackTs(thread_ts.to_string()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_ephemeral(&self, channel_id: &str, user_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostEphemeralRequest::new(SlackChannelId(channel_id.to_string()), SlackUserId(user_id.to_string()), message);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_ephemeral(&request).await.map_err(|e| anyhow::anyhow!("Failed to send ephemeral message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void {
        let request = SlackApiReactionsAddRequest {
            channel: SlackChannelId(channel_id.to_string()),
            name: SlackReactionName(emoji.to_string()),
            timestamp: SlackTs(ts.to_string()),
        };

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_add(&request).await.map_err(|e| anyhow::anyhow!("Failed to react to message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user_timezone(&self, user_id: &str) -> Res<Option<String>> {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));
        let session = self.client.open_session(&self.bot_token);

        let response = session.users_info(&request).await?;

        Ok(response.user.tz)
    }

    #[instrument(skip(self))]
    async fn get_permalink(&self, channel_id: &str, ts: &str) -> Res<String> {
        let request = SlackApiChatGetPermalinkRequest::new(SlackChannelId(channel_id.to_string()), SlackTs(ts.to_string()));
        let session = self.client.open_session(&self.bot_token);

        let response = session.chat_get_permalink(&request).await?;

        Ok(response.permalink.to_string())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    info!("Received command `{}` ...", event.command.0);

    let command = SlashCommand {
        command: event.command.0,
        text: event.text.unwrap_or_default(),
        user_id: event.user_id.0,
        channel_id: event.channel_id.0,
    };

    let text = interaction::handle_command(&command);

    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text(text)).with_response_type(SlackMessageResponseType::InChannel))
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let runtime = {
        let states = states.read().await;
        let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;
        user_state.runtime.clone()
    };
    let bot_user_id = runtime.chat.bot_user_id().to_string();

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            debug!("Received message event ...");

            let incoming = IncomingMessage {
                channel_id: slack_message_event.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned(),
                user_id: slack_message_event.sender.user.map(|u| u.0),
                text: slack_message_event.content.and_then(|c| c.text).unwrap_or_default(),
                ts: slack_message_event.origin.ts.0,
                thread_ts: slack_message_event.origin.thread_ts.map(|ts| ts.0),
                from_bot: slack_message_event.sender.bot_id.is_some(),
                has_subtype: slack_message_event.subtype.is_some(),
            };

            if let Some(message) = message_to_chat_message(incoming, &bot_user_id) {
                interaction::handle_message(message, runtime);
            }
        }
        SlackEventCallbackBody::AppMention(slack_app_mention_event) => {
            info!("Received app mention event ...");

            let incoming = IncomingMessage {
                channel_id: slack_app_mention_event.channel.0,
                user_id: Some(slack_app_mention_event.user.0),
                text: slack_app_mention_event.content.text.unwrap_or_default(),
                ts: slack_app_mention_event.origin.ts.0,
                thread_ts: slack_app_mention_event.origin.thread_ts.map(|ts| ts.0),
                ..Default::default()
            };

            interaction::handle_message(mention_to_chat_message(incoming, &bot_user_id), runtime);
        }
        SlackEventCallbackBody::ReactionAdded(slack_reaction_added_event) => {
            debug!("Received reaction added event ...");

            // Only reactions on messages carry a channel and timestamp.
            let SlackReactionsItem::Message(item) = slack_reaction_added_event.item else {
                debug!("Skipping reaction on a non-message item.");
                return Ok(());
            };
            let Some(channel_id) = item.origin.channel else {
                debug!("Skipping reaction on a message without a channel.");
                return Ok(());
            };

            let event = ReactionEvent {
                user_id: slack_reaction_added_event.user.0,
                reaction: slack_reaction_added_event.reaction.0,
                channel_id: channel_id.0,
                ts: item.origin.ts.0,
            };

            interaction::handle_reaction(event, runtime);
        }
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Event mapping.

/// The parts of a Slack message or app mention event that decide how it is dispatched.
#[derive(Debug, Clone, Default)]
struct IncomingMessage {
    channel_id: String,
    user_id: Option<String>,
    text: String,
    ts: String,
    thread_ts: Option<String>,
    from_bot: bool,
    has_subtype: bool,
}

/// Maps a plain message event, or returns `None` when the scripts should not see it.
///
/// Direct messages are always addressed to the bot. Channel messages that
/// mention the bot are left to the app mention event, which Slack also sends.
fn message_to_chat_message(incoming: IncomingMessage, bot_user_id: &str) -> Option<ChatMessage> {
    // Skip the bot's own messages, and edits, joins, and other non-message subtypes.
    if incoming.from_bot || incoming.has_subtype {
        debug!("Skipping bot or subtype message.");
        return None;
    }

    let Some(user_id) = incoming.user_id else {
        warn!("Skipping message event without a user.");
        return None;
    };

    let is_direct = incoming.channel_id.starts_with('D');

    if !is_direct && incoming.text.contains(&format!("<@{bot_user_id}")) {
        debug!("Skipping message event because it mentions the bot.");
        return None;
    }

    let stripped = interaction::strip_bot_mention(&incoming.text, bot_user_id).map(str::to_string);

    Some(ChatMessage {
        channel_id: incoming.channel_id,
        user_id,
        text: stripped.unwrap_or(incoming.text),
        ts: incoming.ts,
        thread_ts: incoming.thread_ts,
        addressed: is_direct,
    })
}

/// Maps an app mention event; it is addressed only when it starts with the mention.
fn mention_to_chat_message(incoming: IncomingMessage, bot_user_id: &str) -> ChatMessage {
    let stripped = interaction::strip_bot_mention(&incoming.text, bot_user_id).map(str::to_string);

    ChatMessage {
        channel_id: incoming.channel_id,
        user_id: incoming.user_id.unwrap_or_default(),
        addressed: stripped.is_some(),
        text: stripped.unwrap_or(incoming.text),
        ts: incoming.ts,
        thread_ts: incoming.thread_ts,
    }
}

// Tests.
