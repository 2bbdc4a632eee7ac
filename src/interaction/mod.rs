//! Event handling and chat scripts for crew-bot.
//!
//! Every script is an independent handler: it is matched against an incoming
//! message (or event, or slash command) and returns the actions to take. The
//! dispatcher here owns matching and executes the actions through the chat
//! client; scripts never talk to each other.

pub mod best_of;
pub mod dice;
pub mod glossary;
pub mod haiku;
pub mod holiday;
pub mod love;
pub mod startup;
pub mod timecheck;
pub mod tock_line;
pub mod what_day;

use std::sync::OnceLock;

use async_trait::async_trait;
use futures::future::join_all;
use regex::{Captures, Regex};
use tracing::{Instrument, debug, error, info, instrument};

use crate::{
    base::types::{Action, ChatMessage, ReactionEvent, Res, SlashCommand, Void},
    runtime::Runtime,
    service::chat::ChatClient,
};

// Traits.

/// When a message script is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every message is matched.
    Hear,
    /// Only messages addressed to the bot are matched.
    Respond,
}

/// A script that reacts to chat messages matching its pattern.
#[async_trait]
pub trait MessageScript: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the script hears every message or only ones addressed to the bot.
    fn mode(&self) -> Mode;

    /// The pattern the message text must match.
    fn pattern(&self) -> &Regex;

    /// Handle a matching message, returning the actions to take.
    ///
    /// An empty list means the script chose not to say anything.
    async fn handle(&self, runtime: &Runtime, message: &ChatMessage, captures: &Captures<'_>) -> Res<Vec<Action>>;
}

// Statics.

static MESSAGE_SCRIPTS: OnceLock<Vec<Box<dyn MessageScript>>> = OnceLock::new();

/// Get every registered message script.
pub fn get_message_scripts() -> &'static [Box<dyn MessageScript>] {
    MESSAGE_SCRIPTS.get_or_init(|| {
        vec![
            Box::new(glossary::Glossary),
            Box::new(tock_line::GetTockLine),
            Box::new(tock_line::SetTockLine),
            Box::new(love::Love),
            Box::new(what_day::WhatDay),
            Box::new(timecheck::TimeCheck),
            Box::new(holiday::NextHoliday),
            Box::new(haiku::Haiku),
        ]
    })
}

// Entry points.

/// Handles a chat message.
///
/// Spawns a new task that runs every matching script.
#[instrument(skip_all)]
pub fn handle_message(message: ChatMessage, runtime: Runtime) {
    tokio::spawn(async move {
        // Process the message.
        let result = process_message(&message, &runtime).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Runs every script matching `message` and executes the actions they return.
///
/// A failing script is logged and does not prevent the others from running.
#[instrument(skip_all, fields(channel = %message.channel_id))]
pub async fn process_message(message: &ChatMessage, runtime: &Runtime) -> Void {
    let matches = get_message_scripts().iter().filter(|script| script.mode() == Mode::Hear || message.addressed).filter_map(|script| {
        script.pattern().captures(&message.text).map(|captures| (script, captures))
    });

    let runs = matches.map(|(script, captures)| async move {
        info!("Script `{}` matched.", script.name());

        let actions = script.handle(runtime, message, &captures).await?;
        execute_actions(&runtime.chat, message, &actions).await?;

        Ok::<_, crate::base::types::Err>(())
    });

    for result in join_all(runs).await {
        if let Err(err) = result {
            error!("Script failed: {}", err);
        }
    }

    Ok(())
}

/// Executes actions on behalf of a message.
#[instrument(skip_all)]
pub async fn execute_actions(chat: &ChatClient, message: &ChatMessage, actions: &[Action]) -> Void {
    for action in actions {
        debug!("Executing {:?}", action);

        match action {
            Action::Reply { text } => chat.send_message(&message.channel_id, message.thread_ts.as_deref().unwrap_or_default(), text).await?,
            Action::Post { channel, text } => chat.send_message(channel, "", text).await?,
            Action::Ephemeral { text } => chat.send_ephemeral(&message.channel_id, &message.user_id, text).await?,
            Action::React { emoji } => chat.react_to_message(&message.channel_id, &message.ts, emoji).await?,
        }
    }

    Ok(())
}

/// Handles a reaction being added to a message.
#[instrument(skip_all)]
pub fn handle_reaction(event: ReactionEvent, runtime: Runtime) {
    tokio::spawn(async move {
        let result = best_of::handle_reaction(&event, &runtime).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Handles a slash command, returning the text to respond with.
///
/// Slash commands must be answered inline, so this runs on the caller's task.
#[instrument(skip_all, fields(command = %command.command))]
pub fn handle_command(command: &SlashCommand) -> String {
    match command.command.trim_start_matches('/') {
        "roll" => dice::handle_roll(command),
        other => format!("Sorry, I don't know the `/{other}` command."),
    }
}

// Helpers.

/// Strips a leading `<@BOT>` mention (and any `:`/`,` after it) from `text`.
///
/// Returns `None` when the text does not start with a mention of the bot.
pub fn strip_bot_mention<'a>(text: &'a str, bot_user_id: &str) -> Option<&'a str> {
    let rest = text.trim_start().strip_prefix("<@")?;
    let (mention, rest) = rest.split_once('>')?;
    let mentioned = mention.split('|').next().unwrap_or_default();

    if mentioned != bot_user_id {
        return None;
    }

    Some(rest.trim_start_matches([':', ',']).trim())
}

// Tests.
