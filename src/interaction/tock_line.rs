//! Tock lines: `tock line` and `set tock line <line>`.
//!
//! Every channel may have one tock line, kept in the brain under a single
//! record that maps channel IDs to lines.

use std::{collections::HashMap, sync::OnceLock};

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::{info, instrument};

use crate::{
    base::types::{Action, ChatMessage, Res, Void},
    runtime::Runtime,
    service::brain::BrainClient,
};

use super::{MessageScript, Mode};

/// Brain key holding every channel's tock line.
pub const TOCK_LINES_KEY: &str = "tockLines";

/// Reaction added to a `set tock line` message once the line is stored.
pub const SET_REACTION: &str = "white_check_mark";

static GET_PATTERN: OnceLock<Regex> = OnceLock::new();
static SET_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Get the tock line for a channel, if one was set.
pub async fn get_tock_line(brain: &BrainClient, channel_id: &str) -> Res<Option<String>> {
    let lines: HashMap<String, String> = brain.get_as(TOCK_LINES_KEY).await?.unwrap_or_default();

    Ok(lines.get(channel_id).cloned())
}

/// Set the tock line for a channel, replacing any previous one.
pub async fn set_tock_line(brain: &BrainClient, channel_id: &str, line: &str) -> Void {
    let mut lines: HashMap<String, String> = brain.get_as(TOCK_LINES_KEY).await?.unwrap_or_default();
    lines.insert(channel_id.to_string(), line.to_string());

    brain.set_as(TOCK_LINES_KEY, &lines).await
}

pub struct GetTockLine;

#[async_trait]
impl MessageScript for GetTockLine {
    fn name(&self) -> &'static str {
        "tock-line-get"
    }

    fn mode(&self) -> Mode {
        Mode::Respond
    }

    fn pattern(&self) -> &Regex {
        GET_PATTERN.get_or_init(|| Regex::new(r"(?i)^tock line$").unwrap())
    }

    #[instrument(name = "GetTockLine::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, message: &ChatMessage, _captures: &Captures<'_>) -> Res<Vec<Action>> {
        let reply = match get_tock_line(&runtime.brain, &message.channel_id).await? {
            Some(line) => format!("The tock line for <#{}> is `{}`", message.channel_id, line),
            None => "I don't know a tock line for this room. To set one, say `set tock line <line>`".to_string(),
        };

        Ok(vec![Action::reply(reply)])
    }
}

pub struct SetTockLine;

#[async_trait]
impl MessageScript for SetTockLine {
    fn name(&self) -> &'static str {
        "tock-line-set"
    }

    fn mode(&self) -> Mode {
        Mode::Respond
    }

    fn pattern(&self) -> &Regex {
        SET_PATTERN.get_or_init(|| Regex::new(r"(?i)^set tock line (.+)$").unwrap())
    }

    #[instrument(name = "SetTockLine::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, message: &ChatMessage, captures: &Captures<'_>) -> Res<Vec<Action>> {
        let line = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

        set_tock_line(&runtime.brain, &message.channel_id, line).await?;

        info!("Tock line for `{}` set.", message.channel_id);

        Ok(vec![
            Action::react(SET_REACTION),
            Action::reply(format!("Okay, I set the tock line for <#{}> to `{}`", message.channel_id, line)),
        ])
    }
}
