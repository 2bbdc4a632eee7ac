//! Love broadcaster: `love @someone for being great`.
//!
//! The message is relayed verbatim to the love channel, and the sender gets a
//! quiet thank-you.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::{info, instrument};

use crate::{
    base::types::{Action, ChatMessage, Res},
    runtime::Runtime,
};

use super::{MessageScript, Mode};

static PATTERN: OnceLock<Regex> = OnceLock::new();

pub struct Love;

#[async_trait]
impl MessageScript for Love {
    fn name(&self) -> &'static str {
        "love"
    }

    fn mode(&self) -> Mode {
        Mode::Hear
    }

    /// Group 1 holds the recipients, group 2 the reason.
    fn pattern(&self) -> &Regex {
        PATTERN.get_or_init(|| Regex::new(r"(?is)^love\s+((?:<@[^>]+>[\s,]*(?:and\s+)?)+)(.+)$").unwrap())
    }

    #[instrument(name = "Love::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, message: &ChatMessage, _captures: &Captures<'_>) -> Res<Vec<Action>> {
        let channel = &runtime.config.love_channel;

        info!("Relaying love to `{}`.", channel);

        Ok(vec![
            Action::post(channel.as_str(), format!("<@{}>: {}", message.user_id, message.text)),
            Action::ephemeral(format!("Yay, more love for #{channel}! Thanks, <@{}>!", message.user_id)),
        ])
    }
}
