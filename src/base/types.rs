//! Shared types: result aliases, incoming chat events, and the actions scripts return.

/// Error type used throughout the bot.
pub type Err = anyhow::Error;
/// Result with the bot's error type.
pub type Res<T> = Result<T, Err>;
/// Result without a value.
pub type Void = Res<()>;

/// A chat message, normalized away from the chat platform's event shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Author of the message.
    pub user_id: String,
    /// Message text, with any leading bot mention stripped.
    pub text: String,
    /// Timestamp of the message itself.
    pub ts: String,
    /// Timestamp of the parent message when posted inside a thread.
    pub thread_ts: Option<String>,
    /// Whether the message was addressed to the bot (mention or direct message).
    pub addressed: bool,
}

/// A reaction added to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionEvent {
    /// User who added the reaction.
    pub user_id: String,
    /// Reaction name, without colons.
    pub reaction: String,
    /// Channel of the reacted-to message.
    pub channel_id: String,
    /// Timestamp of the reacted-to message.
    pub ts: String,
}

/// A slash command invocation, e.g. `/roll d6`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommand {
    /// The command, including its leading slash.
    pub command: String,
    /// Everything typed after the command.
    pub text: String,
    /// User who ran the command.
    pub user_id: String,
    /// Channel the command was run in.
    pub channel_id: String,
}

/// Something a script wants done in response to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reply in the same channel, in the same thread if the message was threaded.
    Reply {
        /// Message text.
        text: String,
    },
    /// Broadcast to another channel.
    Post {
        /// Channel ID or name.
        channel: String,
        /// Message text.
        text: String,
    },
    /// Reply that only the message author can see.
    Ephemeral {
        /// Message text.
        text: String,
    },
    /// React to the triggering message.
    React {
        /// Emoji name, without colons.
        emoji: String,
    },
}

impl Action {
    /// Shorthand for [`Action::Reply`].
    pub fn reply(text: impl Into<String>) -> Self {
        Action::Reply { text: text.into() }
    }

    /// Shorthand for [`Action::Post`].
    pub fn post(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Post {
            channel: channel.into(),
            text: text.into(),
        }
    }

    /// Shorthand for [`Action::Ephemeral`].
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Action::Ephemeral { text: text.into() }
    }

    /// Shorthand for [`Action::React`].
    pub fn react(emoji: impl Into<String>) -> Self {
        Action::React { emoji: emoji.into() }
    }
}
