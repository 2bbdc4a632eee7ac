//! Runtime services and shared state for crew-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::startup,
    service::{brain::BrainClient, chat::ChatClient, glossary::GlossaryClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and every service client the scripts use.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The brain (key-value store) client instance.
    pub brain: BrainClient,
    /// The glossary client instance.
    pub glossary: GlossaryClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the brain.
        let brain = BrainClient::surreal(&config).await?;

        // Initialize the glossary client.
        let glossary = GlossaryClient::http(&config);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, brain.clone(), glossary.clone()).await?;

        Ok(Self { config, brain, glossary, chat })
    }

    /// Start the runtime.
    ///
    /// Schedules the startup announcement, then runs the chat listener until shutdown.
    pub async fn start(&self) -> Void {
        startup::announce_startup(self.chat.clone(), self.config.status_channel.clone());

        self.chat.start().await
    }
}
