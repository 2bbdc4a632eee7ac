//! Startup announcement.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, instrument};

use crate::service::chat::ChatClient;

/// How long to wait after boot before announcing.
pub const STARTUP_DELAY: Duration = Duration::from_secs(2);

/// What gets announced.
pub const STARTUP_MESSAGE: &str = "Hello! I just started up and I'm ready to help.";

/// Announces to `channel`, once, after [`STARTUP_DELAY`].
#[instrument(skip(chat))]
pub fn announce_startup(chat: ChatClient, channel: String) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            tokio::time::sleep(STARTUP_DELAY).await;

            info!("Announcing startup in `{}`.", channel);

            if let Err(err) = chat.send_message(&channel, "", STARTUP_MESSAGE).await {
                error!("Error while announcing startup: {}", err);
            }
        }
        .in_current_span(),
    )
}
