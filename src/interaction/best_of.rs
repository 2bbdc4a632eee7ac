//! Best-of relay.
//!
//! When someone adds the best-of reaction to a message, the message's
//! permalink is logged and, if a best-of channel is configured, posted there.

use tracing::{debug, info, instrument};

use crate::{
    base::types::{ReactionEvent, Void},
    runtime::Runtime,
};

#[instrument(skip_all, fields(reaction = %event.reaction))]
pub async fn handle_reaction(event: &ReactionEvent, runtime: &Runtime) -> Void {
    if event.reaction != runtime.config.best_of_reaction {
        debug!("Ignoring reaction.");
        return Ok(());
    }

    let permalink = runtime.chat.get_permalink(&event.channel_id, &event.ts).await?;

    info!("Best-of message: {}", permalink);

    if let Some(channel) = &runtime.config.best_of_channel {
        let text = format!(":star: <@{}> nominated this for the best-of: {}", event.user_id, permalink);
        runtime.chat.send_message(channel, "", &text).await?;
    }

    Ok(())
}
