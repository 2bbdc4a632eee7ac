//! Library root for `crew-bot`.
//!
//! Crew-bot is a Slack bot hosting a handful of small, independent chat scripts:
//! - Glossary lookups and haiku detection
//! - Tock lines per channel, kept in a key-value "brain"
//! - Love broadcasts, time checks, dice rolls, and other team niceties
//!
//! Each script matches an incoming message (or event, or slash command) and
//! returns the actions to take. The services the scripts use (chat, brain,
//! glossary) sit behind traits so that different implementations can be used.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the crew-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with brain, glossary, and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting crew-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
