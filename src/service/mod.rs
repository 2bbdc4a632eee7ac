//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by crew-bot:
//! - Chat services (e.g., Slack)
//! - The brain, a key-value store (e.g., SurrealDB)
//! - The glossary source (e.g., a YAML file over HTTP)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod brain;
pub mod chat;
pub mod glossary;
