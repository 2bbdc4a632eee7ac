//! Core components and types for crew-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Common types, result handling, and the chat events and actions that scripts exchange.

pub mod config;
pub mod types;
