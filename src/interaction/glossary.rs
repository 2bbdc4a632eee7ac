//! Glossary lookup: `glossary <term>` or `define <term>`.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::instrument;

use crate::{
    base::types::{Action, ChatMessage, Res},
    runtime::Runtime,
};

use super::{MessageScript, Mode};

static PATTERN: OnceLock<Regex> = OnceLock::new();

pub struct Glossary;

#[async_trait]
impl MessageScript for Glossary {
    fn name(&self) -> &'static str {
        "glossary"
    }

    fn mode(&self) -> Mode {
        Mode::Respond
    }

    fn pattern(&self) -> &Regex {
        PATTERN.get_or_init(|| Regex::new(r"(?i)^(?:glossary|define)\s+(.+?)\??$").unwrap())
    }

    /// Fetch and parse failures propagate; the user sees nothing in that case.
    #[instrument(name = "Glossary::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, _message: &ChatMessage, captures: &Captures<'_>) -> Res<Vec<Action>> {
        let term = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let glossary = runtime.glossary.fetch().await?;

        let reply = glossary.define(term).unwrap_or_else(|| format!("Sorry, I couldn't find *{term}* in the glossary."));

        Ok(vec![Action::reply(reply)])
    }
}
