//! Haiku detection.
//!
//! Any message with exactly 17 syllables is split greedily into lines of 5, 7
//! and 5 syllables. Words are never moved back once placed, so a word that
//! straddles a line boundary makes the split fail and the bot stays quiet.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::{debug, instrument};

use crate::{
    base::types::{Action, ChatMessage, Res},
    runtime::Runtime,
};

use super::{MessageScript, Mode};

/// Syllable targets for each line.
const LINE_SYLLABLES: [usize; 3] = [5, 7, 5];

static PATTERN: OnceLock<Regex> = OnceLock::new();
static SILENT_ENDING: OnceLock<Regex> = OnceLock::new();
static LEADING_Y: OnceLock<Regex> = OnceLock::new();
static VOWEL_GROUP: OnceLock<Regex> = OnceLock::new();

/// Estimate the syllables in a single word.
///
/// Only letters are considered; a word without any counts zero.
pub fn count_syllables(word: &str) -> usize {
    let word = word.chars().filter(|c| c.is_alphabetic()).collect::<String>().to_lowercase();

    if word.is_empty() {
        return 0;
    }

    if word.chars().count() <= 3 {
        return 1;
    }

    let silent_ending = SILENT_ENDING.get_or_init(|| Regex::new(r"(?:[^laeiouy]es|ed|[^laeiouy]e)$").unwrap());
    let leading_y = LEADING_Y.get_or_init(|| Regex::new(r"^y").unwrap());
    let vowel_group = VOWEL_GROUP.get_or_init(|| Regex::new(r"[aeiouy]{1,2}").unwrap());

    let word = silent_ending.replace(&word, "");
    let word = leading_y.replace(&word, "");

    vowel_group.find_iter(&word).count().max(1)
}

/// Split `text` into a 5/7/5 haiku, if it is one.
pub fn detect(text: &str) -> Option<[String; 3]> {
    let words = text.split_whitespace().map(|w| (w, count_syllables(w))).collect::<Vec<_>>();
    let total = words.iter().map(|(_, s)| s).sum::<usize>();

    if total != LINE_SYLLABLES.iter().sum::<usize>() {
        return None;
    }

    let mut lines: [Vec<&str>; 3] = Default::default();
    let mut counts = [0usize; 3];
    let mut line = 0;

    for (word, syllables) in words {
        // Only move on once there is something to put on the next line.
        if counts[line] == LINE_SYLLABLES[line] && syllables > 0 && line + 1 < LINE_SYLLABLES.len() {
            line += 1;
        }

        lines[line].push(word);
        counts[line] += syllables;

        if counts[line] > LINE_SYLLABLES[line] {
            debug!("Line {} overshot its syllable count.", line + 1);
            return None;
        }
    }

    Some(lines.map(|words| words.join(" ")))
}

pub struct Haiku;

#[async_trait]
impl MessageScript for Haiku {
    fn name(&self) -> &'static str {
        "haiku"
    }

    fn mode(&self) -> Mode {
        Mode::Hear
    }

    fn pattern(&self) -> &Regex {
        PATTERN.get_or_init(|| Regex::new(r"(?s).+").unwrap())
    }

    #[instrument(name = "Haiku::handle", skip_all)]
    async fn handle(&self, _runtime: &Runtime, message: &ChatMessage, _captures: &Captures<'_>) -> Res<Vec<Action>> {
        Ok(detect(&message.text).map(|lines| vec![Action::reply(lines.join("\n"))]).unwrap_or_default())
    }
}
