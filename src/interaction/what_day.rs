//! What day is it? Still March 2020, obviously.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use regex::{Captures, Regex};
use tracing::instrument;

use crate::{
    base::types::{Action, ChatMessage, Res},
    runtime::Runtime,
};

use super::{MessageScript, Mode};

static PATTERN: OnceLock<Regex> = OnceLock::new();
static EPOCH: OnceLock<NaiveDate> = OnceLock::new();

/// Day of "March 2020" that `today` falls on, counting March 1st as day 1.
pub fn march_day(today: NaiveDate) -> i64 {
    let epoch = EPOCH.get_or_init(|| NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());

    (today - *epoch).num_days() + 1
}

/// Formats `n` with thousands separators and an English ordinal suffix.
pub fn ordinal(n: i64) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };

    let digits = n.to_string();
    let mut grouped = String::new();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{grouped}{suffix}")
}

/// The reply for a given date.
pub fn what_day(today: NaiveDate) -> String {
    match march_day(today) {
        day if day < 1 => "It isn't March 2020 yet.".to_string(),
        day => format!("It's March {}, 2020.", ordinal(day)),
    }
}

pub struct WhatDay;

#[async_trait]
impl MessageScript for WhatDay {
    fn name(&self) -> &'static str {
        "what-day"
    }

    fn mode(&self) -> Mode {
        Mode::Hear
    }

    fn pattern(&self) -> &Regex {
        PATTERN.get_or_init(|| Regex::new(r"(?i)\bwhat day is it\b").unwrap())
    }

    #[instrument(name = "WhatDay::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, _message: &ChatMessage, _captures: &Captures<'_>) -> Res<Vec<Action>> {
        let today = Utc::now().with_timezone(&runtime.config.timezone()?).date_naive();

        Ok(vec![Action::reply(what_day(today))])
    }
}
