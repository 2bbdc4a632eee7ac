//! Next federal holiday: `next holiday`.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use regex::{Captures, Regex};
use tracing::instrument;

use crate::{
    base::types::{Action, ChatMessage, Res},
    runtime::Runtime,
};

use super::{MessageScript, Mode};

static PATTERN: OnceLock<Regex> = OnceLock::new();

/// How a holiday's date is determined within a year.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// A fixed month and day.
    Fixed(u32, u32),
    /// The nth given weekday of a month.
    Nth(u32, Weekday, u8),
    /// The last given weekday of a month.
    Last(u32, Weekday),
}

/// US federal holidays and the emoji that goes with each.
const HOLIDAYS: [(&str, &str, Rule); 11] = [
    ("New Year's Day", "tada", Rule::Fixed(1, 1)),
    ("Birthday of Martin Luther King, Jr.", "dove_of_peace", Rule::Nth(1, Weekday::Mon, 3)),
    ("Washington's Birthday", "us", Rule::Nth(2, Weekday::Mon, 3)),
    ("Memorial Day", "flag-us", Rule::Last(5, Weekday::Mon)),
    ("Juneteenth National Independence Day", "raised_fist", Rule::Fixed(6, 19)),
    ("Independence Day", "fireworks", Rule::Fixed(7, 4)),
    ("Labor Day", "hammer_and_wrench", Rule::Nth(9, Weekday::Mon, 1)),
    ("Columbus Day", "compass", Rule::Nth(10, Weekday::Mon, 2)),
    ("Veterans Day", "medal", Rule::Fixed(11, 11)),
    ("Thanksgiving Day", "turkey", Rule::Nth(11, Weekday::Thu, 4)),
    ("Christmas Day", "christmas_tree", Rule::Fixed(12, 25)),
];

/// A holiday on the date it is observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub name: &'static str,
    pub emoji: &'static str,
    pub date: NaiveDate,
}

impl Rule {
    fn date(self, year: i32) -> Option<NaiveDate> {
        match self {
            Rule::Fixed(month, day) => observed(NaiveDate::from_ymd_opt(year, month, day)?),
            Rule::Nth(month, weekday, n) => NaiveDate::from_weekday_of_month_opt(year, month, weekday, n),
            Rule::Last(month, weekday) => NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5).or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4)),
        }
    }
}

/// Weekend holidays are observed on the nearest weekday.
fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_sub_days(Days::new(1)),
        Weekday::Sun => date.checked_add_days(Days::new(1)),
        _ => Some(date),
    }
}

/// Every federal holiday of `year`, by observed date.
pub fn federal_holidays(year: i32) -> Vec<Holiday> {
    let mut holidays = HOLIDAYS
        .iter()
        .filter_map(|&(name, emoji, rule)| rule.date(year).map(|date| Holiday { name, emoji, date }))
        .collect::<Vec<_>>();

    holidays.sort_by_key(|h| h.date);
    holidays
}

/// The first holiday observed on or after `today`.
pub fn next_holiday(today: NaiveDate) -> Option<Holiday> {
    (today.year()..=today.year() + 1).flat_map(federal_holidays).find(|h| h.date >= today)
}

/// The reply for a given date.
pub fn describe_next_holiday(today: NaiveDate) -> String {
    let Some(holiday) = next_holiday(today) else {
        return "I couldn't work out when the next federal holiday is.".to_string();
    };

    let when = match (holiday.date - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days => format!("in {days} days"),
    };

    format!(
        "The next federal holiday is {} :{}: on {}, {}.",
        holiday.name,
        holiday.emoji,
        holiday.date.format("%A, %B %-d"),
        when
    )
}

pub struct NextHoliday;

#[async_trait]
impl MessageScript for NextHoliday {
    fn name(&self) -> &'static str {
        "next-holiday"
    }

    fn mode(&self) -> Mode {
        Mode::Hear
    }

    fn pattern(&self) -> &Regex {
        PATTERN.get_or_init(|| Regex::new(r"(?i)\bnext (?:federal )?holiday\b").unwrap())
    }

    #[instrument(name = "NextHoliday::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, _message: &ChatMessage, _captures: &Captures<'_>) -> Res<Vec<Action>> {
        let today = Utc::now().with_timezone(&runtime.config.timezone()?).date_naive();

        Ok(vec![Action::reply(describe_next_holiday(today))])
    }
}
