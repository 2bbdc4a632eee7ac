//! Time check: `timecheck 3:30` (optionally with `am`/`pm`).
//!
//! The time is read in the sender's timezone and answered with a Slack date
//! token, so that every reader sees it rendered in their own local time.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use tracing::{debug, instrument, warn};

use crate::{
    base::types::{Action, ChatMessage, Res},
    runtime::Runtime,
};

use super::{MessageScript, Mode};

static PATTERN: OnceLock<Regex> = OnceLock::new();

/// Normalizes a clock reading to 24-hour `(hour, minute)`.
pub fn parse_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<(u32, u32)> {
    if minute > 59 {
        return None;
    }

    match meridiem.map(str::to_lowercase).as_deref() {
        Some("am") if (1..=12).contains(&hour) => Some((hour % 12, minute)),
        Some("pm") if (1..=12).contains(&hour) => Some((hour % 12 + 12, minute)),
        None if hour <= 23 => Some((hour, minute)),
        _ => None,
    }
}

/// Today's `hour:minute` in `tz`, moved forward if that is already past.
///
/// A bare clock reading rolls forward 12 hours (`3:30` after lunch means the
/// afternoon). With an explicit meridiem the half of the day is fixed, so it
/// rolls forward to tomorrow instead.
pub fn resolve(hour: u32, minute: u32, has_meridiem: bool, tz: Tz, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
    let local_now = now.with_timezone(&tz);
    let naive = local_now.date_naive().and_hms_opt(hour, minute, 0)?;
    let candidate = tz.from_local_datetime(&naive).earliest()?;

    if candidate >= local_now {
        return Some(candidate);
    }

    if has_meridiem {
        let tomorrow = naive.checked_add_signed(Duration::days(1))?;
        tz.from_local_datetime(&tomorrow).earliest()
    } else {
        Some(candidate + Duration::hours(12))
    }
}

/// Formats a time as a Slack date token with a plain-text fallback.
pub fn date_token(time: &DateTime<Tz>) -> String {
    format!("<!date^{}^{{time}} {{date_short_pretty}}|{}>", time.timestamp(), time.format("%-I:%M %p %Z on %b %-d"))
}

pub struct TimeCheck;

#[async_trait]
impl MessageScript for TimeCheck {
    fn name(&self) -> &'static str {
        "timecheck"
    }

    fn mode(&self) -> Mode {
        Mode::Hear
    }

    /// Groups: hour, minute, optional meridiem.
    fn pattern(&self) -> &Regex {
        PATTERN.get_or_init(|| Regex::new(r"(?i)\btimecheck\s+(\d{1,2}):(\d{2})\s*(am|pm)?\b").unwrap())
    }

    #[instrument(name = "TimeCheck::handle", skip_all)]
    async fn handle(&self, runtime: &Runtime, message: &ChatMessage, captures: &Captures<'_>) -> Res<Vec<Action>> {
        let hour = captures[1].parse::<u32>()?;
        let minute = captures[2].parse::<u32>()?;
        let meridiem = captures.get(3).map(|m| m.as_str());

        let Some((hour, minute)) = parse_time(hour, minute, meridiem) else {
            debug!("Ignoring invalid time.");
            return Ok(vec![]);
        };

        let tz = match runtime.chat.get_user_timezone(&message.user_id).await? {
            Some(name) => name.parse::<Tz>().or_else(|_| {
                warn!("Unknown timezone `{}`; using the default.", name);
                runtime.config.timezone()
            })?,
            None => runtime.config.timezone()?,
        };

        let Some(time) = resolve(hour, minute, meridiem.is_some(), tz, Utc::now()) else {
            debug!("Time does not exist in `{}`.", tz);
            return Ok(vec![]);
        };

        Ok(vec![Action::reply(format!("<@{}> means {}.", message.user_id, date_token(&time)))])
    }
}
