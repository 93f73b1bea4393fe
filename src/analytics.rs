//! Click analytics
//!
//! Buckets click events into calendar days of the caller, trailing window ending today

use chrono::DateTime;
use chrono::Days;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::links::Link;
use crate::storage::Storage;

/// Window used when the caller does not ask for one
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Largest window that can be requested
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Largest distance from UTC of a calendar, in minutes
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Clicks on a single calendar day
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    /// The calendar day, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Number of clicks on that day
    pub count: u64,
}

/// The calendar of the caller
pub fn calendar(utc_offset_minutes: i32) -> Result<FixedOffset> {
    if utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(Error::InvalidInput(format!(
            "UTC offset must be within ±{MAX_UTC_OFFSET_MINUTES} minutes"
        )));
    }

    FixedOffset::east_opt(utc_offset_minutes * 60)
        .ok_or_else(|| Error::InvalidInput("Invalid UTC offset".to_string()))
}

/// Check the requested window size
pub fn check_window(window_days: u32) -> Result<()> {
    if (1..=MAX_WINDOW_DAYS).contains(&window_days) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Window must be between 1 and {MAX_WINDOW_DAYS} days"
        )))
    }
}

/// First calendar day of the window
fn first_day(now: DateTime<Utc>, window_days: u32, calendar: FixedOffset) -> NaiveDate {
    let today = now.with_timezone(&calendar).date_naive();

    today - Days::new(u64::from(window_days.saturating_sub(1)))
}

/// Start of the window: local midnight of the first day, as UTC
pub fn window_start(now: DateTime<Utc>, window_days: u32, calendar: FixedOffset) -> DateTime<Utc> {
    let local_midnight = first_day(now, window_days, calendar).and_time(NaiveTime::MIN);

    (local_midnight - TimeDelta::seconds(i64::from(calendar.local_minus_utc()))).and_utc()
}

/// Bucket click moments into calendar days
///
/// Always `window_days` entries, oldest first, days without clicks count zero. Clicks outside
/// of the window are ignored.
pub fn bucket_by_day<I>(
    clicked_at: I,
    now: DateTime<Utc>,
    window_days: u32,
    calendar: FixedOffset,
) -> Vec<DailyClicks>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let first_day = first_day(now, window_days, calendar);

    let mut days = first_day
        .iter_days()
        .take(window_days as usize)
        .map(|date| DailyClicks { date, count: 0 })
        .collect::<Vec<DailyClicks>>();

    for moment in clicked_at {
        let date = moment.with_timezone(&calendar).date_naive();
        let offset = (date - first_day).num_days();

        if let Some(day) = usize::try_from(offset).ok().and_then(|i| days.get_mut(i)) {
            day.count += 1;
        }
    }

    days
}

/// Daily clicks of a link over the trailing window ending today
pub async fn daily_clicks<S: Storage>(
    storage: &S,
    link: &Link,
    window_days: u32,
    calendar: FixedOffset,
    now: DateTime<Utc>,
) -> Result<Vec<DailyClicks>> {
    check_window(window_days)?;

    let since = window_start(now, window_days, calendar);

    let clicks = storage
        .find_all_clicks_by_link_since(&link.id, &since)
        .await?;

    tracing::debug!(
        "Bucketing {} clicks of link {} since {since}",
        clicks.len(),
        link.id
    );

    Ok(bucket_by_day(
        clicks.iter().map(|click| click.clicked_at),
        now,
        window_days,
        calendar,
    ))
}
