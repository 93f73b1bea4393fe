//! Click analytics of a link

use axum::Extension;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::analytics;
use crate::analytics::DEFAULT_WINDOW_DAYS;
use crate::analytics::DailyClicks;
use crate::storage::Storage;

use super::CurrentUser;
use super::Error;
use super::PathParameters;
use super::QueryParameters;
use super::Success;
use super::utils::fetch_owned_link;

/// Analytics query parameters
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalyticsQuery {
    /// Number of trailing calendar days, today included
    window_days: u32,

    /// Offset of the calendar of the caller to UTC
    utc_offset_minutes: i32,
}

impl Default for AnalyticsQuery {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            utc_offset_minutes: 0,
        }
    }
}

/// Daily clicks of a link
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/api/links/<uuid>/analytics?window_days=7&utc_offset_minutes=120'
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "date": "2024-03-04", "count": 0 }, ... { "date": "2024-03-10", "count": 3 } ] }
/// ```
pub async fn daily_clicks<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(link_id): PathParameters<Uuid>,
    QueryParameters(query): QueryParameters<AnalyticsQuery>,
) -> Result<Success<Vec<DailyClicks>>, Error> {
    let calendar = analytics::calendar(query.utc_offset_minutes)?;

    let link = fetch_owned_link(&storage, &current_user.id, &link_id).await?;

    let days =
        analytics::daily_clicks(&storage, &link, query.window_days, calendar, Utc::now()).await?;

    Ok(Success::ok(days))
}
