//! The redirect!
//!
//! The public `/s/{short_code}` endpoint. A found link is announced with a countdown before the
//! client is sent on its way, unless the countdown is skipped.

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::http::header::REFRESH;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::api::Error;
use crate::api::PathParameters;
use crate::api::QueryParameters;
use crate::api::RequestHit;
use crate::api::Success;
use crate::error;
use crate::resolver::Resolver;
use crate::storage::Storage;

/// Seconds counted down before redirecting, unless configured otherwise
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 5;

/// Settings of the redirect view
#[derive(Clone, Copy, Debug)]
pub struct RedirectSettings {
    /// Seconds to count down, 0 redirects right away
    pub countdown_seconds: u32,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
        }
    }
}

/// States of a redirect as seen by the client
///
/// `Loading -> Found -> CountingDown(n..1) -> Redirected` or `Loading -> NotFound`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedirectView {
    Loading,
    Found(String),
    CountingDown { target: String, remaining: u32 },
    Redirected(String),
    NotFound,
}

impl RedirectView {
    /// The lookup finished
    pub fn resolved(self, target: Option<String>) -> Self {
        match (self, target) {
            (Self::Loading, Some(target)) => Self::Found(target),
            (Self::Loading, None) => Self::NotFound,
            (view, _) => view,
        }
    }

    /// Start counting down from `seconds`
    pub fn start_countdown(self, seconds: u32) -> Self {
        match self {
            Self::Found(target) if seconds == 0 => Self::Redirected(target),
            Self::Found(target) => Self::CountingDown {
                target,
                remaining: seconds,
            },
            view => view,
        }
    }

    /// One second passed
    ///
    /// The client counts down on its own, following the `Refresh` header
    #[cfg(test)]
    pub fn tick(self) -> Self {
        match self {
            Self::CountingDown { target, remaining } if remaining <= 1 => Self::Redirected(target),
            Self::CountingDown { target, remaining } => Self::CountingDown {
                target,
                remaining: remaining - 1,
            },
            view => view,
        }
    }

    /// The user does not want to wait
    pub fn skip(self) -> Self {
        match self {
            Self::Found(target) | Self::CountingDown { target, .. } => Self::Redirected(target),
            view => view,
        }
    }

    /// Nothing happens after this state
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirected(_) | Self::NotFound)
    }
}

/// Redirect query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedirectQuery {
    /// Skip the countdown
    skip: bool,
}

/// Countdown information served to the client
#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    pub original_url: String,
    pub remaining_seconds: u32,
}

/// The redirect!
///
/// A lookup is done for the short code, a hit is counted as click. While counting down the
/// client gets a `Refresh` header pointing at the target, afterwards a temporary redirect.
pub async fn redirect<S: Storage>(
    Extension(resolver): Extension<Resolver<S>>,
    Extension(settings): Extension<RedirectSettings>,
    RequestHit(hit): RequestHit,
    PathParameters(short_code): PathParameters<String>,
    QueryParameters(query): QueryParameters<RedirectQuery>,
) -> Result<Response, Error> {
    tracing::debug!("Looking for short code: /s/{short_code}");

    let target = match resolver.resolve(&short_code, hit).await {
        Ok(target) => Some(target.original_url),
        Err(error::Error::NotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };

    let view = RedirectView::Loading.resolved(target);

    let view = if query.skip {
        view.skip()
    } else {
        view.start_countdown(settings.countdown_seconds)
    };

    match view {
        RedirectView::CountingDown { target, remaining } => {
            let location = location(&target)?;

            let mut headers = HeaderMap::new();
            headers.insert(
                REFRESH,
                HeaderValue::from_str(&format!("{remaining}; url={location}"))
                    .map_err(Error::internal_server_error)?,
            );

            Ok((
                headers,
                Success::ok(CountdownResponse {
                    original_url: target,
                    remaining_seconds: remaining,
                }),
            )
                .into_response())
        }
        RedirectView::Redirected(target) => {
            tracing::debug!("Short code `{short_code}` redirecting to: {target}");

            let mut headers = HeaderMap::new();
            headers.insert(
                LOCATION,
                HeaderValue::from_str(&location(&target)?)
                    .map_err(Error::internal_server_error)?,
            );

            Ok((StatusCode::TEMPORARY_REDIRECT, headers).into_response())
        }
        RedirectView::NotFound => {
            tracing::debug!("Short code `{short_code}` not found");

            Err(Error::not_found("Link not found"))
        }
        RedirectView::Loading | RedirectView::Found(_) => {
            Err(Error::internal_server_error("Redirect did not settle"))
        }
    }
}

/// The target as header safe URL
fn location(target: &str) -> Result<String, Error> {
    Url::parse(target)
        .map(String::from)
        .map_err(Error::internal_server_error)
}
