//! Public resolution of short codes

use axum::Extension;
use serde::Serialize;

use crate::resolver::Resolver;
use crate::storage::Storage;

use super::Error;
use super::PathParameters;
use super::RequestHit;
use super::Success;

/// Where a short code points to
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub original_url: String,
}

/// Resolve a short code, counting the click
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/resolve/abc123
/// ```
///
/// Response:
/// ```json
/// { "data": { "original_url": "https://example.com" } }
/// ```
pub async fn resolve<S: Storage>(
    Extension(resolver): Extension<Resolver<S>>,
    RequestHit(hit): RequestHit,
    PathParameters(short_code): PathParameters<String>,
) -> Result<Success<ResolveResponse>, Error> {
    let target = resolver.resolve(&short_code, hit).await?;

    Ok(Success::ok(ResolveResponse {
        original_url: target.original_url,
    }))
}
