// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::FeedError;
use crate::http::{Credentials, HttpClient};

use super::parse::{Episode, extract_episodes};

/// Upper bound on the buffer reserved up front from a declared Content-Length
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Fetch raw feed bytes from a URL (without parsing)
///
/// Only status 200 yields a body; every other status is classified into a
/// [`FeedError`] before the body is read.
pub async fn fetch_feed_bytes<C: HttpClient>(
    client: &C,
    url: &str,
    credentials: Option<&Credentials>,
) -> Result<Bytes, FeedError> {
    Url::parse(url).map_err(|e| {
        error!(url, error = %e, "invalid feed url");
        FeedError::InvalidUrl {
            url: url.to_string(),
            source: e,
        }
    })?;

    debug!(url, authenticated = credentials.is_some(), "fetching feed");

    let response = client.get(url, credentials).await.map_err(|e| {
        error!(url, error = %e, "feed request failed");
        FeedError::RequestFailed {
            url: url.to_string(),
            source: e,
        }
    })?;

    match response.status {
        200 => {}
        401 | 403 => {
            warn!(url, status = response.status, "access denied to feed");
            return Err(FeedError::AccessDenied {
                url: url.to_string(),
                status: response.status,
            });
        }
        404 => {
            warn!(url, "feed not found");
            return Err(FeedError::NotFound {
                url: url.to_string(),
            });
        }
        status => {
            warn!(url, status, "unexpected feed response status");
            return Err(FeedError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
    }

    // Content-Length is server controlled, so it only caps the initial allocation
    let capacity = response.content_length.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
    let mut body = BytesMut::with_capacity(capacity);
    let mut stream = response.body;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            error!(url, error = %e, "feed body stream failed");
            FeedError::RequestFailed {
                url: url.to_string(),
                source: e,
            }
        })?;
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

/// Fetch a feed and extract its episodes
pub async fn fetch_episodes<C: HttpClient>(
    client: &C,
    url: &str,
    credentials: Option<&Credentials>,
) -> Result<Vec<Episode>, FeedError> {
    let bytes = fetch_feed_bytes(client, url, credentials).await?;
    extract_episodes(bytes.as_ref()).inspect_err(|e| error!(url, error = %e, "could not parse feed"))
}
