// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::BufRead;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FeedError;

/// Timestamp layout used for feed `pubDate` values and for listings
///
/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const DATE_LAYOUT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Represents a single podcast episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub url: String,
    /// Media length in bytes as declared by the feed
    pub length: u64,
}

/// Parse a `pubDate` string with [`DATE_LAYOUT`]
pub fn parse_date(date_str: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(date_str.trim(), DATE_LAYOUT)
}

/// Parse RSS feed XML into the ordered list of episodes it declares
///
/// Items whose date does not match [`DATE_LAYOUT`] are logged and skipped;
/// everything else keeps its position from the document.
pub fn extract_episodes<R: BufRead>(content: R) -> Result<Vec<Episode>, FeedError> {
    let channel = rss::Channel::read_from(content)?;

    let episodes: Vec<Episode> = channel.items().iter().filter_map(parse_episode).collect();

    debug!(
        items = channel.items().len(),
        episodes = episodes.len(),
        "extracted episodes from feed"
    );

    Ok(episodes)
}

fn parse_episode(item: &rss::Item) -> Option<Episode> {
    let title = item.title().unwrap_or_default().to_string();
    let date_str = item.pub_date().unwrap_or_default();

    let date = match parse_date(date_str) {
        Ok(date) => date,
        Err(e) => {
            warn!(%title, date = date_str, error = %e, "could not parse episode, skipping");
            return None;
        }
    };

    let (url, length) = item
        .enclosure()
        .map(|enc| (enc.url().to_string(), enc.length().trim().parse().unwrap_or(0)))
        .unwrap_or_default();

    Some(Episode {
        title,
        date,
        url,
        length,
    })
}
