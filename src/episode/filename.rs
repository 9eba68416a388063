// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

/// Filename for a downloaded episode: the last path segment of its URL
///
/// The segment is used as-is, without sanitization. Episode URLs are
/// assumed to come from a trusted feed. Returns `None` when the URL has no
/// usable final segment (unparseable, or ending in `/`).
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(String::from)
}
