// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::cache::{decode, encode, read_cache, write_cache};
use crate::error::{CacheError, SyncError};
use crate::feed::{DATE_LAYOUT, Episode, fetch_episodes};
use crate::http::{Credentials, HttpClient};

/// Titles longer than this are cut in listings
pub const TITLE_WIDTH: usize = 60;

const ELLIPSIS: &str = "...";

/// A configured podcast and its episodes as last synced or loaded
#[derive(Debug, Clone, Default)]
pub struct Podcast {
    pub id: u32,
    pub name: String,
    /// Feed URL
    pub feed: String,
    /// Directory holding the cache file and downloaded episodes
    pub path: PathBuf,
    pub username: String,
    pub password: String,
    pub episodes: Vec<Episode>,
}

impl Podcast {
    /// Create a podcast without credentials and with no episodes
    pub fn new(id: u32, name: &str, feed: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.to_string(),
            feed: feed.to_string(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Basic auth credentials, `None` when both username and password are empty
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::new(&self.username, &self.password)
    }

    /// Fetch the feed, replace the episodes and rewrite the cache file
    ///
    /// On [`SyncError::Feed`] the episodes are left as they were. On
    /// [`SyncError::Persist`] the episodes have already been replaced but the
    /// cache on disk still holds the previous sync.
    pub async fn sync<C: HttpClient>(&mut self, client: &C) -> Result<(), SyncError> {
        let credentials = self.credentials();
        let episodes = fetch_episodes(client, &self.feed, credentials.as_ref()).await?;

        info!(podcast = %self.name, episodes = episodes.len(), "synced feed");
        self.episodes = episodes;

        self.persist().map_err(|e| {
            warn!(podcast = %self.name, error = %e, "episodes updated but cache is stale");
            SyncError::Persist(e)
        })
    }

    fn persist(&self) -> Result<(), CacheError> {
        let blob = encode(&self.episodes).map_err(|e| {
            warn!(podcast = %self.name, error = %e, "could not encode episodes");
            CacheError::Encode(e)
        })?;
        write_cache(&self.path, &blob)
    }

    /// Replace the episodes with the contents of the cache file
    ///
    /// Never touches the network. On error the episodes are left untouched.
    pub fn load(&mut self) -> Result<(), CacheError> {
        let blob = read_cache(&self.path)?;
        let episodes = decode(&blob).map_err(|e| {
            warn!(podcast = %self.name, error = %e, "could not decode episodes");
            CacheError::Corrupt {
                path: crate::cache::cache_path(&self.path),
                source: e,
            }
        })?;

        debug!(podcast = %self.name, episodes = episodes.len(), "loaded episodes from cache");
        self.episodes = episodes;
        Ok(())
    }

    /// Look up an episode by its 1-based listing index
    pub fn episode(&self, index: usize) -> Option<&Episode> {
        index.checked_sub(1).and_then(|i| self.episodes.get(i))
    }
}

/// Width of the title column: the longest title, capped at [`TITLE_WIDTH`]
pub fn title_column_width(episodes: &[Episode]) -> usize {
    episodes
        .iter()
        .map(|e| e.title.chars().count())
        .max()
        .unwrap_or(0)
        .min(TITLE_WIDTH)
}

/// Cut a title to at most [`TITLE_WIDTH`] characters, marking the cut with `...`
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }

    let kept: String = title.chars().take(TITLE_WIDTH - ELLIPSIS.len()).collect();
    format!("{kept}{ELLIPSIS}")
}

impl fmt::Display for Podcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "All episodes of {} (id: {})", self.name, self.id)?;

        let width = title_column_width(&self.episodes);
        for (index, episode) in self.episodes.iter().enumerate() {
            writeln!(
                f,
                "{:<4} {:<width$} {:>20}",
                index + 1,
                truncate_title(&episode.title),
                episode.date.format(DATE_LAYOUT).to_string(),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::feed::parse_date;
    use crate::http::{ByteStream, HttpResponse};
    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::tempdir;

    struct MockHttpClient {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(
            &self,
            _url: &str,
            _credentials: Option<&Credentials>,
        ) -> Result<HttpResponse, reqwest::Error> {
            let data = self.body.clone().into_bytes();
            let stream: ByteStream =
                Box::pin(futures::stream::once(async move { Ok(Bytes::from(data)) }));

            Ok(HttpResponse {
                status: self.status,
                content_length: None,
                body: stream,
            })
        }
    }

    const SAMPLE_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test Podcast</title>
    <description>A test podcast</description>
    <item>
      <title>Episode 1</title>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <enclosure url="https://example.com/ep1.mp3" length="100" type="audio/mpeg"/>
    </item>
    <item>
      <title>Episode 2</title>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
      <enclosure url="https://example.com/ep2.mp3" length="200" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    fn make_episode(title: &str) -> Episode {
        Episode {
            title: title.to_string(),
            date: parse_date("Mon, 01 Jan 2024 12:00:00 +0000").unwrap(),
            url: "https://example.com/ep.mp3".to_string(),
            length: 1,
        }
    }

    fn ok_client() -> MockHttpClient {
        MockHttpClient {
            status: 200,
            body: SAMPLE_FEED.to_string(),
        }
    }

    #[tokio::test]
    async fn sync_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", dir.path());

        podcast.sync(&ok_client()).await.unwrap();
        assert_eq!(podcast.episodes.len(), 2);
        assert!(dir.path().join(".feed").exists());

        let mut reloaded = Podcast::new(1, "test", "https://example.com/feed.xml", dir.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.episodes, podcast.episodes);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_episodes() {
        let dir = tempdir().unwrap();
        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", dir.path());
        podcast.episodes = vec![make_episode("kept")];

        let client = MockHttpClient {
            status: 404,
            body: String::new(),
        };
        let err = podcast.sync(&client).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FeedNotFound);
        assert!(!err.is_cache_stale());
        assert_eq!(podcast.episodes, vec![make_episode("kept")]);
        assert!(!dir.path().join(".feed").exists());
    }

    #[tokio::test]
    async fn failed_parse_keeps_previous_episodes() {
        let dir = tempdir().unwrap();
        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", dir.path());
        podcast.episodes = vec![make_episode("kept")];

        let client = MockHttpClient {
            status: 200,
            body: "garbage".to_string(),
        };
        let err = podcast.sync(&client).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ParserIssue);
        assert_eq!(podcast.episodes.len(), 1);
    }

    #[tokio::test]
    async fn failed_persist_updates_memory_and_flags_stale_cache() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let mut podcast = Podcast::new(
            1,
            "test",
            "https://example.com/feed.xml",
            blocker.join("show"),
        );
        let err = podcast.sync(&ok_client()).await.unwrap_err();

        assert!(err.is_cache_stale());
        assert_eq!(err.kind(), ErrorKind::FilesystemError);
        assert_eq!(podcast.episodes.len(), 2);
    }

    #[test]
    fn load_without_cache_is_unavailable_and_keeps_episodes() {
        let dir = tempdir().unwrap();
        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", dir.path());
        podcast.episodes = vec![make_episode("kept")];

        let err = podcast.load().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CacheUnavailable);
        assert_eq!(podcast.episodes, vec![make_episode("kept")]);
    }

    #[test]
    fn load_corrupt_cache_is_unavailable() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".feed"), b"UENEMQ==garbage").unwrap();

        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", dir.path());
        let err = podcast.load().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CacheUnavailable);
        assert!(podcast.episodes.is_empty());
    }

    #[test]
    fn credentials_absent_when_empty() {
        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", "/tmp");
        assert!(podcast.credentials().is_none());

        podcast.username = "user".to_string();
        podcast.password = "pass".to_string();
        let creds = podcast.credentials().unwrap();
        assert_eq!(creds.username, "user");
        assert_eq!(creds.password, "pass");
    }

    #[test]
    fn episode_lookup_is_one_based() {
        let mut podcast = Podcast::new(1, "test", "https://example.com/feed.xml", "/tmp");
        podcast.episodes = vec![make_episode("first"), make_episode("second")];

        assert!(podcast.episode(0).is_none());
        assert_eq!(podcast.episode(1).unwrap().title, "first");
        assert_eq!(podcast.episode(2).unwrap().title, "second");
        assert!(podcast.episode(3).is_none());
    }

    #[test]
    fn truncate_long_title_to_exact_width() {
        let long = "x".repeat(TITLE_WIDTH + 25);
        let cut = truncate_title(&long);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), TITLE_WIDTH);
    }

    #[test]
    fn truncate_keeps_short_and_exact_titles() {
        assert_eq!(truncate_title("short"), "short");
        let exact = "y".repeat(TITLE_WIDTH);
        assert_eq!(truncate_title(&exact), exact);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let long = "ä".repeat(TITLE_WIDTH + 1);
        let cut = truncate_title(&long);
        assert_eq!(cut.chars().count(), TITLE_WIDTH);
    }

    #[test]
    fn column_width_follows_longest_title() {
        let episodes = vec![make_episode("abc"), make_episode("abcdefgh")];
        assert_eq!(title_column_width(&episodes), 8);

        let episodes = vec![make_episode(&"z".repeat(200))];
        assert_eq!(title_column_width(&episodes), TITLE_WIDTH);

        assert_eq!(title_column_width(&[]), 0);
    }

    #[test]
    fn listing_pads_titles_to_column_width() {
        let mut podcast = Podcast::new(7, "Show", "https://example.com/feed.xml", "/tmp");
        podcast.episodes = vec![make_episode("abc"), make_episode("abcdefgh")];

        let listing = podcast.to_string();
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines[0], "All episodes of Show (id: 7)");
        assert_eq!(
            lines[1],
            "1    abc      Mon, 01 Jan 2024 12:00:00 +0000"
        );
        assert_eq!(
            lines[2],
            "2    abcdefgh Mon, 01 Jan 2024 12:00:00 +0000"
        );
    }

    #[test]
    fn listing_truncates_long_titles() {
        let mut podcast = Podcast::new(1, "Show", "https://example.com/feed.xml", "/tmp");
        podcast.episodes = vec![make_episode(&"t".repeat(80)), make_episode("short")];

        let listing = podcast.to_string();
        let lines: Vec<&str> = listing.lines().collect();

        let expected_title = format!("{}...", "t".repeat(TITLE_WIDTH - 3));
        assert!(lines[1].starts_with(&format!("1    {} ", expected_title)));
        assert!(lines[2].starts_with(&format!("2    {:<60} ", "short")));
    }
}
