// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Caller-facing classification shared by every error in the crate
///
/// Callers branch on this rather than on the concrete error variant; the
/// underlying cause stays reachable through `std::error::Error::source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be built (invalid feed URL)
    SyncFailed,
    /// Transport error or an HTTP status without a dedicated kind
    RequestFailed,
    /// HTTP 401 or 403 on the feed
    AccessDenied,
    /// HTTP 404 on the feed
    FeedNotFound,
    /// The feed document could not be parsed
    ParserIssue,
    /// Directory creation, file creation or write failure while persisting
    FilesystemError,
    /// The episode list could not be serialized
    EncodeError,
    /// The cache file is missing, unreadable or undecodable
    CacheUnavailable,
    /// Any failure while downloading an episode
    DownloadFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::SyncFailed => "could not sync podcast",
            ErrorKind::RequestFailed => "could not perform request",
            ErrorKind::AccessDenied => "access denied to feed",
            ErrorKind::FeedNotFound => "could not find feed",
            ErrorKind::ParserIssue => "could not parse feed",
            ErrorKind::FilesystemError => "could not do filesystem request",
            ErrorKind::EncodeError => "could not encode feed",
            ErrorKind::CacheUnavailable => "could not read episodes from cache",
            ErrorKind::DownloadFailed => "could not download episode",
        };
        f.write_str(msg)
    }
}

/// Errors that can occur when fetching or parsing RSS feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Invalid feed URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Could not perform request to {url}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Access denied to feed {url} (HTTP {status})")]
    AccessDenied { url: String, status: u16 },

    #[error("Could not find feed {url} (404)")]
    NotFound { url: String },

    #[error("Could not parse the content from the feed")]
    ParseFailed(#[from] rss::Error),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::InvalidUrl { .. } => ErrorKind::SyncFailed,
            FeedError::RequestFailed { .. } | FeedError::HttpStatus { .. } => {
                ErrorKind::RequestFailed
            }
            FeedError::AccessDenied { .. } => ErrorKind::AccessDenied,
            FeedError::NotFound { .. } => ErrorKind::FeedNotFound,
            FeedError::ParseFailed(_) => ErrorKind::ParserIssue,
        }
    }
}

/// Errors produced by the cache blob codec
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to serialize episodes")]
    Serialize(#[from] rmp_serde::encode::Error),

    #[error("Cache blob is not valid base64")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Cache blob has an unknown format marker")]
    UnknownFormat,

    #[error("Cache blob is truncated ({len} bytes)")]
    Truncated { len: usize },

    #[error("Cache blob checksum mismatch")]
    ChecksumMismatch,

    #[error("Failed to deserialize episodes")]
    Deserialize(#[from] rmp_serde::decode::Error),

    #[error("Cache blob has {count} unexpected trailing bytes")]
    TrailingBytes { count: usize },
}

/// Errors that can occur when reading or writing the episode cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not create cache directory {path}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write cache file {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode feed")]
    Encode(#[source] CodecError),

    #[error("Could not read episodes from cache {path}. Perform a sync and try again.")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not decode episodes from cache {path}. Perform a sync and try again.")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl CacheError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::CreateDirectoryFailed { .. } | CacheError::WriteFailed { .. } => {
                ErrorKind::FilesystemError
            }
            CacheError::Encode(_) => ErrorKind::EncodeError,
            CacheError::Unavailable { .. } | CacheError::Corrupt { .. } => {
                ErrorKind::CacheUnavailable
            }
        }
    }
}

/// Errors that can occur during episode downloads
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed for {url}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Cannot derive a filename from {url}")]
    InvalidFilename { url: String },

    #[error("Failed to create file {path}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to mirror download to observer")]
    ObserverWriteFailed(#[source] std::io::Error),

    #[error("Stream error while downloading {url}")]
    StreamFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::DownloadFailed
    }
}

/// Errors returned by [`Podcast::sync`](crate::Podcast::sync)
///
/// The two variants mirror the two phases of a sync. A `Feed` error means
/// nothing changed. A `Persist` error means the in-memory episodes were
/// replaced but the cache file on disk is stale.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("Episodes updated in memory but the cache was not written: {0}")]
    Persist(#[source] CacheError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Feed(e) => e.kind(),
            SyncError::Persist(e) => e.kind(),
        }
    }

    /// True when in-memory episodes no longer match the cache file
    pub fn is_cache_stale(&self) -> bool {
        matches!(self, SyncError::Persist(_))
    }
}

/// A write through a [`FanOut`](crate::FanOut) that failed on one of its sinks
#[derive(Error, Debug)]
#[error("Write to sink {index} failed: {source}")]
pub struct SinkError {
    /// Position of the first failing sink, in insertion order
    pub index: usize,
    #[source]
    pub source: std::io::Error,
}

/// Errors that can occur when loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration directory could be determined")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Podcast id {0} is configured more than once")]
    DuplicateId(u32),

    #[error("No podcast matches '{0}'")]
    UnknownPodcast(String),
}
