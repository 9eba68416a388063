pub mod cache;
pub mod config;
pub mod episode;
pub mod error;
pub mod fanout;
pub mod feed;
pub mod http;
pub mod podcast;

// Re-export main types for convenience
pub use config::{Config, PodcastConfig};
pub use episode::{DownloadResult, download_episode, filename_from_url};
pub use error::{
    CacheError, CodecError, ConfigError, DownloadError, ErrorKind, FeedError, SinkError, SyncError,
};
pub use fanout::{FanOut, Sink};
pub use feed::{DATE_LAYOUT, Episode, extract_episodes, fetch_episodes};
pub use http::{Credentials, HttpClient, HttpResponse, ReqwestClient};
pub use podcast::{Podcast, TITLE_WIDTH};
