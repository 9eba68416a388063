mod download;
mod filename;

pub use download::{DownloadResult, download_episode};
pub use filename::filename_from_url;
