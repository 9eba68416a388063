// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tracing::{debug, error};

use crate::error::DownloadError;
use crate::fanout::{FanOut, Sink};
use crate::feed::Episode;
use crate::http::HttpClient;

use super::filename::filename_from_url;

/// Outcome of a successful download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Where the media file was written
    pub path: PathBuf,
    /// Number of bytes written to the file
    pub bytes: u64,
}

/// Download an episode into `dir`
///
/// The file is named after the last path segment of the episode URL and an
/// existing file of that name is overwritten. When an `observer` is given,
/// every chunk written to the file is written to the observer as well.
pub async fn download_episode<C: HttpClient>(
    client: &C,
    episode: &Episode,
    dir: &Path,
    observer: Option<Sink<'_>>,
) -> Result<DownloadResult, DownloadError> {
    let url = episode.url.as_str();

    let filename = filename_from_url(url).ok_or_else(|| {
        error!(url, "could not derive a filename for episode");
        DownloadError::InvalidFilename {
            url: url.to_string(),
        }
    })?;
    let output_path = dir.join(filename);

    let response = client.get(url, None).await.map_err(|e| {
        error!(url, error = %e, "could not download episode");
        DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        }
    })?;

    if response.status != 200 {
        error!(url, status = response.status, "could not download episode");
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    let mut file = File::create(&output_path).await.map_err(|e| {
        error!(path = %output_path.display(), error = %e, "could not create file");
        DownloadError::FileCreateFailed {
            path: output_path.clone(),
            source: e,
        }
    })?;

    let mut out = FanOut::new().with(&mut file);
    if let Some(observer) = observer {
        out.push(observer);
    }

    // Sink 0 is always the file, anything after it is the observer
    let sink_failed = |e: crate::error::SinkError| {
        error!(path = %output_path.display(), error = %e, "could not write to file");
        if e.index == 0 {
            DownloadError::FileWriteFailed {
                path: output_path.clone(),
                source: e.source,
            }
        } else {
            DownloadError::ObserverWriteFailed(e.source)
        }
    };

    let mut bytes: u64 = 0;
    let mut stream = response.body;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            error!(url, error = %e, "download stream failed");
            DownloadError::StreamFailed {
                url: url.to_string(),
                source: e,
            }
        })?;

        out.write_all(&chunk).await.map_err(sink_failed)?;
        bytes += chunk.len() as u64;
    }

    out.flush().await.map_err(sink_failed)?;

    debug!(path = %output_path.display(), bytes, "downloaded episode");

    Ok(DownloadResult {
        path: output_path,
        bytes,
    })
}

impl Episode {
    /// Download this episode into `dir`, see [`download_episode`]
    pub async fn download<C: HttpClient>(
        &self,
        client: &C,
        dir: &Path,
        observer: Option<Sink<'_>>,
    ) -> Result<DownloadResult, DownloadError> {
        download_episode(client, self, dir, observer).await
    }
}
