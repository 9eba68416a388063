// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::{DirBuilder, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::error::CacheError;

/// Name of the cache file inside a podcast directory
pub const CACHE_FILENAME: &str = ".feed";

/// Permission bits for created podcast directories (owner and group rwx)
#[cfg(unix)]
const DIR_MODE: u32 = 0o775;

/// Location of the cache file for a podcast rooted at `dir`
pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILENAME)
}

/// Replace the cache file under `dir` with `blob`
///
/// Creates `dir` and any missing parents first.
pub fn write_cache(dir: &Path, blob: &[u8]) -> Result<(), CacheError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder.create(dir).map_err(|e| {
        error!(path = %dir.display(), error = %e, "could not create podcast directory");
        CacheError::CreateDirectoryFailed {
            path: dir.to_path_buf(),
            source: e,
        }
    })?;

    let path = cache_path(dir);
    let write_failed = |e: std::io::Error| {
        error!(path = %path.display(), error = %e, "could not write cache file");
        CacheError::WriteFailed {
            path: path.clone(),
            source: e,
        }
    };

    let mut file = File::create(&path).map_err(write_failed)?;
    file.write_all(blob).map_err(write_failed)?;
    file.flush().map_err(write_failed)?;

    debug!(path = %path.display(), bytes = blob.len(), "wrote cache file");
    Ok(())
}

/// Read the whole cache file under `dir`
pub fn read_cache(dir: &Path) -> Result<Vec<u8>, CacheError> {
    let path = cache_path(dir);
    let unavailable = |e: std::io::Error| {
        warn!(path = %path.display(), error = %e, "could not open cache file");
        CacheError::Unavailable {
            path: path.clone(),
            source: e,
        }
    };

    let mut file = File::open(&path).map_err(unavailable)?;
    let mut blob = Vec::new();
    file.read_to_end(&mut blob).map_err(unavailable)?;

    Ok(blob)
}
