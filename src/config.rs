// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::podcast::Podcast;

/// Environment variable overriding the config file location
pub const ENV_CONFIG: &str = "PCD_CONFIG";

const CONFIG_FILENAME: &str = "pcd.yml";

/// One podcast entry of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastConfig {
    pub id: u32,
    pub name: String,
    pub feed: String,
    pub path: PathBuf,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl PodcastConfig {
    /// Build a [`Podcast`] with no episodes, expanding a leading `~/` in the path
    pub fn to_podcast(&self) -> Podcast {
        Podcast {
            id: self.id,
            name: self.name.clone(),
            feed: self.feed.clone(),
            path: expand_home(&self.path),
            username: self.username.clone(),
            password: self.password.clone(),
            episodes: Vec::new(),
        }
    }
}

/// Contents of the `pcd.yml` config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub podcasts: Vec<PodcastConfig>,
}

impl Config {
    /// Config file location: `$PCD_CONFIG`, else `<config dir>/pcd.yml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(ENV_CONFIG) {
            return Ok(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        debug!(path = %path.display(), podcasts = config.podcasts.len(), "loaded config");

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for podcast in &self.podcasts {
            if !seen.insert(podcast.id) {
                return Err(ConfigError::DuplicateId(podcast.id));
            }
        }
        Ok(())
    }

    /// Find a podcast by numeric id or exact name
    pub fn find(&self, query: &str) -> Result<&PodcastConfig, ConfigError> {
        let by_id = query.parse::<u32>().ok();

        self.podcasts
            .iter()
            .find(|p| Some(p.id) == by_id)
            .or_else(|| self.podcasts.iter().find(|p| p.name == query))
            .ok_or_else(|| ConfigError::UnknownPodcast(query.to_string()))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
