use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use graph::{render::DEFAULT_TRAILER, DEFAULT_MAX_CHAIN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Config file name inside the `.git` directory
pub const CONFIG_FILE: &str = "smartlog";

const DEFAULT_DAYS: u32 = 14;
const DEFAULT_MAINLINE: &str = "origin/HEAD";

/// Smartlog settings, read from `.git/smartlog` (TOML)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hide branch tips older than this many days
    pub days: u32,
    /// Longest linear run printed before folding
    pub max_chain: usize,
    /// Commit message trailer shown next to the author
    pub trailer: String,
    /// Extra refs to include, e.g. `origin/release`
    pub extra_refs: Vec<String>,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Ref the whole tree is anchored to
    pub head: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            max_chain: DEFAULT_MAX_CHAIN,
            trailer: DEFAULT_TRAILER.to_string(),
            extra_refs: Vec::new(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            head: DEFAULT_MAINLINE.to_string(),
        }
    }
}

impl Config {
    /// Load `<git_dir>/smartlog`, falling back to defaults when it is absent
    pub fn load(git_dir: &Path) -> Result<Self> {
        let path = git_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Oldest commit time still shown without `--all`. A cutoff before the
    /// earliest representable date means no cutoff.
    pub fn date_limit(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let limit = Duration::try_days(i64::from(self.days))
            .and_then(|days| now.checked_sub_signed(days));
        if limit.is_none() {
            warn!(days = self.days, "age limit out of range, showing all commits");
        }
        limit
    }
}
