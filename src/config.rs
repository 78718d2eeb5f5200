use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.openbrewerydb.org/v1/breweries";

/// Upper bound for `cache.ttl_secs` and `cache.sliding_secs` (one year)
pub const MAX_CACHE_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub source: SourceConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Appended to the base URL as a path segment; empty targets the collection
  #[serde(default)]
  pub filter: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      filter: String::new(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Absolute lifetime of a cached record set
  #[serde(default = "default_ttl_secs")]
  pub ttl_secs: u64,
  /// Idle window after which an unread entry expires early; `null` disables it
  #[serde(default = "default_sliding_secs")]
  pub sliding_secs: Option<u64>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: default_ttl_secs(),
      sliding_secs: default_sliding_secs(),
    }
  }
}

impl CacheConfig {
  pub fn ttl(&self) -> chrono::Duration {
    bounded_seconds(self.ttl_secs)
  }

  pub fn sliding(&self) -> Option<chrono::Duration> {
    self.sliding_secs.map(bounded_seconds)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotConfig {
  /// Snapshot file (default: $XDG_DATA_HOME/brewcache/snapshot.json)
  pub path: Option<PathBuf>,
}

impl SnapshotConfig {
  pub fn resolved_path(&self) -> Result<PathBuf> {
    if let Some(path) = &self.path {
      return Ok(path.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("brewcache").join("snapshot.json"))
  }
}

/// Seconds as a duration, clamped to [`MAX_CACHE_SECS`].
fn bounded_seconds(secs: u64) -> chrono::Duration {
  // The clamp keeps the cast lossless and far inside chrono's range
  chrono::Duration::seconds(secs.min(MAX_CACHE_SECS) as i64)
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_ttl_secs() -> u64 {
  600
}

fn default_sliding_secs() -> Option<u64> {
  Some(300)
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./brewcache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/brewcache/config.yaml
  ///
  /// Without any file the built-in defaults are used.
  /// `BREWCACHE_BASE_URL` overrides `source.base_url` either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => {
        tracing::debug!("no config file found, using defaults");
        Config::default()
      }
    };

    if let Ok(base_url) = std::env::var("BREWCACHE_BASE_URL") {
      config.source.base_url = base_url;
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("brewcache.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("brewcache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    url::Url::parse(&self.source.base_url)
      .map_err(|e| eyre!("Invalid source.base_url '{}': {}", self.source.base_url, e))?;

    if self.cache.ttl_secs == 0 {
      return Err(eyre!("cache.ttl_secs must be greater than zero"));
    }
    if self.cache.ttl_secs > MAX_CACHE_SECS {
      return Err(eyre!(
        "cache.ttl_secs must be at most {} (got {})",
        MAX_CACHE_SECS,
        self.cache.ttl_secs
      ));
    }
    if let Some(sliding) = self.cache.sliding_secs {
      if sliding == 0 || sliding > MAX_CACHE_SECS {
        return Err(eyre!(
          "cache.sliding_secs must be between 1 and {} (got {})",
          MAX_CACHE_SECS,
          sliding
        ));
      }
    }
    if self.source.timeout_secs == 0 {
      return Err(eyre!("source.timeout_secs must be greater than zero"));
    }
    Ok(())
  }
}
