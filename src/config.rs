use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_WIDTH: usize = 79;

/// User configuration, loaded from `~/.config/standup/config.toml`
/// (override with `STANDUP_CONFIG`). A missing file is not an error:
/// everything has a default except the email list, which is only
/// required once neither `--email` nor `[general] email` is available.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
  pub general: Option<General>,
  #[serde(default)]
  pub git: Git,
  #[serde(default)]
  pub github: Github,
}

#[derive(Debug, Deserialize)]
pub struct General {
  /// Default report recipients, comma-separated.
  pub email: Option<String>,
  pub width: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Git {
  /// Repositories to scan for commits.
  #[serde(default)]
  pub repos: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Github {
  /// GitHub login to search for (not derivable from an email address).
  pub login: Option<String>,
}

impl Config {
  pub fn path() -> PathBuf {
    if let Ok(path) = std::env::var("STANDUP_CONFIG") {
      return PathBuf::from(path);
    }
    dirs::config_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join("standup")
      .join("config.toml")
  }

  pub fn load() -> Result<Config, Error> {
    Self::load_from(&Self::path())
  }

  pub fn load_from(path: &Path) -> Result<Config, Error> {
    if !path.exists() {
      return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
      .map_err(|err| Error::Config(format!("Failed to read {}: {}", path.display(), err)))?;
    Self::parse(&text)
  }

  pub fn parse(text: &str) -> Result<Config, Error> {
    toml::from_str(text).map_err(|err| Error::Config(format!("Invalid config file: {}", err)))
  }

  pub fn width(&self) -> usize {
    self
      .general
      .as_ref()
      .and_then(|general| general.width)
      .unwrap_or(DEFAULT_WIDTH)
  }

  /// Default email list for when no `--email` was given.
  pub fn emails(&self) -> Result<&str, Error> {
    self
      .general
      .as_ref()
      .and_then(|general| general.email.as_deref())
      .ok_or_else(|| {
        Error::MissingConfig(format!("No [general] email in {}", Self::path().display()))
      })
  }
}

/// Expand a leading `~/` so config repo paths work as written.
pub fn expand_tilde(path: &str) -> PathBuf {
  if let Some(rest) = path.strip_prefix("~/") {
    if let Some(home) = dirs::home_dir() {
      return home.join(rest);
    }
  }
  PathBuf::from(path)
}
