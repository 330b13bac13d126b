use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::registration::ErrorPolicy;

/// Optional settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "event_manager.yaml";

pub const DEFAULT_CIVIC_API_URL: &str = "https://www.googleapis.com/civicinfo/v2";

/// Run settings: defaults, then [`CONFIG_FILE`] if present, then environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub attendees_path: PathBuf,
    /// `None` uses the built-in letter.
    pub template_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub civic_api_url: String,
    pub civic_api_key: Option<String>,
    pub lookup_concurrency: usize,
    pub timestamp_policy: ErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attendees_path: PathBuf::from("event_attendees.csv"),
            template_path: None,
            output_dir: PathBuf::from("output"),
            civic_api_url: DEFAULT_CIVIC_API_URL.to_string(),
            civic_api_key: None,
            lookup_concurrency: 4,
            timestamp_policy: ErrorPolicy::Abort,
        }
    }
}

impl Config {
    /// Load from [`CONFIG_FILE`] and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            info!(path = %path.display(), "reading config file");
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            if text.trim().is_empty() {
                Config::default()
            } else {
                serde_yaml::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
        } else {
            debug!(path = %path.display(), "no config file; using defaults");
            Config::default()
        };

        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("EVENT_MANAGER_ATTENDEES") {
            self.attendees_path = PathBuf::from(v);
        }
        if let Some(v) = env("EVENT_MANAGER_TEMPLATE") {
            self.template_path = Some(PathBuf::from(v));
        }
        if let Some(v) = env("EVENT_MANAGER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env("EVENT_MANAGER_CIVIC_API_URL") {
            self.civic_api_url = v;
        }
        if let Some(v) = env("CIVIC_INFO_KEY") {
            self.civic_api_key = Some(v).filter(|k| !k.trim().is_empty());
        }
        if let Some(v) = env("EVENT_MANAGER_LOOKUP_CONCURRENCY") {
            self.lookup_concurrency = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("EVENT_MANAGER_LOOKUP_CONCURRENCY={:?}", v))?;
        }
        if let Some(v) = env("EVENT_MANAGER_TIMESTAMP_POLICY") {
            self.timestamp_policy = v
                .parse::<ErrorPolicy>()
                .map_err(anyhow::Error::msg)
                .context("EVENT_MANAGER_TIMESTAMP_POLICY")?;
        }
        Ok(())
    }
}
