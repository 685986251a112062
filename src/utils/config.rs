use std::{io::ErrorKind, path::Path, str::FromStr};

use anyhow::{Context, Result};
use chrono::{FixedOffset, Local};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

pub const CONFIG_FILE: &str = "config.json";

/// Optional `config.json` stored in the application directory. Command line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Zone used to group tracked time into days, e.g. `+02:00`.
    #[serde(default)]
    pub utc_offset: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Missing file means defaults. A file that can't be parsed is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config at {path:?}")),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read config at {path:?}")),
        }
    }

    pub fn zone(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset
            .as_deref()
            .map(|v| {
                FixedOffset::from_str(v).with_context(|| format!("Invalid utc_offset {v}"))
            })
            .transpose()
    }

    pub fn log_level(&self) -> Result<Option<LevelFilter>> {
        self.log_level
            .as_deref()
            .map(|v| LevelFilter::from_str(v).with_context(|| format!("Invalid log_level {v}")))
            .transpose()
    }
}

/// Offset of the host's local zone right now.
pub fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Picks the zone from the command line, then the config file, then the host.
pub fn resolve_zone(flag: Option<FixedOffset>, config: &AppConfig) -> Result<FixedOffset> {
    match flag {
        Some(zone) => Ok(zone),
        None => Ok(config.zone()?.unwrap_or_else(local_offset)),
    }
}
