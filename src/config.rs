use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const DEFAULT_DATADIR: &str = "/usr/local/share/dcnet";
pub const DEFAULT_CONFDIR: &str = "/usr/local/etc/dcnet";
pub const DEFAULT_STATUS_DIR: &str = "/var/lib/dcnet/status";

const GAMES_FILE: &str = "games.json";
const DISCORD_CONF_FILE: &str = "discord.conf";

/// Parsed `key = value[, value...]` entries. A key maps to every non-empty item of its value.
pub type ConfigMap = BTreeMap<String, Vec<String>>;

/// Parses a line-oriented configuration stream.
///
/// Lines starting with `#` or `;` are comments. Lines without `=`, or with an
/// empty key or value, are skipped. Whitespace around keys, values and
/// comma-separated items is trimmed, and a repeated key replaces the earlier one.
///
/// # Errors
///
/// Returns an error if the underlying reader fails or yields invalid UTF-8.
pub fn parse<R: BufRead>(reader: R) -> std::io::Result<ConfigMap> {
    let mut config = ConfigMap::new();
    for line in reader.lines() {
        if let Some((key, values)) = parse_line(&line?) {
            config.insert(key, values);
        }
    }
    Ok(config)
}

/// Opens and parses a configuration file.
///
/// # Errors
///
/// Returns an error if the file can't be opened or read.
pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<ConfigMap> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

fn parse_line(line: &str) -> Option<(String, Vec<String>)> {
    let (key, value) = line.trim_start().split_once('=')?;
    if key.is_empty() || key.starts_with(['#', ';']) {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let values = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();
    Some((key.trim_end().to_string(), values))
}

/// Settings read from `discord.conf`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscordSettings {
    pub webhook: Option<String>,
    pub disabled_games: HashSet<String>,
}

impl DiscordSettings {
    #[must_use]
    pub fn from_map(config: &ConfigMap) -> Self {
        let webhook = config
            .get("webhook")
            .and_then(|values| values.first())
            .cloned();
        let disabled_games = config
            .get("disabled-games")
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default();
        Self {
            webhook,
            disabled_games,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] if the file can't be opened, or
    /// [`Error::Io`] if it can't be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::ConfigurationMissing {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(BufReader::new(file))?;
        Ok(Self::from_map(&config))
    }
}

/// Locations of the data, configuration and status files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub catalog: PathBuf,
    pub discord_config: PathBuf,
    pub status_dir: PathBuf,
}

impl Paths {
    #[must_use]
    pub fn new<P: AsRef<Path>>(datadir: P, confdir: P, status_dir: P) -> Self {
        Self {
            catalog: datadir.as_ref().join(GAMES_FILE),
            discord_config: confdir.as_ref().join(DISCORD_CONF_FILE),
            status_dir: status_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolves directories from `DCNET_DATADIR`, `DCNET_CONFDIR` and
    /// `DCNET_STATUS_DIR`, falling back to the install defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| dotenvy::var(name).unwrap_or_else(|_| default.into());
        Self::new(
            var("DCNET_DATADIR", DEFAULT_DATADIR),
            var("DCNET_CONFDIR", DEFAULT_CONFDIR),
            var("DCNET_STATUS_DIR", DEFAULT_STATUS_DIR),
        )
    }
}
