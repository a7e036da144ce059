use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::Error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameStatus<'a> {
    game_id: &'a str,
    timestamp: u64,
    player_count: u32,
    game_count: u32,
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Renders a status snapshot as JSON, stamped with the current time.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn json_status(game_id: &str, player_count: u32, game_count: u32) -> Result<String, Error> {
    let status = GameStatus {
        game_id,
        timestamp: unix_timestamp(),
        player_count,
        game_count,
    };
    Ok(serde_json::to_string_pretty(&status)?)
}

/// Writes a game server's status to `<dir>/<game id>` as `name=value` lines.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    game_id: String,
    path: PathBuf,
}

impl StatusReporter {
    pub fn new(game_id: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        let game_id = game_id.into();
        let path = dir.as_ref().join(&game_id);
        Self { game_id, path }
    }

    #[must_use]
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// Returns an error if the status file can't be written.
    pub fn update(&self, player_count: u32, game_count: u32) -> Result<(), Error> {
        self.update_ex(&[
            ("players", player_count.to_string()),
            ("games", game_count.to_string()),
        ])
    }

    /// Replaces the status file with a timestamp followed by `fields`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the status file can't be written.
    pub fn update_ex<K: AsRef<str>, V: AsRef<str>>(&self, fields: &[(K, V)]) -> Result<(), Error> {
        let mut content = format!("timestamp={}\n", unix_timestamp());
        for (name, value) in fields {
            content.push_str(name.as_ref());
            content.push('=');
            content.push_str(value.as_ref());
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_json_status() {
        let json: Value = serde_json::from_str(&json_status("pso", 12, 3).unwrap()).unwrap();
        assert_eq!(json["gameId"], "pso");
        assert_eq!(json["playerCount"], 12);
        assert_eq!(json["gameCount"], 3);
        assert!(json["timestamp"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_update_writes_counts() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let reporter = StatusReporter::new("pso", dir.path());
        reporter.update(7, 2).unwrap();

        let content = fs::read_to_string(dir.path().join("pso")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp="));
        assert!(lines[0]["timestamp=".len()..].parse::<u64>().is_ok());
        assert_eq!(lines[1], "players=7");
        assert_eq!(lines[2], "games=2");
    }

    #[test]
    fn test_update_ex_replaces_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let reporter = StatusReporter::new("sfr", dir.path());
        reporter.update(1, 1).unwrap();
        reporter
            .update_ex(&[("players", "4"), ("rooms", "2"), ("online", "true")])
            .unwrap();

        let content = fs::read_to_string(reporter.path()).unwrap();
        assert!(content.ends_with("\nplayers=4\nrooms=2\nonline=true\n"));
        assert!(!content.contains("games="));
    }

    #[test]
    fn test_update_missing_dir() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let reporter = StatusReporter::new("pso", dir.path().join("missing"));
        assert!(matches!(reporter.update(0, 0), Err(Error::Io(_))));
    }
}
