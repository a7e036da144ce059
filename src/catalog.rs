use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// Thumbnail used for games missing from the catalog.
pub const UNKNOWN_THUMBNAIL: &str = "https://dcnet.flyca.st/gamepic/unknown.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct GameInfo {
    name: String,
    thumbnail: String,
}

/// Display metadata for a game, as used in notification payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameCatalogEntry<'a> {
    pub game_id: &'a str,
    pub display_name: &'a str,
    pub thumbnail_url: &'a str,
}

/// Read-only mapping from game id to display name and thumbnail.
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    games: HashMap<String, GameInfo>,
}

impl GameCatalog {
    /// Loads the catalog from a JSON document of the form
    /// `{ "<game id>": { "name": "...", "thumbnail": "..." } }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't a JSON object.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Entries lacking a string `name` or `thumbnail` are skipped and fall back
    /// like any unknown game.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` isn't an object keyed by game id.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: HashMap<String, Value> = serde_json::from_str(json)?;
        let games = raw
            .into_iter()
            .filter_map(|(id, value)| match GameInfo::deserialize(value) {
                Ok(info) => Some((id, info)),
                Err(e) => {
                    debug!("Ignoring catalog entry {id}: {e}");
                    None
                }
            })
            .collect();
        Ok(Self { games })
    }

    /// Looks up `game_id`, substituting the raw id and [`UNKNOWN_THUMBNAIL`] on a miss.
    #[must_use]
    pub fn lookup<'a>(&'a self, game_id: &'a str) -> GameCatalogEntry<'a> {
        match self.games.get(game_id) {
            Some(info) => GameCatalogEntry {
                game_id,
                display_name: &info.name,
                thumbnail_url: &info.thumbnail,
            },
            None => GameCatalogEntry {
                game_id,
                display_name: game_id,
                thumbnail_url: UNKNOWN_THUMBNAIL,
            },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
