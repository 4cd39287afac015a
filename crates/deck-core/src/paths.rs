use crate::error::{DeckError, Result};
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "DECKFORGE_HOME";
pub const DEFAULT_DIR: &str = ".deckforge";
pub const DATA_FILE: &str = "deckforge.yaml";

/// Resolve the data directory: `explicit`, then `$DECKFORGE_HOME`, then
/// `~/.deckforge`.
pub fn data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home::home_dir()
        .map(|h| h.join(DEFAULT_DIR))
        .ok_or(DeckError::HomeNotFound)
}

pub fn data_file(dir: &Path) -> PathBuf {
    dir.join(DATA_FILE)
}
