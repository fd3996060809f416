// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{GoalFile, RawGoalFile};
use crate::errors::Result;

/// Load a goal file from a given path and return the raw `RawGoalFile`.
///
/// This only performs TOML deserialization; it does **not** build goals or
/// check links. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawGoalFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents)
}

/// Deserialize goal-file contents.
pub fn parse_str(contents: &str) -> Result<RawGoalFile> {
    let raw: RawGoalFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a goal file from path and validate it:
///
/// - at least one container is declared,
/// - every container's options are valid,
/// - every link target is declared in the same file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<GoalFile> {
    let raw = load_from_path(&path)?;
    GoalFile::try_from(raw)
}

/// Default goal file location: `Goals.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Goals.toml")
}
