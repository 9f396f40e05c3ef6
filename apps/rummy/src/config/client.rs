use std::env;

use crate::error::AppError;

pub const DEFAULT_GAMES_ROOT: &str = "games";
pub const DEFAULT_RESUME_KEY: &str = "rummy2go_games";
pub const DEFAULT_RESUME_LIMIT: usize = 5;

/// Client-side settings for locating documents and resume data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root path under which game documents live.
    pub games_root: String,
    /// Key holding the resume book in the key-value collaborator.
    pub resume_key: String,
    /// How many recent games the lobby lists.
    pub resume_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            games_root: DEFAULT_GAMES_ROOT.to_string(),
            resume_key: DEFAULT_RESUME_KEY.to_string(),
            resume_limit: DEFAULT_RESUME_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Read `RUMMY_GAMES_ROOT`, `RUMMY_RESUME_KEY` and `RUMMY_RESUME_LIMIT`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, AppError> {
        let games_root = non_empty_var("RUMMY_GAMES_ROOT", DEFAULT_GAMES_ROOT)?;
        let resume_key = non_empty_var("RUMMY_RESUME_KEY", DEFAULT_RESUME_KEY)?;
        let resume_limit = match env::var("RUMMY_RESUME_LIMIT") {
            Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                AppError::config(format!(
                    "RUMMY_RESUME_LIMIT must be a non-negative integer, got '{raw}'"
                ))
            })?,
            Err(_) => DEFAULT_RESUME_LIMIT,
        };
        Ok(Self {
            games_root: games_root.trim_matches('/').to_string(),
            resume_key,
            resume_limit,
        })
    }

    /// Path of one game document.
    pub fn game_path(&self, game_id: &str) -> String {
        format!("{}/{game_id}", self.games_root)
    }
}

fn non_empty_var(name: &str, default: &str) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(AppError::config(format!(
            "Environment variable '{name}' is set but empty"
        ))),
        Ok(value) => Ok(value),
        Err(_) => Ok(default.to_string()),
    }
}
