//! Configuration loading from environment variables.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Where the tracker service lives and where UI preferences are kept.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the tracker service, e.g. `http://localhost:5000`.
    pub api_url: String,
    /// Path of the local preference store.
    pub prefs_db: PathBuf,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Expects `SEGUITO_API_URL` to be set, either in the environment or in
    /// a `.env` file. `SEGUITO_PREFS_DB` is optional and defaults to
    /// `seguito-prefs.db` in the working directory.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = std::env::var("SEGUITO_API_URL")
            .context("SEGUITO_API_URL environment variable not set")?;

        let prefs_db = std::env::var("SEGUITO_PREFS_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("seguito-prefs.db"));

        Ok(Self { api_url, prefs_db })
    }
}
