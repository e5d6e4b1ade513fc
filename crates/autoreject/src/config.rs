//! Configuration loading for the autoreject service
//!
//! Supports loading OAuth credentials from (in order of priority):
//! 1. Compile-time embedded credentials (for production builds)
//! 2. JSON file (Google Cloud Console format)
//! 3. Runtime environment variables (fallback)
//!
//! The service itself is configured by `autoreject.json` in the config directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::SyncTarget;

/// Credentials filename in the config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Service configuration filename in the config directory
const SERVICE_FILE: &str = "autoreject.json";

/// Database filename used when none is configured
const DEFAULT_DATABASE_FILE: &str = "autoreject.db";

/// OAuth credentials for Calendar API access
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GoogleCredentials {
    /// Load credentials using the following priority:
    /// 1. Compile-time embedded credentials
    /// 2. JSON file (`<config dir>/google-credentials.json`)
    /// 3. Runtime environment variables
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_env()
    }

    /// Load credentials embedded at compile time.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .context("GOOGLE_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .context("GOOGLE_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

/// Service settings read from `autoreject.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutorejectConfig {
    /// SQLite settings database; defaults to `autoreject.db` in the config directory
    pub database_path: Option<PathBuf>,
    /// Seconds between sync passes; a single pass is run when unset
    pub poll_interval_secs: Option<u64>,
    /// Calendars to watch
    #[serde(default)]
    pub targets: Vec<SyncTarget>,
}

impl AutorejectConfig {
    /// Load `autoreject.json` from the config directory
    pub fn load() -> Result<Self> {
        if !config::config_exists(SERVICE_FILE) {
            let path = config::config_path(SERVICE_FILE)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| SERVICE_FILE.to_string());
            anyhow::bail!("Service config not found at {}", path);
        }
        config::load_json(SERVICE_FILE)
    }

    /// Load service settings from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Resolved database location
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => config::config_path(DEFAULT_DATABASE_FILE)
                .context("Could not determine config directory"),
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Targets grouped by user, in first-seen order
    pub fn targets_by_user(&self) -> Vec<(String, Vec<SyncTarget>)> {
        let mut groups: Vec<(String, Vec<SyncTarget>)> = Vec::new();
        for target in &self.targets {
            match groups.iter_mut().find(|(user, _)| *user == target.user_id) {
                Some((_, targets)) => targets.push(target.clone()),
                None => groups.push((target.user_id.clone(), vec![target.clone()])),
            }
        }
        groups
    }
}
