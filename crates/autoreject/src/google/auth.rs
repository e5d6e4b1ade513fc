//! Google OAuth2 token management
//!
//! Tokens are provisioned out of band, one file per user, and refreshed here
//! as they expire. Uses synchronous HTTP (ureq) to match the rest of the client.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GoogleCredentials;

/// Access tokens expiring within this many seconds are refreshed early
const EXPIRY_BUFFER_SECS: i64 = 300;

/// OAuth2 token management for one Google account
pub struct GoogleAuth {
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
}

/// Stored token data
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

impl StoredToken {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at > now + EXPIRY_BUFFER_SECS)
    }
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl GoogleAuth {
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Create a GoogleAuth reading and writing tokens at `token_path`
    pub fn new(client_id: String, client_secret: String, token_path: PathBuf) -> Self {
        Self {
            client_id,
            client_secret,
            token_path,
        }
    }

    /// Create a GoogleAuth for `user_id` using the default token location
    /// (`<config dir>/tokens/<user>.json`)
    pub fn for_user(credentials: &GoogleCredentials, user_id: &str) -> Result<Self> {
        let token_path = Self::default_token_path(user_id)?;
        Ok(Self::new(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            token_path,
        ))
    }

    fn default_token_path(user_id: &str) -> Result<PathBuf> {
        let file_name = format!("tokens/{}.json", user_id.replace(['/', '\\'], "_"));
        config::config_path(&file_name).context("Could not determine config directory")
    }

    /// Where this account's token is stored
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Get a valid access token, refreshing it if needed
    pub fn get_access_token(&self) -> Result<String> {
        let token = self.load_token().with_context(|| {
            format!(
                "No usable token at {}; provision one for this account",
                self.token_path.display()
            )
        })?;

        if token.is_fresh(chrono::Utc::now().timestamp()) {
            return Ok(token.access_token);
        }

        let Some(refresh_token) = token.refresh_token else {
            bail!(
                "Token at {} has expired and has no refresh token",
                self.token_path.display()
            );
        };

        debug!("Refreshing access token at {}", self.token_path.display());
        let refreshed = self.refresh_access_token(&refresh_token)?;
        self.save_token_response(&refreshed)?;
        Ok(refreshed.access_token)
    }

    /// Refresh an access token using a refresh token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        // Google omits the refresh token on refresh
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn load_token(&self) -> Result<StoredToken> {
        let content = fs::read_to_string(&self.token_path)?;
        let token: StoredToken = serde_json::from_str(&content)?;
        Ok(token)
    }

    fn save_token_response(&self, token: &TokenResponse) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        };

        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.token_path, content)
            .with_context(|| format!("Failed to write token to {}", self.token_path.display()))?;
        Ok(())
    }

    /// Check whether a token is on disk and either fresh or refreshable
    pub fn is_authenticated(&self) -> bool {
        match self.load_token() {
            Ok(token) => {
                token.is_fresh(chrono::Utc::now().timestamp()) || token.refresh_token.is_some()
            }
            Err(_) => false,
        }
    }
}
