//! Configuration management for spafcli.
//!
//! Values come from environment variables, optionally loaded from a `.env`
//! file. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. The `.env` file given with `--config`, or `spafcli/.env` in the local
//!    data directory
//! 3. Application defaults for everything except the client credentials

use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use crate::{Res, error::CatalogError};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Largest page the Spotify list endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Loads environment variables from a `.env` file.
///
/// Without an explicit path the file is looked up in the platform-specific
/// local data directory under `spafcli/.env`; the directory is created when
/// missing. A missing file is not an error since every value can also come
/// from the process environment. Variables already set in the environment
/// are never overridden.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spafcli/.env`
/// - macOS: `~/Library/Application Support/spafcli/.env`
/// - Windows: `%LOCALAPPDATA%/spafcli/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created, an explicit
/// path does not exist, or the file cannot be parsed.
pub async fn load_env(explicit: Option<PathBuf>) -> Res<()> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("Config file {} not found", path.display()).into());
            }
            path
        }
        None => {
            let path = default_env_path();
            if let Some(parent) = path.parent() {
                async_fs::create_dir_all(parent).await?;
            }
            if !path.is_file() {
                return Ok(());
            }
            path
        }
    };

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(())
}

pub fn default_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spafcli/.env");
    path
}

/// Returns the Spotify API client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, CatalogError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// The secret must never end up in logs or console output.
pub fn spotify_client_secret() -> Result<String, CatalogError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Returns the client-credentials token URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string())
}

fn required(key: &str) -> Result<String, CatalogError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CatalogError::Config(format!("{} must be set", key))),
    }
}

fn optional<T: FromStr>(key: &str, default: T) -> Result<T, CatalogError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| CatalogError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Everything a pipeline run needs to talk to the API.
#[derive(Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub page_size: u32,
    pub workers: usize,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Settings {
    /// Settings with the default endpoints and tunables.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Settings {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            workers: DEFAULT_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
        }
    }

    /// Builds settings from the process environment.
    pub fn from_env() -> Result<Self, CatalogError> {
        let settings = Settings {
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            page_size: optional("SPAFCLI_PAGE_SIZE", MAX_PAGE_SIZE)?,
            workers: optional("SPAFCLI_WORKERS", DEFAULT_WORKERS)?,
            max_attempts: optional("SPAFCLI_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            backoff_base: Duration::from_millis(optional(
                "SPAFCLI_BACKOFF_BASE_MS",
                DEFAULT_BACKOFF_BASE_MS,
            )?),
            ..Settings::new(spotify_client_id()?, spotify_client_secret()?)
        };

        Ok(settings.normalized())
    }

    /// Clamps tunables into the ranges the API and the worker pool accept.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.workers = self.workers.max(1);
        self.max_attempts = self.max_attempts.max(1);
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("page_size", &self.page_size)
            .field("workers", &self.workers)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base", &self.backoff_base)
            .finish()
    }
}
