use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config::Settings, error::CatalogError, spotify, types::Credential};

/// Owns the bearer credential shared by every fetch task.
///
/// The cached credential lives behind an async mutex and the exchange runs
/// while the lock is held, so at most one exchange is ever in flight. Tasks
/// that race on an expired or rejected token wait for that exchange and then
/// reuse its result.
pub struct TokenManager {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    credential: Mutex<Option<Credential>>,
    exchanges: AtomicUsize,
}

impl TokenManager {
    pub fn new(client: Client, settings: &Settings) -> Self {
        TokenManager {
            client,
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            credential: Mutex::new(None),
            exchanges: AtomicUsize::new(0),
        }
    }

    /// Returns a valid credential, exchanging client credentials only when
    /// nothing is cached or the cached one is within the refresh margin.
    pub async fn get_token(&self) -> Result<Credential, CatalogError> {
        let mut lock = self.credential.lock().await;
        if let Some(credential) = lock.as_ref() {
            if !credential.is_expired() {
                return Ok(credential.clone());
            }
        }

        let fresh = spotify::auth::request_client_credentials(
            &self.client,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
        )
        .await?;
        self.exchanges.fetch_add(1, Ordering::SeqCst);

        *lock = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drops the cached credential after the API rejected `stale`.
    ///
    /// A no-op when another task already replaced it, which is what makes
    /// concurrent 401s collapse into a single exchange.
    pub async fn invalidate(&self, stale: &Credential) {
        let mut lock = self.credential.lock().await;
        if lock
            .as_ref()
            .is_some_and(|current| current.access_token == stale.access_token)
        {
            *lock = None;
        }
    }

    /// Number of credential exchanges performed so far.
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}
