use std::{sync::Arc, time::Duration};

use futures::{Stream, TryStreamExt, stream};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Settings,
    error::CatalogError,
    management::TokenManager,
    spotify::retry::{self, MAX_RETRY_AFTER, RetryPolicy},
    types::Page,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated, retrying GET executor for the Spotify Web API.
///
/// Cloning is cheap: the HTTP connection pool and the [`TokenManager`] are
/// shared between clones, so concurrent tasks all see the same credential.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Arc<TokenManager>,
    policy: RetryPolicy,
}

/// Where the next page request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageCursor {
    Start,
    Offset(u64),
    After(String),
    Done,
}

impl SpotifyClient {
    pub fn new(settings: &Settings) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Config(format!("cannot build HTTP client: {}", e)))?;

        let tokens = Arc::new(TokenManager::new(http.clone(), settings));
        Ok(Self::with_token_manager(http, settings, tokens))
    }

    pub fn with_token_manager(http: Client, settings: &Settings, tokens: Arc<TokenManager>) -> Self {
        SpotifyClient {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            tokens,
            policy: RetryPolicy::new(settings.max_attempts, settings.backoff_base),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Performs a single authenticated GET and decodes the JSON body.
    ///
    /// # Retry Logic
    ///
    /// - **401**: the credential is invalidated and the request is repeated
    ///   once with a fresh one; a second 401 is rejected.
    /// - **429**: waits for `Retry-After` when given, otherwise backs off
    ///   exponentially. Hints above two minutes fail right away and the
    ///   hint is kept in the error.
    /// - **5xx / transport errors**: exponential backoff.
    /// - **other 4xx**: fails immediately with [`CatalogError::RequestRejected`].
    ///
    /// 429 and 5xx share one attempt budget of `max_attempts` requests.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        let mut failures: u32 = 0;
        let mut reauthorized = false;

        loop {
            let credential = self.tokens.get_token().await?;
            let response = self
                .http
                .get(&url)
                .query(query)
                .bearer_auth(&credential.access_token)
                .send()
                .await;

            let response = match response {
                Ok(resp) => resp,
                Err(_) => {
                    // network or timeout
                    failures += 1;
                    if !self.policy.allows_retry(failures) {
                        return Err(CatalogError::UpstreamUnavailable {
                            path: path.to_string(),
                            attempts: failures,
                            status: None,
                        });
                    }
                    sleep(self.policy.delay(failures)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<T>()
                    .await
                    .map_err(|e| CatalogError::MalformedResponse {
                        path: path.to_string(),
                        reason: e.without_url().to_string(),
                    });
            }

            match status {
                StatusCode::UNAUTHORIZED if !reauthorized => {
                    reauthorized = true;
                    self.tokens.invalidate(&credential).await;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    failures += 1;
                    let hint = retry::retry_after(response.headers());
                    let rate_limited = |retry_after: Option<Duration>| {
                        CatalogError::RateLimitExceeded {
                            path: path.to_string(),
                            attempts: failures,
                            retry_after: retry_after.map(|d| d.as_secs()),
                        }
                    };

                    // anything this long is a quota, not a throttle
                    if hint.is_some_and(|h| h > MAX_RETRY_AFTER) {
                        return Err(rate_limited(hint));
                    }
                    if !self.policy.allows_retry(failures) {
                        return Err(rate_limited(None));
                    }
                    sleep(hint.unwrap_or_else(|| self.policy.delay(failures))).await;
                }
                s if s.is_server_error() => {
                    failures += 1;
                    if !self.policy.allows_retry(failures) {
                        return Err(CatalogError::UpstreamUnavailable {
                            path: path.to_string(),
                            attempts: failures,
                            status: Some(s.as_u16()),
                        });
                    }
                    sleep(self.policy.delay(failures)).await;
                }
                s => {
                    return Err(CatalogError::RequestRejected {
                        path: path.to_string(),
                        status: s.as_u16(),
                    });
                }
            }
        }
    }

    /// Walks every page of a list endpoint and yields its items in order.
    ///
    /// Nothing is requested until the stream is polled, and every call starts
    /// again from the first page. Pagination follows `cursors.after` when the
    /// endpoint provides it and `offset + items.len()` otherwise; it stops on
    /// an empty page or a missing `next` link. The cancellation token is
    /// checked before each page request.
    pub fn fetch_all<'a, T>(
        &'a self,
        path: String,
        query: Vec<(String, String)>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<T, CatalogError>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        stream::try_unfold(PageCursor::Start, move |cursor| {
            let path = path.clone();
            let mut params = query.clone();
            let cancel = cancel.clone();

            async move {
                match &cursor {
                    PageCursor::Done => return Ok(None),
                    PageCursor::Offset(offset) => params.push(("offset".into(), offset.to_string())),
                    PageCursor::After(after) => params.push(("after".into(), after.clone())),
                    PageCursor::Start => {}
                }

                if cancel.is_cancelled() {
                    return Err(CatalogError::Cancelled);
                }

                let page: Page<T> = self.get(&path, &params).await?;
                let next = next_cursor(&cursor, &page);
                Ok(Some((page.items, next)))
            }
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, CatalogError>)))
        .try_flatten()
    }
}

fn next_cursor<T>(current: &PageCursor, page: &Page<T>) -> PageCursor {
    if page.items.is_empty() || page.next.is_none() {
        return PageCursor::Done;
    }

    if let Some(after) = page.cursors.as_ref().and_then(|c| c.after.clone()) {
        return PageCursor::After(after);
    }

    let start = page.offset.unwrap_or(match current {
        PageCursor::Offset(offset) => *offset,
        _ => 0,
    });
    PageCursor::Offset(start + page.items.len() as u64)
}
