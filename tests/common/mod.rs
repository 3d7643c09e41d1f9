#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode, Uri,
        header::{AUTHORIZATION, RETRY_AFTER},
    },
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use spafcli::{
    config::Settings,
    types::{AggregateRow, FlatRecord},
};
use tokio_util::sync::CancellationToken;

/// A canned response of the fake API.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
    pub retry_after: Option<u64>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply {
            status: 200,
            body,
            retry_after: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Reply {
            status,
            body: json!({ "error": { "status": status, "message": "scripted" } }),
            retry_after: None,
        }
    }

    pub fn rate_limited(retry_after: Option<u64>) -> Self {
        Reply {
            retry_after,
            ..Reply::status(429)
        }
    }

    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap();
        let mut resp = (status, Json(self.body)).into_response();
        if let Some(secs) = self.retry_after {
            resp.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        resp
    }
}

/// In-process stand-in for the Spotify token and Web API endpoints.
///
/// Replies are scripted per request key: the API path without the `/v1/`
/// prefix, suffixed with `@offset` for pages after the first. Queued replies
/// are consumed in order and the last one repeats. Unscripted keys get 404.
/// Access tokens are issued as `tok-1`, `tok-2`, ...
#[derive(Default)]
pub struct FakeSpotify {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    hits: Mutex<HashMap<String, usize>>,
    token_calls: AtomicUsize,
    token_status: AtomicU16,
    omit_access_token: AtomicBool,
    reject_tokens_below: AtomicUsize,
    cancel_on: Mutex<HashMap<String, CancellationToken>>,
}

impl FakeSpotify {
    pub fn new() -> Arc<Self> {
        let fake = FakeSpotify::default();
        fake.token_status.store(200, Ordering::SeqCst);
        Arc::new(fake)
    }

    pub fn on(&self, key: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn fail_token_exchange(&self, status: u16) {
        self.token_status.store(status, Ordering::SeqCst);
    }

    pub fn omit_access_token(&self) {
        self.omit_access_token.store(true, Ordering::SeqCst);
    }

    /// Answers 401 to every API request carrying `tok-N` with `N < n`.
    pub fn reject_tokens_below(&self, n: usize) {
        self.reject_tokens_below.store(n, Ordering::SeqCst);
    }

    /// Cancels `token` when a request for `key` arrives, before answering it.
    pub fn cancel_on(&self, key: &str, token: &CancellationToken) {
        self.cancel_on
            .lock()
            .unwrap()
            .insert(key.to_string(), token.clone());
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

async fn token(State(fake): State<Arc<FakeSpotify>>) -> Response {
    let n = fake.token_calls.fetch_add(1, Ordering::SeqCst) + 1;

    let status = fake.token_status.load(Ordering::SeqCst);
    if status != 200 {
        return Reply::status(status).into_response();
    }
    if fake.omit_access_token.load(Ordering::SeqCst) {
        return Json(json!({ "token_type": "Bearer", "expires_in": 3600 })).into_response();
    }

    Json(json!({
        "access_token": format!("tok-{}", n),
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn api(State(fake): State<Arc<FakeSpotify>>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().trim_start_matches("/v1/").to_string();
    let offset = uri
        .query()
        .and_then(|q| q.split('&').find_map(|kv| kv.strip_prefix("offset=")))
        .unwrap_or("0");
    let key = if offset == "0" {
        path
    } else {
        format!("{}@{}", path, offset)
    };

    *fake.hits.lock().unwrap().entry(key.clone()).or_default() += 1;
    if let Some(token) = fake.cancel_on.lock().unwrap().get(&key) {
        token.cancel();
    }

    let token_number = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer tok-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    if token_number < fake.reject_tokens_below.load(Ordering::SeqCst) {
        return Reply::status(401).into_response();
    }

    match fake.next_reply(&key) {
        Some(reply) => reply.into_response(),
        None => Reply::status(404).into_response(),
    }
}

/// Serves the fake on an ephemeral port and returns its base URL.
pub async fn serve(fake: Arc<FakeSpotify>) -> String {
    let app = Router::new()
        .route("/api/token", post(token))
        .fallback(api)
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Settings pointed at the fake, with tiny backoff so retries stay fast.
pub fn settings(base_url: &str) -> Settings {
    let mut settings = Settings::new("test-client", "test-secret");
    settings.api_url = format!("{}/v1", base_url);
    settings.token_url = format!("{}/api/token", base_url);
    settings.page_size = 2;
    settings.workers = 4;
    settings.max_attempts = 3;
    settings.backoff_base = Duration::from_millis(1);
    settings
}

pub fn page(items: Vec<Value>, offset: u64, has_next: bool) -> Value {
    json!({
        "items": items,
        "offset": offset,
        "limit": 2,
        "total": null,
        "next": if has_next { json!("https://api.spotify.test/next") } else { Value::Null },
    })
}

pub fn album(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "album_type": "album", "release_date": "2020-01-01" })
}

pub fn track(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "track_number": 1 })
}

pub fn features(id: &str, danceability: f64, energy: f64) -> Value {
    json!({ "id": id, "danceability": danceability, "energy": energy, "valence": 0.5, "tempo": 120.0 })
}

pub fn record(name: &str, danceability: Option<f64>, energy: Option<f64>) -> FlatRecord {
    FlatRecord {
        track_name: name.to_string(),
        danceability,
        energy,
    }
}

pub fn row<'a>(rows: &'a [AggregateRow], name: &str) -> &'a AggregateRow {
    rows.iter()
        .find(|r| r.track_name == name)
        .unwrap_or_else(|| panic!("no row for {}", name))
}

pub fn approx(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}
