use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 50 * 60;

/// Tokens are renewed this long before they actually expire, or after half
/// their lifetime when that is shorter.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 240;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    refresh_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: String, expires_in: Option<u64>, obtained_at: DateTime<Utc>) -> Self {
        let lifetime = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        let expires_at = obtained_at + Duration::seconds(lifetime);
        let margin = TOKEN_REFRESH_MARGIN_SECS.min(lifetime / 2);

        Credential {
            access_token,
            expires_at,
            refresh_at: expires_at - Duration::seconds(margin),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.refresh_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub offset: Option<u64>,
    pub cursors: Option<Cursors>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// `None` for local files, which cannot be looked up.
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub track_name: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub track_name: String,
    pub mean_danceability: Option<f64>,
    pub mean_energy: Option<f64>,
    pub appearances: usize,
}

#[derive(Tabled)]
pub struct AggregateTableRow {
    pub track: String,
    pub danceability: String,
    pub energy: String,
    pub appearances: usize,
}

impl From<&AggregateRow> for AggregateTableRow {
    fn from(row: &AggregateRow) -> Self {
        let fmt_mean = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));

        AggregateTableRow {
            track: row.track_name.clone(),
            danceability: fmt_mean(row.mean_danceability),
            energy: fmt_mean(row.mean_energy),
            appearances: row.appearances,
        }
    }
}

/// Counts of what a pipeline run saw and what it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipSummary {
    pub albums_total: usize,
    pub albums_failed: usize,
    pub track_occurrences: usize,
    pub unique_tracks: usize,
    pub tracks_without_id: usize,
    pub features_failed: usize,
}

impl SkipSummary {
    pub fn has_skips(&self) -> bool {
        self.albums_failed > 0 || self.tracks_without_id > 0 || self.features_failed > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReport {
    pub records: Vec<FlatRecord>,
    pub skipped: SkipSummary,
}
