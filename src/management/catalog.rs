use std::collections::HashMap;

use futures::{StreamExt, TryStreamExt, stream};
use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Settings,
    error::CatalogError,
    spotify::SpotifyClient,
    types::{Album, AudioFeatures, CatalogReport, FlatRecord, SkipSummary, Track},
    utils, warning,
};

/// Drives the three fetch stages for one artist and flattens the result.
///
/// # Stages
///
/// 1. **Albums**: `GET /artists/{id}/albums`, sequential page walk. Any
///    failure here aborts the run.
/// 2. **Tracks**: `GET /albums/{id}/tracks` per album on a bounded worker
///    pool. A failing album is skipped and counted.
/// 3. **Audio features**: `GET /audio-features/{id}` once per distinct track
///    id on the same pool. A failing lookup leaves the features absent.
///
/// A failed credential exchange aborts the run in every stage.
///
/// Every track occurrence produces exactly one [`FlatRecord`], so a song
/// released on two albums yields two records with the same name.
///
/// # Cancellation
///
/// The token is checked before each page request and each pool task. A
/// cancelled run returns [`CatalogError::Cancelled`] and never a partial
/// table.
pub struct CatalogPipeline {
    client: SpotifyClient,
    page_size: u32,
    workers: usize,
    progress: Option<ProgressBar>,
}

impl CatalogPipeline {
    pub fn new(settings: &Settings) -> Result<Self, CatalogError> {
        let settings = settings.clone().normalized();
        let client = SpotifyClient::new(&settings)?;
        Ok(Self::with_client(client, &settings))
    }

    pub fn with_client(client: SpotifyClient, settings: &Settings) -> Self {
        CatalogPipeline {
            client,
            page_size: settings.page_size.clamp(1, crate::config::MAX_PAGE_SIZE),
            workers: settings.workers.max(1),
            progress: None,
        }
    }

    /// Reports stage progress on the given spinner.
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }

    pub async fn build_flat_table(
        &self,
        artist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<CatalogReport, CatalogError> {
        let mut summary = SkipSummary::default();

        self.report(format!("Fetching albums for artist {}...", artist_id));
        let mut albums: Vec<Album> = self
            .client
            .artist_albums(artist_id, self.page_size, cancel.clone())
            .try_collect()
            .await?;
        utils::remove_duplicate_albums(&mut albums);
        summary.albums_total = albums.len();

        self.report(format!("Fetching tracks of {} albums...", albums.len()));
        let album_results: Vec<_> = stream::iter(albums)
            .map(|album| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return (album, Err(CatalogError::Cancelled));
                    }
                    let tracks = self
                        .client
                        .album_tracks(&album.id, self.page_size, cancel)
                        .try_collect::<Vec<Track>>()
                        .await;
                    (album, tracks)
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let mut occurrences: Vec<Track> = Vec::new();
        for (album, result) in album_results {
            match result {
                Ok(tracks) => occurrences.extend(tracks),
                Err(e @ (CatalogError::Cancelled | CatalogError::Auth(_))) => return Err(e),
                Err(e) => {
                    summary.albums_failed += 1;
                    self.soft_failure(format!(
                        "Skipping album {name} ({id}): {error}",
                        name = album.name,
                        id = album.id,
                        error = e
                    ));
                }
            }
        }
        summary.track_occurrences = occurrences.len();
        summary.tracks_without_id = occurrences.iter().filter(|t| t.id.is_none()).count();

        let track_ids = utils::unique_track_ids(&occurrences);
        summary.unique_tracks = track_ids.len();

        self.report(format!(
            "Fetching audio features of {} tracks...",
            track_ids.len()
        ));
        let feature_results: Vec<_> = stream::iter(track_ids)
            .map(|id| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return (id, Err(CatalogError::Cancelled));
                    }
                    let features = self.client.audio_features(&id).await;
                    (id, features)
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let mut features: HashMap<String, AudioFeatures> = HashMap::new();
        for (id, result) in feature_results {
            match result {
                Ok(Some(f)) => {
                    features.insert(id, f);
                }
                Ok(None) => {
                    summary.features_failed += 1;
                    self.soft_failure(format!("No audio features available for track {}", id));
                }
                Err(e @ (CatalogError::Cancelled | CatalogError::Auth(_))) => return Err(e),
                Err(e) => {
                    summary.features_failed += 1;
                    self.soft_failure(format!(
                        "Skipping audio features of track {id}: {error}",
                        id = id,
                        error = e
                    ));
                }
            }
        }

        let records = occurrences
            .into_iter()
            .map(|track| {
                let f = track.id.as_ref().and_then(|id| features.get(id));
                FlatRecord {
                    track_name: track.name,
                    danceability: f.and_then(|f| f.danceability),
                    energy: f.and_then(|f| f.energy),
                }
            })
            .collect();

        Ok(CatalogReport {
            records,
            skipped: summary,
        })
    }

    fn report(&self, message: String) {
        if let Some(pb) = &self.progress {
            pb.set_message(message);
        }
    }

    fn soft_failure(&self, message: String) {
        match &self.progress {
            Some(pb) => pb.suspend(|| warning!("{}", message)),
            None => warning!("{}", message),
        }
    }
}
