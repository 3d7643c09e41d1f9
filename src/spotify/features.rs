use crate::{error::CatalogError, spotify::SpotifyClient, types::AudioFeatures};

impl SpotifyClient {
    /// Fetches the audio features of a single track.
    ///
    /// The endpoint has no paginated form. Spotify answers `null` for tracks
    /// it has not analysed, which comes back as `Ok(None)`.
    pub async fn audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, CatalogError> {
        self.get(&format!("audio-features/{id}", id = track_id), &[])
            .await
    }
}
