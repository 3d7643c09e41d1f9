use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::{error::CatalogError, spotify::SpotifyClient, types::Track};

impl SpotifyClient {
    /// Streams every track of an album via `GET /albums/{id}/tracks`.
    pub fn album_tracks<'a>(
        &'a self,
        album_id: &str,
        page_size: u32,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<Track, CatalogError>> + 'a {
        self.fetch_all(
            format!("albums/{id}/tracks", id = album_id),
            vec![("limit".to_string(), page_size.to_string())],
            cancel,
        )
    }
}
