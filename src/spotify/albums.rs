use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::{error::CatalogError, spotify::SpotifyClient, types::Album};

impl SpotifyClient {
    /// Streams the full-length albums of an artist.
    ///
    /// Uses `GET /artists/{id}/albums` with `include_groups=album`, so
    /// singles, compilations and guest appearances are left out.
    pub fn artist_albums<'a>(
        &'a self,
        artist_id: &str,
        page_size: u32,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<Album, CatalogError>> + 'a {
        self.fetch_all(
            format!("artists/{id}/albums", id = artist_id),
            vec![
                ("include_groups".to_string(), "album".to_string()),
                ("limit".to_string(), page_size.to_string()),
            ],
            cancel,
        )
    }
}
