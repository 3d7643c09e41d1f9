use clap::ValueEnum;
use serde_json::json;
use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    analysis,
    config::Settings,
    error,
    error::CatalogError,
    info,
    management::CatalogPipeline,
    success,
    types::SkipSummary,
    utils, warning,
};

/// Row order of the printed result.
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum SortKey {
    /// Alphabetical by track name
    #[default]
    Name,
    /// Most danceable first
    Danceability,
}

/// Fetches an artist's catalog and prints the per-track feature means.
///
/// # Arguments
///
/// * `artist_id` - Spotify ID of the artist
/// * `page_size` - Overrides `SPAFCLI_PAGE_SIZE`
/// * `workers` - Overrides `SPAFCLI_WORKERS`
/// * `sort` - Row order of the output
/// * `as_json` - Print JSON instead of a table
///
/// # Behavior
///
/// Ctrl-C cancels the run; a cancelled run prints nothing but an error.
/// Albums and tracks that could not be fetched are reported as warnings and
/// in the skip summary below the table.
pub async fn analyze(
    artist_id: String,
    page_size: Option<u32>,
    workers: Option<usize>,
    sort: SortKey,
    as_json: bool,
) {
    let mut settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Cannot load settings. Err: {}", e),
    };
    if let Some(page_size) = page_size {
        settings.page_size = page_size;
    }
    if let Some(workers) = workers {
        settings.workers = workers;
    }
    let settings = settings.normalized();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let pb = utils::spinner("Preparing analysis...");
    let pipeline = match CatalogPipeline::new(&settings) {
        Ok(p) => p.with_progress(pb.clone()),
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot set up the Spotify client. Err: {}", e);
        }
    };

    let report = match pipeline.build_flat_table(&artist_id, &cancel).await {
        Ok(report) => report,
        Err(CatalogError::Cancelled) => {
            pb.finish_and_clear();
            error!("Analysis cancelled.");
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot fetch catalog of artist {}. Err: {}", artist_id, e);
        }
    };
    pb.finish_and_clear();

    let mut rows = match analysis::aggregate(&report.records) {
        Ok(rows) => rows,
        Err(e) => {
            print_summary(&report.skipped);
            error!("Nothing to analyse for artist {}: {}", artist_id, e);
        }
    };

    if let SortKey::Danceability = sort {
        utils::sort_by_danceability(&mut rows);
    }

    if as_json {
        let body = json!({
            "artist_id": artist_id,
            "tracks": rows,
            "skipped": report.skipped,
        });
        match serde_json::to_string_pretty(&body) {
            Ok(s) => println!("{}", s),
            Err(e) => error!("Cannot serialize result. Err: {}", e),
        }
        return;
    }

    let table = Table::new(utils::to_table_rows(&rows));
    println!("{}", table);
    print_summary(&report.skipped);

    success!(
        "Analysis completed: {} distinct tracks from {} albums.",
        rows.len(),
        report.skipped.albums_total - report.skipped.albums_failed
    );
}

fn print_summary(summary: &SkipSummary) {
    info!(
        "Albums: {albums}, track appearances: {occurrences}, distinct tracks: {unique}",
        albums = summary.albums_total,
        occurrences = summary.track_occurrences,
        unique = summary.unique_tracks
    );

    if summary.has_skips() {
        warning!(
            "Skipped {albums} albums, {features} audio-feature lookups and {local} tracks without id.",
            albums = summary.albums_failed,
            features = summary.features_failed,
            local = summary.tracks_without_id
        );
    }
}
