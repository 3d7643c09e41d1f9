use std::{cmp::Ordering, collections::HashSet, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::types::{AggregateRow, AggregateTableRow, Album, Track};

pub fn remove_duplicate_albums(albums: &mut Vec<Album>) {
    let mut seen_ids = HashSet::new();
    albums.retain(|album| seen_ids.insert(album.id.clone()));
}

/// Distinct track ids in first-seen order; tracks without an id are skipped.
pub fn unique_track_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen_ids = HashSet::new();
    tracks
        .iter()
        .filter_map(|track| track.id.as_deref())
        .filter(|id| seen_ids.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Orders rows by descending danceability, absent values last, then by name.
pub fn sort_by_danceability(rows: &mut [AggregateRow]) {
    rows.sort_by(|a, b| {
        let by_mean = match (a.mean_danceability, b.mean_danceability) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_mean.then_with(|| a.track_name.cmp(&b.track_name))
    });
}

pub fn to_table_rows(rows: &[AggregateRow]) -> Vec<AggregateTableRow> {
    rows.iter().map(AggregateTableRow::from).collect()
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
