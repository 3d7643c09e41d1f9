//! Aggregation of the flat track table.
//!
//! Records are grouped by their exact track name; no case or whitespace
//! normalization happens, so "Song" and "Song (Remix)" stay separate groups.

use std::collections::BTreeMap;

use crate::{
    error::CatalogError,
    types::{AggregateRow, FlatRecord},
};

/// Values are kept and summed in sorted order so the mean is bit-identical
/// whatever order the records arrive in.
#[derive(Debug, Default)]
struct Mean {
    values: Vec<f64>,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.values.push(v);
        }
    }

    fn value(mut self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        self.values.sort_by(f64::total_cmp);
        let sum: f64 = self.values.iter().sum();
        Some(sum / self.values.len() as f64)
    }
}

#[derive(Debug, Default)]
struct Group {
    danceability: Mean,
    energy: Mean,
    appearances: usize,
}

/// Computes per-track-name means of danceability and energy.
///
/// Absent values are left out of the respective mean's denominator; a group
/// with no value at all for a feature gets `None` instead of zero. Rows are
/// returned sorted by track name, so the result does not depend on the order
/// of `records`.
///
/// # Errors
///
/// Returns [`CatalogError::EmptyInput`] when `records` is empty.
pub fn aggregate(records: &[FlatRecord]) -> Result<Vec<AggregateRow>, CatalogError> {
    if records.is_empty() {
        return Err(CatalogError::EmptyInput);
    }

    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    for record in records {
        let group = groups.entry(record.track_name.as_str()).or_default();
        group.danceability.push(record.danceability);
        group.energy.push(record.energy);
        group.appearances += 1;
    }

    Ok(groups
        .into_iter()
        .map(|(name, group)| AggregateRow {
            track_name: name.to_string(),
            mean_danceability: group.danceability.value(),
            mean_energy: group.energy.value(),
            appearances: group.appearances,
        })
        .collect())
}
