mod common;

use common::{approx, record, row};
use spafcli::{analysis::aggregate, error::CatalogError};

#[test]
fn test_aggregate_mixed_groups() {
    let records = vec![
        record("A", Some(0.5), Some(0.8)),
        record("A", Some(0.7), None),
        record("B", Some(0.2), Some(0.4)),
    ];

    let rows = aggregate(&records).unwrap();
    assert_eq!(rows.len(), 2);

    let a = row(&rows, "A");
    assert!(approx(a.mean_danceability, 0.6));
    assert!(approx(a.mean_energy, 0.8));
    assert_eq!(a.appearances, 2);

    let b = row(&rows, "B");
    assert!(approx(b.mean_danceability, 0.2));
    assert!(approx(b.mean_energy, 0.4));
    assert_eq!(b.appearances, 1);
}

#[test]
fn test_aggregate_single_record_keeps_its_values() {
    let rows = aggregate(&[record("Solo", Some(0.31), Some(0.92))]).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].track_name, "Solo");
    assert_eq!(rows[0].mean_danceability, Some(0.31));
    assert_eq!(rows[0].mean_energy, Some(0.92));
}

#[test]
fn test_aggregate_all_absent_feature_is_none_not_zero() {
    let records = vec![
        record("Quiet", Some(0.4), None),
        record("Quiet", Some(0.6), None),
        record("Unknown", None, None),
    ];

    let rows = aggregate(&records).unwrap();

    let quiet = row(&rows, "Quiet");
    assert!(approx(quiet.mean_danceability, 0.5));
    assert_eq!(quiet.mean_energy, None);

    let unknown = row(&rows, "Unknown");
    assert_eq!(unknown.mean_danceability, None);
    assert_eq!(unknown.mean_energy, None);
    assert_eq!(unknown.appearances, 1);
}

#[test]
fn test_aggregate_is_order_independent() {
    let records = vec![
        record("A", Some(0.1), Some(0.3)),
        record("B", Some(0.7), None),
        record("A", Some(0.2), Some(0.9)),
        record("A", Some(0.3), None),
        record("C", None, Some(0.25)),
        record("B", Some(0.35), Some(0.45)),
    ];
    let mut reversed = records.clone();
    reversed.reverse();
    let mut rotated = records.clone();
    rotated.rotate_left(2);

    let first = aggregate(&records).unwrap();
    assert_eq!(first, aggregate(&records).unwrap());
    assert_eq!(first, aggregate(&reversed).unwrap());
    assert_eq!(first, aggregate(&rotated).unwrap());
}

#[test]
fn test_aggregate_groups_by_exact_name() {
    let records = vec![
        record("Song", Some(0.5), Some(0.5)),
        record("song", Some(0.1), Some(0.1)),
        record("Song ", Some(0.9), Some(0.9)),
    ];

    let rows = aggregate(&records).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.appearances == 1));
}

#[test]
fn test_aggregate_rows_sorted_by_name() {
    let records = vec![
        record("Zebra", Some(0.1), None),
        record("Alpha", Some(0.2), None),
        record("Mango", Some(0.3), None),
    ];

    let names: Vec<String> = aggregate(&records)
        .unwrap()
        .into_iter()
        .map(|r| r.track_name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Mango", "Zebra"]);
}

#[test]
fn test_aggregate_empty_input_fails() {
    let result = aggregate(&[]);
    assert!(matches!(result, Err(CatalogError::EmptyInput)));
}
