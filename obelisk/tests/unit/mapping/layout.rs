use super::*;
use crate::foundation::core::{NUM_SHAFT_WINDOWS, WINDOW_SIZE};

#[test]
fn table_names_every_window_once() {
    let specs = sculpture_universes();
    assert_eq!(specs.len(), NUM_RESONATORS + NUM_SHAFT_WINDOWS);
    assert_eq!(specs[0].name, "base1");
    assert_eq!(specs[7].name, "base8");
    assert_eq!(specs[8].name, "towerLevel1Window1");
    assert_eq!(specs[23].name, "towerLevel8Window2");

    let mut names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), specs.len());
}

#[test]
fn strand_lengths_cover_two_windows_per_strand() {
    let lengths = strand_lengths(&sculpture_universes());
    assert_eq!(lengths.len(), 2);
    assert_eq!(lengths[0], vec![2 * WINDOW_SIZE; 4]);
    assert_eq!(lengths[1], vec![2 * WINDOW_SIZE; 8]);
}

#[test]
fn built_map_assigns_consecutive_ids() {
    let (map, ids) = build_sculpture_map();
    assert_eq!(ids.len(), 24);
    for (idx, id) in ids.iter().enumerate() {
        assert_eq!(id.0, idx);
    }
    assert_eq!(universe_sizes(&map, &ids), vec![WINDOW_SIZE; 24]);
}

#[test]
fn window_buffer_is_one_window_of_unwritten_pixels() {
    let buf = window_buffer();
    assert_eq!(buf.len(), WINDOW_SIZE);
    assert!(buf.iter().all(|px| px.a == 0));
}
