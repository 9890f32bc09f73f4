//! The sculpture's concrete universe table.
//!
//! Board 0 carries the eight resonator windows at the base, two 30-pixel
//! windows per strand; board 1 carries the sixteen shaft windows, again two
//! per strand. Strand lengths are derived from the ranges rather than stated
//! twice.

use crate::foundation::core::{Rgba8, NUM_RESONATORS, WINDOW_SIZE};
use crate::mapping::universe::{PhysicalRange, PixelMap, UniverseId};

/// One named universe and the physical ranges backing it.
pub struct UniverseSpec {
    /// Logical name, unique across the sculpture.
    pub name: String,
    /// Physical runs in logical order.
    pub ranges: Vec<PhysicalRange>,
}

/// The base and tower window table.
///
/// Names follow the device convention: `base1..base8` then
/// `towerLevel{1..8}Window{1..2}`.
pub fn sculpture_universes() -> Vec<UniverseSpec> {
    let mut specs = Vec::with_capacity(24);

    for reso in 0..NUM_RESONATORS {
        specs.push(UniverseSpec {
            name: format!("base{}", reso + 1),
            ranges: vec![PhysicalRange {
                board: 0,
                strand: reso / 2,
                start_pixel: (reso % 2) * WINDOW_SIZE,
                size: WINDOW_SIZE,
            }],
        });
    }

    for level in 0..8 {
        for window in 0..2 {
            specs.push(UniverseSpec {
                name: format!("towerLevel{}Window{}", level + 1, window + 1),
                ranges: vec![PhysicalRange {
                    board: 1,
                    strand: level,
                    start_pixel: window * WINDOW_SIZE,
                    size: WINDOW_SIZE,
                }],
            });
        }
    }

    specs
}

/// Derive per-board strand lengths from a universe table.
///
/// Each strand's length is the maximum extent of any range touching it, so
/// the physical buffers are exactly as large as the mapped pixels require.
pub fn strand_lengths(specs: &[UniverseSpec]) -> Vec<Vec<usize>> {
    let mut boards: Vec<Vec<usize>> = Vec::new();
    for spec in specs {
        for r in &spec.ranges {
            if boards.len() <= r.board {
                boards.resize(r.board + 1, Vec::new());
            }
            let strands = &mut boards[r.board];
            if strands.len() <= r.strand {
                strands.resize(r.strand + 1, 0);
            }
            strands[r.strand] = strands[r.strand].max(r.start_pixel + r.size);
        }
    }
    boards
}

/// A fully-populated pixel map for the sculpture plus the universe IDs in
/// table order.
pub fn build_sculpture_map() -> (PixelMap, Vec<UniverseId>) {
    let specs = sculpture_universes();
    let mut map = PixelMap::new(&strand_lengths(&specs));
    let mut ids = Vec::with_capacity(specs.len());
    for spec in &specs {
        // The table is static and self-consistent; a rejected insert would be
        // a bug in this module.
        if !map.add_universe(&spec.name, &spec.ranges) {
            tracing::error!(universe = %spec.name, "sculpture table rejected by pixel map");
            continue;
        }
        if let Some(id) = map.id_for(&spec.name) {
            ids.push(id);
        }
    }
    (map, ids)
}

/// Sizes of every universe in ID order, the shape the sequence runner wants.
pub fn universe_sizes(map: &PixelMap, ids: &[UniverseId]) -> Vec<usize> {
    ids.iter().map(|&id| map.universe_size(id)).collect()
}

/// Blank frame buffer for one window universe.
pub fn window_buffer() -> Vec<Rgba8> {
    vec![Rgba8::uninitialised(); WINDOW_SIZE]
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/layout.rs"]
mod tests;
