//! Mapping from logical "universes" to physical pixel layout.
//!
//! Animation code writes whole universes; the wire code reads whole strands.
//! Both views share one master buffer: the logical-to-physical step is a
//! scatter write, the wire step is a linear scan over a strand.

use std::collections::HashMap;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ObeliskError, ObeliskResult};

/// Identifier of a universe within a [`PixelMap`].
///
/// IDs are assigned in insertion order starting at 0 and are stable for the
/// life of the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniverseId(pub usize);

/// A run of physical pixels within a single strand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalRange {
    /// Controller board index.
    pub board: usize,
    /// Strand index within the board.
    pub strand: usize,
    /// First pixel of the run.
    pub start_pixel: usize,
    /// Number of pixels in the run.
    pub size: usize,
}

/// `(board, strand, pixel)` address of one physical pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Location {
    board: usize,
    strand: usize,
    pixel: usize,
}

/// Bijective logical/physical pixel model.
///
/// Three levels of physical indexing (board, strand within board, pixel
/// within strand) plus a table of named universes, each an ordered list of
/// physical locations. A universe may span strands and a strand may host
/// several universes in arbitrary order.
pub struct PixelMap {
    phys: Vec<Vec<Vec<Rgba8>>>,
    universes: Vec<Vec<Location>>,
    names: HashMap<String, usize>,
}

impl PixelMap {
    /// Allocate all strand buffers from a strand-length table.
    ///
    /// The outer slice enumerates boards; inner values are per-strand pixel
    /// counts. Zero-length strands are allowed.
    pub fn new(dimensions: &[Vec<usize>]) -> Self {
        let phys = dimensions
            .iter()
            .map(|strands| {
                strands
                    .iter()
                    .map(|&len| vec![Rgba8::uninitialised(); len])
                    .collect()
            })
            .collect();
        Self {
            phys,
            universes: Vec::with_capacity(16),
            names: HashMap::new(),
        }
    }

    /// Add a universe under `name` covering `ranges` in order.
    ///
    /// The universe's logical order is the concatenation of the ranges as
    /// given. Returns `false` if the name is already taken or any pixel of
    /// any range lies outside its strand.
    pub fn add_universe(&mut self, name: &str, ranges: &[PhysicalRange]) -> bool {
        if self.names.contains_key(name) {
            return false;
        }
        for r in ranges {
            let Some(strand) = self.phys.get(r.board).and_then(|b| b.get(r.strand)) else {
                return false;
            };
            if r.start_pixel + r.size > strand.len() {
                return false;
            }
        }

        let size: usize = ranges.iter().map(|r| r.size).sum();
        let mut locs = Vec::with_capacity(size);
        for r in ranges {
            for pixel in r.start_pixel..r.start_pixel + r.size {
                locs.push(Location {
                    board: r.board,
                    strand: r.strand,
                    pixel,
                });
            }
        }

        self.universes.push(locs);
        self.names.insert(name.to_owned(), self.universes.len() - 1);
        true
    }

    /// Look up the ID assigned to `name`.
    pub fn id_for(&self, name: &str) -> Option<UniverseId> {
        self.names.get(name).copied().map(UniverseId)
    }

    /// Number of pixels in the universe.
    pub fn universe_size(&self, id: UniverseId) -> usize {
        self.universes.get(id.0).map_or(0, Vec::len)
    }

    /// Number of universes registered.
    pub fn universe_count(&self) -> usize {
        self.universes.len()
    }

    /// Scatter-write `data` into the universe's physical pixels.
    ///
    /// `data` must cover the whole universe; excess entries are ignored.
    pub fn update_universe(&mut self, id: UniverseId, data: &[Rgba8]) -> ObeliskResult<()> {
        let locs = self.universes.get(id.0).ok_or_else(|| {
            ObeliskError::validation(format!("universe {} does not exist", id.0))
        })?;
        if data.len() < locs.len() {
            return Err(ObeliskError::validation(format!(
                "pixel data ({}) shorter than universe {} ({})",
                data.len(),
                id.0,
                locs.len()
            )));
        }
        for (value, loc) in data.iter().zip(locs) {
            self.phys[loc.board][loc.strand][loc.pixel] = *value;
        }
        Ok(())
    }

    /// Borrow the master buffer for one strand.
    ///
    /// The borrow references the same storage `update_universe` writes into,
    /// so callers must not retain it across further universe updates that
    /// share the strand.
    pub fn strand_data(&mut self, board: usize, strand: usize) -> ObeliskResult<&mut [Rgba8]> {
        let strands = self
            .phys
            .get_mut(board)
            .ok_or_else(|| ObeliskError::validation(format!("{board} is an invalid board index")))?;
        let buf = strands.get_mut(strand).ok_or_else(|| {
            ObeliskError::validation(format!(
                "{strand} is an invalid strand number for board {board}"
            ))
        })?;
        Ok(buf.as_mut_slice())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/universe.rs"]
mod tests;
