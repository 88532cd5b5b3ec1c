//! Result of one tile selection pass

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::entry::TileEntry;
use super::tile::TileOffsetKey;

/// Visible tiles of one zoom level
pub type ZoomLevelTileMap = HashMap<TileOffsetKey, Arc<TileEntry>>;

/// Visible tiles per requested zoom level
#[derive(Clone, Debug, Default)]
pub struct TileSelection {
    pub tile_key_entries: BTreeMap<u32, ZoomLevelTileMap>,
    /// False when approximate elevation data was used; callers may re-run
    /// once better data is available
    pub calculation_final: bool,
}

impl TileSelection {
    pub fn entries(&self, zoom_level: u32) -> Option<&ZoomLevelTileMap> {
        self.tile_key_entries.get(&zoom_level)
    }

    /// Total number of entries across all zoom levels
    pub fn len(&self) -> usize {
        self.tile_key_entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of a zoom level ordered near to far
    pub fn sorted_by_distance(&self, zoom_level: u32) -> Vec<Arc<TileEntry>> {
        let mut entries: Vec<_> = self
            .entries(zoom_level)
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.tile_key.cmp(&b.tile_key))
                .then_with(|| a.offset.cmp(&b.offset))
        });
        entries
    }
}

/// Counters collected during a traversal, for logging
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub visited: usize,
    pub subdivided: usize,
    pub pruned: usize,
    pub lod_stopped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tile::TileKey;

    #[test]
    fn test_sorted_by_distance() {
        let mut map = ZoomLevelTileMap::new();
        for (column, distance) in [(0, 0.7), (1, 0.2), (2, 0.5)] {
            let entry = TileEntry::new(TileKey::new(2, 0, column), 0, 1.0, distance, 0.0, 0.0);
            map.insert(entry.offset_key(), Arc::new(entry));
        }
        let selection = TileSelection {
            tile_key_entries: BTreeMap::from([(2, map)]),
            calculation_final: true,
        };

        let columns: Vec<u32> = selection
            .sorted_by_distance(2)
            .iter()
            .map(|e| e.tile_key.column)
            .collect();
        assert_eq!(columns, vec![1, 2, 0]);
        assert_eq!(selection.len(), 3);
        assert!(selection.sorted_by_distance(5).is_empty());
    }
}
