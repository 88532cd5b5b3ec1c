//! Tile addressing and the tile/offset key encoding used for map lookups

use serde::{Deserialize, Serialize};

/// Deepest level a [`TileKey`] may address (morton code must fit in 57 bits)
pub const MAX_TILE_LEVEL: u32 = 28;

/// Number of bits reserved for the world-wrap offset in a [`TileOffsetKey`]
pub const OFFSET_BITS: u32 = 4;

/// Smallest world-wrap offset a [`TileOffsetKey`] can represent
pub const MIN_OFFSET: i32 = -(1 << (OFFSET_BITS - 1));

/// Largest world-wrap offset a [`TileOffsetKey`] can represent
pub const MAX_OFFSET: i32 = (1 << (OFFSET_BITS - 1)) - 1;

/// Widest symmetric range of world copies, `-MAX_WRAP_OFFSET..=MAX_WRAP_OFFSET`
pub const MAX_WRAP_OFFSET: i32 = if MAX_OFFSET < -MIN_OFFSET {
    MAX_OFFSET
} else {
    -MIN_OFFSET
};

const OFFSET_SHIFT: u32 = 64 - OFFSET_BITS;

/// Hierarchical quadtree address of a tile
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TileKey {
    pub level: u32,
    pub row: u32,
    pub column: u32,
}

impl TileKey {
    pub fn new(level: u32, row: u32, column: u32) -> Self {
        debug_assert!(level <= MAX_TILE_LEVEL, "tile level {level} out of range");
        Self { level, row, column }
    }

    /// The single level-0 tile
    pub fn root() -> Self {
        Self::new(0, 0, 0)
    }

    /// Direct parent, `None` for the root
    pub fn parent(&self) -> Option<TileKey> {
        self.parent_at_level(self.level.checked_sub(1)?)
    }

    /// Ancestor at a lower level
    pub fn parent_at_level(&self, target_level: u32) -> Option<TileKey> {
        if target_level >= self.level {
            return None;
        }
        let diff = self.level - target_level;
        Some(TileKey {
            level: target_level,
            row: self.row >> diff,
            column: self.column >> diff,
        })
    }

    /// The four quadtree children, row-major
    pub fn children(&self) -> [TileKey; 4] {
        let level = self.level + 1;
        let (row, column) = (self.row << 1, self.column << 1);
        [
            TileKey::new(level, row, column),
            TileKey::new(level, row, column + 1),
            TileKey::new(level, row + 1, column),
            TileKey::new(level, row + 1, column + 1),
        ]
    }

    /// True when `other` lies strictly below this tile in the tree
    pub fn is_ancestor_of(&self, other: &TileKey) -> bool {
        other.parent_at_level(self.level) == Some(*self)
    }

    /// Morton (z-order) code with a leading sentinel bit marking the level
    pub fn morton_code(&self) -> u64 {
        let mut code = 1_u64 << (2 * self.level);
        for bit in 0..self.level {
            code |= (((self.column >> bit) & 1) as u64) << (2 * bit);
            code |= (((self.row >> bit) & 1) as u64) << (2 * bit + 1);
        }
        code
    }

    /// Inverse of [`TileKey::morton_code`]
    pub fn from_morton_code(code: u64) -> Option<TileKey> {
        if code == 0 {
            return None;
        }
        let msb = 63 - code.leading_zeros();
        if msb % 2 != 0 || msb / 2 > MAX_TILE_LEVEL {
            return None;
        }
        let level = msb / 2;
        let (mut row, mut column) = (0_u32, 0_u32);
        for bit in 0..level {
            column |= (((code >> (2 * bit)) & 1) as u32) << bit;
            row |= (((code >> (2 * bit + 1)) & 1) as u32) << bit;
        }
        Some(TileKey { level, row, column })
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.row, self.column)
    }
}

/// Composite identity of a tile repeated at a world-wrap offset.
///
/// Layout: the biased offset occupies the top [`OFFSET_BITS`] bits, the
/// morton code of the tile key the remaining low bits. Injective for every
/// key up to [`MAX_TILE_LEVEL`] and every offset in `MIN_OFFSET..=MAX_OFFSET`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct TileOffsetKey(pub u64);

impl TileOffsetKey {
    pub fn new(tile_key: &TileKey, offset: i32) -> Self {
        debug_assert!(
            (MIN_OFFSET..=MAX_OFFSET).contains(&offset),
            "world offset {offset} out of encodable range"
        );
        let biased = (offset - MIN_OFFSET) as u64;
        Self((biased << OFFSET_SHIFT) | tile_key.morton_code())
    }

    /// Recover the tile key and offset this key was built from
    pub fn decode(&self) -> Option<(TileKey, i32)> {
        let morton = self.0 & ((1_u64 << OFFSET_SHIFT) - 1);
        let offset = (self.0 >> OFFSET_SHIFT) as i32 + MIN_OFFSET;
        Some((TileKey::from_morton_code(morton)?, offset))
    }
}

/// Normalize longitude to [-180, 180]
pub fn normalize_longitude(lon: f64) -> f64 {
    let mut l = lon;
    while l < -180.0 {
        l += 360.0;
    }
    while l > 180.0 {
        l -= 360.0;
    }
    l
}

/// Clamp latitude to a projection's valid range
pub fn clamp_latitude(lat: f64, limit: f64) -> f64 {
    lat.clamp(-limit, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_morton_code_roundtrip() {
        let key = TileKey::new(12, 1234, 3071);
        assert_eq!(TileKey::from_morton_code(key.morton_code()), Some(key));
        assert_eq!(TileKey::root().morton_code(), 1);
    }

    #[test]
    fn test_children_and_parent() {
        let key = TileKey::new(3, 5, 2);
        for child in key.children() {
            assert_eq!(child.level, 4);
            assert_eq!(child.parent(), Some(key));
            assert!(key.is_ancestor_of(&child));
            assert!(!child.is_ancestor_of(&key));
        }
        assert_eq!(TileKey::root().parent(), None);
    }

    #[test]
    fn test_is_ancestor_of_skips_levels() {
        let root = TileKey::root();
        let deep = TileKey::new(6, 40, 17);
        assert!(root.is_ancestor_of(&deep));
        assert!(!deep.is_ancestor_of(&deep));
        assert!(!TileKey::new(1, 1, 1).is_ancestor_of(&TileKey::new(2, 0, 0)));
    }

    #[test]
    fn test_offset_key_distinguishes_offsets() {
        let key = TileKey::new(5, 10, 20);
        let keys: HashSet<_> = (MIN_OFFSET..=MAX_OFFSET)
            .map(|offset| TileOffsetKey::new(&key, offset))
            .collect();
        assert_eq!(keys.len(), (MAX_OFFSET - MIN_OFFSET + 1) as usize);
    }

    #[test]
    fn test_offset_key_decode() {
        let key = TileKey::new(MAX_TILE_LEVEL, (1 << 28) - 1, 7);
        assert_eq!(TileOffsetKey::new(&key, -2).decode(), Some((key, -2)));
        assert_eq!(TileOffsetKey::new(&key, MAX_OFFSET).decode(), Some((key, MAX_OFFSET)));
    }

    #[test]
    fn test_normalize_longitude() {
        assert!((normalize_longitude(190.0) - (-170.0)).abs() < 0.001);
        assert!((normalize_longitude(-190.0) - 170.0).abs() < 0.001);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn tile_key() -> impl Strategy<Value = TileKey> {
            (0u32..=20).prop_flat_map(|level| {
                let n = 1u32 << level;
                (Just(level), 0..n, 0..n).prop_map(|(l, r, c)| TileKey::new(l, r, c))
            })
        }

        proptest! {
            #[test]
            fn test_offset_key_is_injective(
                a in tile_key(),
                b in tile_key(),
                offset_a in -2i32..=2,
                offset_b in -2i32..=2,
            ) {
                let same_input = a == b && offset_a == offset_b;
                let same_key = TileOffsetKey::new(&a, offset_a) == TileOffsetKey::new(&b, offset_b);
                prop_assert_eq!(
                    same_input, same_key,
                    "{} @ {} vs {} @ {}", a, offset_a, b, offset_b
                );
            }

            #[test]
            fn test_offset_key_decodes_to_input(key in tile_key(), offset in -2i32..=2) {
                prop_assert_eq!(TileOffsetKey::new(&key, offset).decode(), Some((key, offset)));
            }
        }
    }
}
