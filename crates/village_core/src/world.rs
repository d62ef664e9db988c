//! Tile grid, tile kinds, and world generation configuration.

use serde::{Deserialize, Serialize};

/// Terrain tile kinds.
///
/// Tiles are immutable after generation; buildings and entities sit on top
/// of the grid and never rewrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileId {
    /// Ocean, river, and lake tiles.
    Water,
    /// The beach band hugging the waterline.
    Sand,
    /// Bare rock scattered through leftover land.
    Rock,
    /// Dry earth scattered through leftover land.
    Dirt,
    /// Plain grassland (leftover land default).
    Grass,
    /// Forest biome; tree and mushroom spawns happen here.
    Forest,
    /// Lush meadow; also the fallback when a biome region is dissolved.
    Meadow,
    /// Desert biome (region-limited).
    Desert,
    /// Mountain biome (region-limited).
    Mountain,
}

impl TileId {
    /// Whether the tile is water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water)
    }

    /// Whether the tile is land (anything but water).
    #[must_use]
    pub const fn is_land(self) -> bool {
        !self.is_water()
    }
}

/// Integer tile coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TilePos {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TilePos {
    /// Create a tile position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Center of this tile in world (sub-tile) coordinates.
    #[must_use]
    pub fn center(self) -> crate::math::Vec2 {
        crate::math::Vec2::tile_center(self.x, self.y)
    }
}

/// World generation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Fraction of all tiles assigned to water (exact count, not threshold).
    pub water_ratio: f32,
    /// Fraction of all tiles assigned to sand (exact count, not threshold).
    pub sand_ratio: f32,
    /// Random seed for deterministic generation.
    pub seed: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            water_ratio: 0.32,
            sand_ratio: 0.06,
            seed: 12345,
        }
    }
}

impl WorldConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the grid dimensions.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Total tile count.
    #[must_use]
    pub const fn total_tiles(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Exact number of water tiles this config produces.
    #[must_use]
    pub fn water_tiles(&self) -> usize {
        round_count(self.total_tiles(), self.water_ratio)
    }

    /// Exact number of sand tiles this config produces.
    #[must_use]
    pub fn sand_tiles(&self) -> usize {
        round_count(self.total_tiles(), self.sand_ratio)
    }
}

fn round_count(total: usize, ratio: f32) -> usize {
    // Round-half-up on an exact product; ratios are small multiples of 0.01
    // so this never wobbles across platforms.
    ((total as f64) * f64::from(ratio) + 0.5).floor() as usize
}

/// The generated island: immutable tile grid in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Tiles, row-major (`y * width + x`).
    pub tiles: Vec<TileId>,
    /// Coastline score at the waterline; tiles scoring below this became
    /// water during generation.
    pub water_level: f32,
}

impl World {
    /// Tile at grid coordinates, or `None` out of bounds.
    #[must_use]
    pub fn tile(&self, x: u32, y: u32) -> Option<TileId> {
        if x < self.width && y < self.height {
            self.tiles.get((y * self.width + x) as usize).copied()
        } else {
            None
        }
    }

    /// Whether signed coordinates fall inside the grid.
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Row-major index of a tile.
    #[must_use]
    pub const fn idx(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Count tiles of a kind.
    #[must_use]
    pub fn count(&self, kind: TileId) -> usize {
        self.tiles.iter().filter(|t| **t == kind).count()
    }

    /// Whether a tile exists and can carry a building footprint.
    #[must_use]
    pub fn is_buildable(&self, x: u32, y: u32) -> bool {
        self.tile(x, y).is_some_and(TileId::is_land)
    }

    /// The land tile nearest the map center; the village is seeded around
    /// it. `None` only for an all-water world.
    #[must_use]
    pub fn land_anchor(&self) -> Option<TilePos> {
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        let mut best: Option<(f32, TilePos)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tiles[self.idx(x, y)].is_water() {
                    continue;
                }
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = dx * dx + dy * dy;
                if best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, TilePos::new(x, y)));
                }
            }
        }
        best.map(|(_, pos)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_exact_counts() {
        let config = WorldConfig::default();
        assert_eq!(config.total_tiles(), 128 * 64);
        assert_eq!(config.water_tiles(), (128.0 * 64.0 * 0.32_f64) as usize);
        let tiny = WorldConfig::default().with_size(10, 10);
        assert_eq!(tiny.water_tiles(), 32);
        assert_eq!(tiny.sand_tiles(), 6);
    }

    #[test]
    fn test_tile_access_bounds() {
        let world = World {
            width: 2,
            height: 2,
            tiles: vec![TileId::Water, TileId::Sand, TileId::Grass, TileId::Forest],
            water_level: 0.25,
        };
        assert_eq!(world.tile(0, 0), Some(TileId::Water));
        assert_eq!(world.tile(1, 1), Some(TileId::Forest));
        assert_eq!(world.tile(2, 0), None);
        assert!(world.in_bounds(1, 1));
        assert!(!world.in_bounds(-1, 0));
        assert!(!world.is_buildable(0, 0));
        assert!(world.is_buildable(1, 0));
    }
}
