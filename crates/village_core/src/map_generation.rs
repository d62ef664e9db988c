//! Procedural island generation.
//!
//! The pipeline runs in fixed stages, all driven by the world seed:
//!
//! 1. Coastline scoring: distance-to-edge, domain-warped by low-frequency
//!    noise so the island outline is irregular.
//! 2. Exact-area assignment: tiles sorted by score; the lowest N become
//!    water and the next M become sand. N and M are counts, not thresholds,
//!    so the water and beach areas are identical for every seed.
//! 3. Moisture and biome fields (multi-octave value noise), then greedy
//!    assignment of the best-scoring land tiles per biome up to exact
//!    per-biome targets, in priority order. Leftover land becomes grass,
//!    dirt, or rock by a hashed micro-pattern.
//! 4. A river walks from an inland moisture peak downhill to the coast,
//!    with seeded jitter and occasional bulges.
//! 5. A diamond lake with eroded edges stamps another moisture peak.
//! 6. Shore compensation: every land tile carved to water converts one sand
//!    tile back to grass, preserving the exact water + sand total.
//! 7. Region limiting: constrained biomes keep at most a fixed number of
//!    connected regions; excess regions dissolve into meadow.

use std::collections::VecDeque;

use tracing::debug;

use crate::math::{lerp, smoothstep};
use crate::rng::{hash2_unit, hash_u32, Mulberry32};
use crate::world::{TileId, World, WorldConfig};

// Noise seed salts, one per field.
const SALT_WARP_X: u32 = 1;
const SALT_WARP_Y: u32 = 2;
const SALT_COAST_DETAIL: u32 = 3;
const SALT_MOISTURE: u32 = 4;
const SALT_MOISTURE_DETAIL: u32 = 5;
const SALT_BIOME_BASE: u32 = 6;
const SALT_MICRO: u32 = 7;
const SALT_RIVER: u32 = 8;
const SALT_LAKE: u32 = 9;

const WARP_FREQ: f32 = 0.04;
const WARP_AMP: f32 = 8.0;
const COAST_DETAIL_FREQ: f32 = 0.15;
const MOISTURE_FREQ: f32 = 0.045;
const MOISTURE_DETAIL_FREQ: f32 = 0.18;
const BIOME_FREQ: f32 = 0.06;

/// Per-biome area targets, as fractions of the land left open after the
/// coastline pass, in assignment priority order.
const BIOME_TARGETS: [(TileId, f32); 4] = [
    (TileId::Desert, 0.06),
    (TileId::Mountain, 0.07),
    (TileId::Forest, 0.18),
    (TileId::Meadow, 0.16),
];

/// Constrained biomes and their maximum region counts.
const REGION_LIMITS: [(TileId, usize); 3] = [
    (TileId::Desert, 2),
    (TileId::Mountain, 2),
    (TileId::Forest, 3),
];

const RIVER_MIN_INLAND: u32 = 10;
const RIVER_MOUTH_DIST: u32 = 2;
const RIVER_MAX_LEN: usize = 96;
const RIVER_JITTER: f32 = 0.35;
const RIVER_BULGE: f32 = 0.15;
const LAKE_MIN_INLAND: u32 = 8;
const LAKE_RADIUS: i32 = 2;
const LAKE_EDGE_EROSION: f32 = 0.35;

/// Generate the island for a config. Deterministic per seed.
#[must_use]
pub fn generate_world(config: &WorldConfig) -> World {
    let scores = coastline_scores(config);
    let (mut tiles, water_level) = assign_water_and_sand(config, &scores);
    let moisture = assign_biomes(config, &mut tiles);

    let sand_now = tiles.iter().filter(|t| **t == TileId::Sand).count();
    let mut carver = Carver::new(sand_now);
    carve_river(config, &mut tiles, &moisture, &mut carver);
    stamp_lake(config, &mut tiles, &moisture, &mut carver);
    compensate_shore(&mut tiles, &scores, carver.owed);
    limit_biome_regions(config, &mut tiles);

    debug!(
        seed = config.seed,
        carved = carver.owed,
        water = tiles.iter().filter(|t| t.is_water()).count(),
        "world generated"
    );

    World {
        width: config.width,
        height: config.height,
        tiles,
        water_level,
    }
}

/// Value noise on an integer lattice, smooth-interpolated.
fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = smoothstep(x - x0);
    let fy = smoothstep(y - y0);
    let xi = x0 as i32;
    let yi = y0 as i32;
    let v00 = hash2_unit(xi, yi, seed);
    let v10 = hash2_unit(xi + 1, yi, seed);
    let v01 = hash2_unit(xi, yi + 1, seed);
    let v11 = hash2_unit(xi + 1, yi + 1, seed);
    lerp(lerp(v00, v10, fx), lerp(v01, v11, fx), fy)
}

/// Fractal Brownian motion over [`value_noise`], normalized to `[0, 1)`.
fn fbm(x: f32, y: f32, seed: u32, octaves: u32) -> f32 {
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amp = 1.0;
    let mut freq = 1.0;
    for octave in 0..octaves {
        let octave_seed = seed.wrapping_add(octave.wrapping_mul(0x9E37_79B9));
        sum += value_noise(x * freq, y * freq, octave_seed) * amp;
        norm += amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    sum / norm
}

fn field_seed(config: &WorldConfig, salt: u32) -> u32 {
    hash_u32(config.seed.wrapping_add(salt))
}

/// Stage 1: domain-warped distance-to-edge score per tile. Low scores hug
/// the map border; high scores sit deep inland.
fn coastline_scores(config: &WorldConfig) -> Vec<f32> {
    let warp_x_seed = field_seed(config, SALT_WARP_X);
    let warp_y_seed = field_seed(config, SALT_WARP_Y);
    let detail_seed = field_seed(config, SALT_COAST_DETAIL);
    let max_x = (config.width - 1).max(1) as f32;
    let max_y = (config.height - 1).max(1) as f32;

    let mut scores = Vec::with_capacity(config.total_tiles());
    for y in 0..config.height {
        for x in 0..config.width {
            let fx = x as f32;
            let fy = y as f32;
            let warp_x = fbm(fx * WARP_FREQ, fy * WARP_FREQ, warp_x_seed, 3) * 2.0 - 1.0;
            let warp_y = fbm(fx * WARP_FREQ, fy * WARP_FREQ, warp_y_seed, 3) * 2.0 - 1.0;
            let px = ((fx + warp_x * WARP_AMP) / max_x).clamp(0.0, 1.0);
            let py = ((fy + warp_y * WARP_AMP) / max_y).clamp(0.0, 1.0);
            let edge_x = px.min(1.0 - px) * 2.0;
            let edge_y = py.min(1.0 - py) * 2.0;
            let base = edge_x.min(edge_y);
            let detail = fbm(
                fx * COAST_DETAIL_FREQ,
                fy * COAST_DETAIL_FREQ,
                detail_seed,
                2,
            );
            scores.push(base * 0.85 + detail * 0.15);
        }
    }
    scores
}

/// Stage 2: sort tiles by coastline score and hand out exact water and sand
/// counts. Returns the tiles and the score at the waterline.
fn assign_water_and_sand(config: &WorldConfig, scores: &[f32]) -> (Vec<TileId>, f32) {
    let total = config.total_tiles();
    let n_water = config.water_tiles().min(total);
    let n_sand = config.sand_tiles().min(total - n_water);

    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]).then(a.cmp(b)));

    let mut tiles = vec![TileId::Grass; total];
    for idx in &order[..n_water] {
        tiles[*idx] = TileId::Water;
    }
    for idx in &order[n_water..n_water + n_sand] {
        tiles[*idx] = TileId::Sand;
    }

    let water_level = if n_water > 0 {
        scores[order[n_water - 1]]
    } else {
        0.0
    };
    (tiles, water_level)
}

/// Stage 3: moisture field, per-biome affinity fields, greedy exact-count
/// biome assignment, and the leftover micro-pattern. Returns the moisture
/// field for the river and lake stages.
fn assign_biomes(config: &WorldConfig, tiles: &mut [TileId]) -> Vec<f32> {
    let width = config.width as i32;
    let moisture_seed = field_seed(config, SALT_MOISTURE);
    let moisture_detail_seed = field_seed(config, SALT_MOISTURE_DETAIL);
    let micro_seed = field_seed(config, SALT_MICRO);

    let mut moisture = Vec::with_capacity(tiles.len());
    for (i, _) in tiles.iter().enumerate() {
        let x = (i as i32 % width) as f32;
        let y = (i as i32 / width) as f32;
        let broad = fbm(x * MOISTURE_FREQ, y * MOISTURE_FREQ, moisture_seed, 4);
        let detail = fbm(
            x * MOISTURE_DETAIL_FREQ,
            y * MOISTURE_DETAIL_FREQ,
            moisture_detail_seed,
            2,
        );
        moisture.push(broad * 0.8 + detail * 0.2);
    }

    // Only land still grass is open to biomes; the sand ring handed out by
    // the coastline pass stays put for the carving stages.
    let open: Vec<usize> = tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == TileId::Grass)
        .map(|(i, _)| i)
        .collect();
    let mut assigned = vec![false; tiles.len()];

    for (slot, (biome, ratio)) in BIOME_TARGETS.iter().enumerate() {
        let target = ((open.len() as f64) * f64::from(*ratio) + 0.5).floor() as usize;
        let biome_seed = field_seed(config, SALT_BIOME_BASE + slot as u32);
        let mut candidates: Vec<(f32, usize)> = open
            .iter()
            .filter(|i| !assigned[**i])
            .map(|&i| {
                let x = (i as i32 % width) as f32;
                let y = (i as i32 / width) as f32;
                let noise = fbm(x * BIOME_FREQ, y * BIOME_FREQ, biome_seed, 3);
                let affinity = match biome {
                    TileId::Desert => noise * 0.6 + (1.0 - moisture[i]) * 0.4,
                    TileId::Forest => noise * 0.5 + moisture[i] * 0.5,
                    TileId::Meadow => noise * 0.4 + moisture[i] * 0.6,
                    _ => noise,
                };
                (affinity, i)
            })
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        for (_, i) in candidates.into_iter().take(target) {
            tiles[i] = *biome;
            assigned[i] = true;
        }
    }

    // Leftover land: hashed micro-pattern of grass with dirt and rock specks.
    for &i in &open {
        if assigned[i] {
            continue;
        }
        let x = i as i32 % width;
        let y = i as i32 / width;
        let h = hash2_unit(x, y, micro_seed);
        tiles[i] = if h < 0.78 {
            TileId::Grass
        } else if h < 0.90 {
            TileId::Dirt
        } else {
            TileId::Rock
        };
    }

    moisture
}

/// Carving bookkeeping for the river and lake stages.
///
/// Every land tile turned to water must later be balanced by converting a
/// sand tile to grass, except when the carved tile *was* sand (the
/// water + sand total is already preserved then). `room` caps total carving
/// so the compensation pool can never run dry; `owed` counts the sand
/// conversions compensation must perform.
struct Carver {
    room: usize,
    owed: usize,
}

impl Carver {
    fn new(sand_available: usize) -> Self {
        Self {
            room: sand_available,
            owed: 0,
        }
    }

    /// Turn a land tile to water if there is room left. Returns whether the
    /// tile changed.
    fn carve(&mut self, tiles: &mut [TileId], i: usize) -> bool {
        if self.room == 0 || !tiles[i].is_land() {
            return false;
        }
        if tiles[i] != TileId::Sand {
            self.owed += 1;
        }
        tiles[i] = TileId::Water;
        self.room -= 1;
        true
    }
}

/// Grid BFS distance from the nearest water tile.
fn coast_distance(tiles: &[TileId], width: u32, height: u32) -> Vec<u32> {
    let mut dist = vec![u32::MAX; tiles.len()];
    let mut queue = VecDeque::new();
    for (i, tile) in tiles.iter().enumerate() {
        if tile.is_water() {
            dist[i] = 0;
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        for (nx, ny) in neighbors4(x, y, width, height) {
            let n = (ny * width + nx) as usize;
            if dist[n] == u32::MAX {
                dist[n] = dist[i] + 1;
                queue.push_back(n);
            }
        }
    }
    dist
}

fn neighbors4(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let candidates = [
        (x.wrapping_sub(1), y),
        (x + 1, y),
        (x, y.wrapping_sub(1)),
        (x, y + 1),
    ];
    candidates
        .into_iter()
        .filter(move |(nx, ny)| *nx < width && *ny < height)
}

/// Stage 4: carve a river from an inland moisture peak downhill to the
/// coast.
fn carve_river(config: &WorldConfig, tiles: &mut [TileId], moisture: &[f32], carver: &mut Carver) {
    let width = config.width;
    let height = config.height;
    let dist = coast_distance(tiles, width, height);

    let source = tiles
        .iter()
        .enumerate()
        .filter(|(i, t)| t.is_land() && dist[*i] >= RIVER_MIN_INLAND)
        .max_by(|(a, _), (b, _)| moisture[*a].total_cmp(&moisture[*b]).then(b.cmp(a)))
        .map(|(i, _)| i);
    let Some(source) = source else {
        // Small or flat worlds may have no sufficiently inland tile.
        return;
    };

    let mut rng = Mulberry32::new(field_seed(config, SALT_RIVER));
    let mut current = source;
    for _ in 0..RIVER_MAX_LEN {
        carver.carve(tiles, current);
        if dist[current] <= RIVER_MOUTH_DIST {
            break;
        }

        let x = (current as u32) % width;
        let y = (current as u32) / width;
        let mut next_options: Vec<(u32, usize)> = neighbors4(x, y, width, height)
            .map(|(nx, ny)| {
                let n = (ny * width + nx) as usize;
                (dist[n], n)
            })
            .collect();
        next_options.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let Some(&(_, best)) = next_options.first() else {
            break;
        };
        let next = if next_options.len() > 1 && rng.chance(RIVER_JITTER) {
            next_options[1].1
        } else {
            best
        };

        // Occasional one-tile bulge widens the channel.
        if rng.chance(RIVER_BULGE) {
            let sides: Vec<usize> = neighbors4(x, y, width, height)
                .map(|(nx, ny)| (ny * width + nx) as usize)
                .filter(|n| tiles[*n].is_land())
                .collect();
            if let Some(&bulge) = rng.pick(&sides) {
                carver.carve(tiles, bulge);
            }
        }
        current = next;
    }
    debug!(owed = carver.owed, "river carved");
}

/// Stage 5: stamp a diamond lake at the wettest inland point, eroding its
/// rim.
fn stamp_lake(config: &WorldConfig, tiles: &mut [TileId], moisture: &[f32], carver: &mut Carver) {
    let width = config.width;
    let height = config.height;
    let dist = coast_distance(tiles, width, height);

    let center = tiles
        .iter()
        .enumerate()
        .filter(|(i, t)| t.is_land() && dist[*i] >= LAKE_MIN_INLAND)
        .max_by(|(a, _), (b, _)| moisture[*a].total_cmp(&moisture[*b]).then(b.cmp(a)))
        .map(|(i, _)| i);
    let Some(center) = center else {
        return;
    };

    let cx = (center as u32 % width) as i32;
    let cy = (center as u32 / width) as i32;
    let mut rng = Mulberry32::new(field_seed(config, SALT_LAKE));
    for dy in -LAKE_RADIUS..=LAKE_RADIUS {
        for dx in -LAKE_RADIUS..=LAKE_RADIUS {
            let ring = dx.abs() + dy.abs();
            if ring > LAKE_RADIUS {
                continue;
            }
            if ring == LAKE_RADIUS && rng.chance(LAKE_EDGE_EROSION) {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                continue;
            }
            let i = (y as u32 * width + x as u32) as usize;
            carver.carve(tiles, i);
        }
    }
    debug!(owed = carver.owed, "lake stamped");
}

/// Stage 6: convert one sand tile (most inland first) to grass per owed
/// carve, keeping the exact water + sand total.
fn compensate_shore(tiles: &mut [TileId], scores: &[f32], owed: usize) {
    if owed == 0 {
        return;
    }
    let mut sand: Vec<usize> = tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == TileId::Sand)
        .map(|(i, _)| i)
        .collect();
    sand.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]).then(a.cmp(b)));
    for i in sand.into_iter().take(owed) {
        tiles[i] = TileId::Grass;
    }
}

/// Stage 7: cap the number of disjoint regions per constrained biome; the
/// smallest excess regions dissolve into meadow.
fn limit_biome_regions(config: &WorldConfig, tiles: &mut [TileId]) {
    let width = config.width;
    let height = config.height;
    for (biome, cap) in REGION_LIMITS {
        let mut regions: Vec<Vec<usize>> = Vec::new();
        let mut visited = vec![false; tiles.len()];
        for start in 0..tiles.len() {
            if visited[start] || tiles[start] != biome {
                continue;
            }
            let mut region = Vec::new();
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(i) = queue.pop_front() {
                region.push(i);
                let x = (i as u32) % width;
                let y = (i as u32) / width;
                for (nx, ny) in neighbors4(x, y, width, height) {
                    let n = (ny * width + nx) as usize;
                    if !visited[n] && tiles[n] == biome {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
            regions.push(region);
        }
        if regions.len() <= cap {
            continue;
        }
        // Keep the largest regions; tie toward the earliest in scan order.
        regions.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
        for region in regions.into_iter().skip(cap) {
            for i in region {
                tiles[i] = TileId::Meadow;
            }
        }
        debug!(?biome, cap, "biome regions limited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_regions(world: &World, biome: TileId) -> usize {
        let mut visited = vec![false; world.tiles.len()];
        let mut regions = 0;
        for start in 0..world.tiles.len() {
            if visited[start] || world.tiles[start] != biome {
                continue;
            }
            regions += 1;
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(i) = queue.pop_front() {
                let x = (i as u32) % world.width;
                let y = (i as u32) / world.width;
                for (nx, ny) in neighbors4(x, y, world.width, world.height) {
                    let n = (ny * world.width + nx) as usize;
                    if !visited[n] && world.tiles[n] == biome {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        regions
    }

    #[test]
    fn test_determinism() {
        let config = WorldConfig::default().with_seed(42);
        let a = generate_world(&config);
        let b = generate_world(&config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeds_produce_different_worlds() {
        let a = generate_world(&WorldConfig::default().with_seed(1));
        let b = generate_world(&WorldConfig::default().with_seed(2));
        assert_ne!(a.tiles, b.tiles);
    }

    #[test]
    fn test_exact_water_and_sand_total() {
        for seed in [1, 7, 42, 99, 123_456_789] {
            let config = WorldConfig::default().with_seed(seed);
            let world = generate_world(&config);
            let water = world.count(TileId::Water);
            let sand = world.count(TileId::Sand);
            assert_eq!(
                water + sand,
                config.water_tiles() + config.sand_tiles(),
                "seed {seed}"
            );
            // Carving only ever grows water at sand's expense.
            assert!(water >= config.water_tiles(), "seed {seed}");
        }
    }

    #[test]
    fn test_region_limits_hold() {
        for seed in [3, 42, 777, 31_337] {
            let world = generate_world(&WorldConfig::default().with_seed(seed));
            for (biome, cap) in REGION_LIMITS {
                assert!(
                    count_regions(&world, biome) <= cap,
                    "seed {seed}, biome {biome:?}"
                );
            }
        }
    }

    #[test]
    fn test_river_reaches_past_the_beach() {
        // With default ratios an inland source always exists, so carving
        // must have happened: water exceeds the sorted assignment count.
        let config = WorldConfig::default().with_seed(42);
        let world = generate_world(&config);
        assert!(world.count(TileId::Water) > config.water_tiles());
    }

    #[test]
    fn test_beach_survives_biome_assignment() {
        // Sand belongs to the coastline pass; biomes and the micro-pattern
        // claim open grass only. Carving and shore compensation may shrink
        // the ring but never empty it.
        for seed in [1, 7, 42, 99] {
            let config = WorldConfig::default().with_seed(seed);
            let world = generate_world(&config);
            let sand = world.count(TileId::Sand);
            assert!(sand > 0, "seed {seed}");
            assert!(sand <= config.sand_tiles(), "seed {seed}");
        }
    }

    #[test]
    fn test_land_anchor_exists_and_is_land() {
        for seed in [5, 42, 1000] {
            let world = generate_world(&WorldConfig::default().with_seed(seed));
            let anchor = world.land_anchor().expect("island should have land");
            assert!(world.is_buildable(anchor.x, anchor.y), "seed {seed}");
        }
    }

    #[test]
    fn test_small_world_generates() {
        let config = WorldConfig::default().with_size(24, 16).with_seed(9);
        let world = generate_world(&config);
        assert_eq!(world.tiles.len(), 24 * 16);
        let water = world.count(TileId::Water);
        let sand = world.count(TileId::Sand);
        assert_eq!(water + sand, config.water_tiles() + config.sand_tiles());
    }

    #[test]
    fn test_fbm_is_bounded() {
        let seed = hash_u32(77);
        for i in 0..200 {
            let v = fbm(i as f32 * 0.37, i as f32 * 0.73, seed, 4);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
