//! ASCII map rendering for terminal review.
//!
//! Renders the world grid with buildings, villagers, and animals overlaid,
//! one character per tile. Stdout-friendly: plain characters by default in
//! tests, ANSI colors for humans.

use village_core::buildings::BuildingKind;
use village_core::state::GameState;
use village_core::villagers::AnimalBehavior;
use village_core::world::TileId;

/// Rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Use colored output (ANSI).
    pub use_color: bool,
    /// Append a legend under the map.
    pub show_legend: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_legend: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";

    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
    pub const WHITE: &str = "\x1b[37m";

    pub const BOLD_GREEN: &str = "\x1b[1;32m";
    pub const BOLD_YELLOW: &str = "\x1b[1;33m";
    pub const BOLD_RED: &str = "\x1b[1;31m";
    pub const BOLD_WHITE: &str = "\x1b[1;37m";
    pub const BOLD_CYAN: &str = "\x1b[1;36m";
    pub const BOLD_GRAY: &str = "\x1b[1;90m";
}

/// Character and color for a terrain tile.
fn tile_glyph(tile: TileId) -> (char, &'static str) {
    match tile {
        TileId::Water => ('~', colors::BLUE),
        TileId::Sand => ('.', colors::YELLOW),
        TileId::Grass => (',', colors::GREEN),
        TileId::Dirt => (':', colors::GRAY),
        TileId::Rock => ('^', colors::GRAY),
        TileId::Forest => ('t', colors::GREEN),
        TileId::Meadow => ('"', colors::CYAN),
        TileId::Desert => ('%', colors::BOLD_YELLOW),
        TileId::Mountain => ('A', colors::WHITE),
    }
}

/// Character and color for a building overlay.
fn building_glyph(kind: BuildingKind) -> (char, &'static str) {
    match kind {
        BuildingKind::Campfire => ('*', colors::BOLD_RED),
        BuildingKind::SleepHut => ('H', colors::BOLD_WHITE),
        BuildingKind::GatherHut => ('G', colors::BOLD_WHITE),
        BuildingKind::Sawmill => ('S', colors::BOLD_WHITE),
        BuildingKind::Townhall => ('#', colors::BOLD_WHITE),
        BuildingKind::Tree => ('T', colors::BOLD_GREEN),
        BuildingKind::Rock => ('o', colors::BOLD_GRAY),
        BuildingKind::BerryBush => ('b', colors::RED),
        BuildingKind::Mushroom => ('m', colors::BOLD_CYAN),
    }
}

/// Render the world and everything on it as ASCII art.
#[must_use]
pub fn render_map(state: &GameState, config: &AsciiConfig) -> String {
    let width = state.world.width as usize;
    let height = state.world.height as usize;
    let mut grid: Vec<Vec<(char, &'static str)>> = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    state
                        .world
                        .tile(x as u32, y as u32)
                        .map_or((' ', colors::RESET), tile_glyph)
                })
                .collect()
        })
        .collect();

    // Overlays, lowest priority first: buildings, animals, villagers.
    for building in state.buildings.values() {
        let glyph = building_glyph(building.kind);
        let (w, h) = building.footprint();
        for dy in 0..h {
            for dx in 0..w {
                let (x, y) = ((building.pos.x + dx) as usize, (building.pos.y + dy) as usize);
                if y < height && x < width {
                    grid[y][x] = glyph;
                }
            }
        }
    }

    for animal in state.animals.values() {
        if matches!(animal.behavior, AnimalBehavior::Dead) {
            continue;
        }
        let (x, y) = animal.pos.to_tile();
        if (y as usize) < height && (x as usize) < width {
            grid[y as usize][x as usize] = ('d', colors::CYAN);
        }
    }

    for villager in state.living_villagers() {
        let (x, y) = villager.pos.to_tile();
        if (y as usize) < height && (x as usize) < width {
            grid[y as usize][x as usize] = ('@', colors::BOLD_YELLOW);
        }
    }

    let mut output = String::with_capacity((width + 1) * (height + 3));
    output.push_str(&format!(
        "day {} {} | seed {} | {}x{}\n",
        state.time.day,
        state.time.phase.name(),
        state.config.world.seed,
        state.world.width,
        state.world.height,
    ));

    for row in &grid {
        for &(ch, color) in row {
            if config.use_color {
                output.push_str(color);
                output.push(ch);
                output.push_str(colors::RESET);
            } else {
                output.push(ch);
            }
        }
        output.push('\n');
    }

    if config.show_legend {
        output.push_str("~ water  . sand  , grass  : dirt  ^ rock  t forest  \" meadow  % desert  A mountain\n");
        output.push_str("* campfire  H sleep hut  G gather hut  S sawmill  # townhall  T tree  o rock  b bush  m mushroom  @ villager  d dog\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_core::simulation::create_game_with_config;
    use village_core::state::GameConfig;

    fn small_state(seed: u32) -> GameState {
        let mut config = GameConfig::default().with_seed(seed);
        config.world.width = 48;
        config.world.height = 32;
        create_game_with_config(config)
    }

    fn plain() -> AsciiConfig {
        AsciiConfig {
            use_color: false,
            show_legend: false,
        }
    }

    #[test]
    fn test_render_has_one_line_per_tile_row_plus_header() {
        let state = small_state(3);
        let art = render_map(&state, &plain());
        assert_eq!(art.lines().count(), 32 + 1);
        // every map row is exactly the world width
        for line in art.lines().skip(1) {
            assert_eq!(line.chars().count(), 48);
        }
    }

    #[test]
    fn test_plain_render_carries_no_ansi_codes() {
        let state = small_state(3);
        let art = render_map(&state, &plain());
        assert!(!art.contains('\x1b'));
    }

    #[test]
    fn test_villagers_and_buildings_show_up() {
        let mut state = small_state(3);
        let spot = crate::runner::find_spot(&state, BuildingKind::Campfire)
            .expect("default world keeps buildable land");
        state = village_core::commands::place_building(state, BuildingKind::Campfire, spot);
        let art = render_map(&state, &plain());
        assert!(art.contains('@'), "five starting villagers should render");
        assert!(art.contains('*'), "the placed campfire should render");
    }

    #[test]
    fn test_colored_render_resets_after_each_tile() {
        let state = small_state(3);
        let config = AsciiConfig {
            use_color: true,
            show_legend: false,
        };
        let art = render_map(&state, &config);
        assert!(art.contains(colors::RESET));
        assert!(art.contains(colors::BLUE) || art.contains(colors::GREEN));
    }

    #[test]
    fn test_legend_lines_are_appended() {
        let state = small_state(3);
        let config = AsciiConfig {
            use_color: false,
            show_legend: true,
        };
        let art = render_map(&state, &config);
        assert_eq!(art.lines().count(), 32 + 3);
    }
}
