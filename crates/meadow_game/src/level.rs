use meadow_core::video::BKG_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::tilemap::{TileMap, TileSet};

pub const MEADOW_WIDTH: usize = 48;
pub const MEADOW_HEIGHT: usize = 18;
/// Widest level whose column index fits a single byte.
pub const MAX_LEVEL_WIDTH: usize = 255;

const SKY: u8 = 0;
const CLOUD_TOP: [u8; 3] = [1, 2, 3];
const CLOUD_BOTTOM: [u8; 3] = [4, 5, 6];
const FOLIAGE_TOP: [u8; 2] = [7, 8];
const FOLIAGE_BOTTOM: [u8; 2] = [9, 10];
const TRUNK: u8 = 11;
const GRASS: u8 = 12;
const DIRT: u8 = 13;
const DEEP: u8 = 14;
const PLATFORM: u8 = 15;

const GROUND_ROW: usize = 10;
const PLATFORM_ROW: usize = 9;

/// (left column, right column) of each tree.
const TREES: [(usize, usize); 4] = [(4, 5), (17, 18), (31, 32), (44, 45)];
/// Inclusive column ranges with no ground at all.
const PITS: [(usize, usize); 3] = [(10, 12), (21, 24), (34, 38)];
const PLATFORM_COLS: [usize; 6] = [7, 15, 16, 27, 28, 42];
/// (top row, first column) of each 3x2 cloud.
const CLOUDS: [(usize, usize); 3] = [(2, 3), (1, 25), (1, 38)];

/// A playable level: tile grid, palette attributes, and the tile-id sets
/// that block motion and support landing.
#[derive(Debug, Clone)]
pub struct Level {
    pub map: TileMap,
    /// Per-tile background palette attribute, same layout as `map`.
    pub attributes: TileMap,
    pub solid: TileSet,
    pub landable: TileSet,
}

impl Level {
    /// Levels are streamed one full column at a time into the background
    /// surface, so every row must fit it.
    pub fn new(
        map: TileMap,
        attributes: TileMap,
        solid: TileSet,
        landable: TileSet,
    ) -> Result<Self, String> {
        check_shape(map.width(), map.height())?;
        if map.width() != attributes.width() || map.height() != attributes.height() {
            return Err(format!(
                "Attribute map is {}x{} but tile map is {}x{}",
                attributes.width(),
                attributes.height(),
                map.width(),
                map.height()
            ));
        }
        Ok(Self {
            map,
            attributes,
            solid,
            landable,
        })
    }

    /// The built-in 48x18 meadow with three pits and raised stone blocks.
    pub fn meadow() -> Self {
        let map = TileMap::from_fn(MEADOW_WIDTH, MEADOW_HEIGHT, meadow_tile);
        let attributes = TileMap::from_fn(MEADOW_WIDTH, MEADOW_HEIGHT, |col, row| {
            u8::from(meadow_tile(col, row) == PLATFORM || row >= GROUND_ROW)
        });
        let ground: TileSet = [GRASS, DIRT, DEEP, PLATFORM].into_iter().collect();
        Self {
            map,
            attributes,
            solid: ground,
            landable: ground,
        }
    }
}

fn meadow_tile(col: usize, row: usize) -> u8 {
    if PITS.iter().any(|&(first, last)| (first..=last).contains(&col)) {
        return SKY;
    }
    match row {
        14.. => return DEEP,
        11..=13 => return DIRT,
        GROUND_ROW => return GRASS,
        PLATFORM_ROW if PLATFORM_COLS.contains(&col) => return PLATFORM,
        _ => {}
    }
    for &(top, first) in &CLOUDS {
        if (first..first + 3).contains(&col) {
            if row == top {
                return CLOUD_TOP[col - first];
            }
            if row == top + 1 {
                return CLOUD_BOTTOM[col - first];
            }
        }
    }
    for &(left, right) in &TREES {
        let side = if col == left {
            0
        } else if col == right {
            1
        } else {
            continue;
        };
        match row {
            7 => return FOLIAGE_TOP[side],
            8 => return FOLIAGE_BOTTOM[side],
            PLATFORM_ROW => return TRUNK,
            _ => {}
        }
    }
    SKY
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<u8>,
    #[serde(default)]
    pub attributes: Option<Vec<u8>>,
    #[serde(default)]
    pub solid_tiles: Vec<u8>,
    #[serde(default)]
    pub landable_tiles: Vec<u8>,
}

impl LevelFile {
    pub fn into_level(self) -> Result<Level, String> {
        let attributes = self
            .attributes
            .unwrap_or_else(|| vec![0; self.width * self.height]);
        Level::new(
            TileMap::new(self.width, self.height, self.tiles)?,
            TileMap::new(self.width, self.height, attributes)?,
            TileSet::from_ids(&self.solid_tiles),
            TileSet::from_ids(&self.landable_tiles),
        )
    }
}

pub fn load_level_from_path(path: &Path) -> Result<Level, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level_file(&file)?;
    file.into_level()
}

fn check_shape(width: usize, height: usize) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err("Level validation failed: width and height must be > 0".to_string());
    }
    if width > MAX_LEVEL_WIDTH {
        return Err(format!(
            "Level validation failed: width {width} exceeds {MAX_LEVEL_WIDTH} columns"
        ));
    }
    if height > usize::from(BKG_SIZE) {
        return Err(format!(
            "Level validation failed: height {height} exceeds the {BKG_SIZE}-row surface"
        ));
    }
    Ok(())
}

fn validate_level_file(file: &LevelFile) -> Result<(), String> {
    check_shape(file.width, file.height)?;
    let cells = file.width * file.height;
    if file.tiles.len() != cells {
        return Err(format!(
            "Level validation failed: expected {cells} tiles, found {}",
            file.tiles.len()
        ));
    }
    if let Some(attributes) = &file.attributes {
        if attributes.len() != cells {
            return Err(format!(
                "Level validation failed: expected {cells} attributes, found {}",
                attributes.len()
            ));
        }
    }
    Ok(())
}
