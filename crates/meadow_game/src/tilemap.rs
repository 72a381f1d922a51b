//! Row-major tile grid and the tile-overlap queries the controllers use for
//! walls, floors and pit edges.
//!
//! Everything outside the grid reads as [`EMPTY_TILE`]. Queries never fail.

use meadow_core::video::TILE_SIZE;

use crate::collision::Aabb;
use crate::sprite::Sprite;

/// Tile id reported for any coordinate outside the map.
pub const EMPTY_TILE: u8 = 0;

/// A set of tile ids, e.g. "solid" or "landable from above".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileSet {
    bits: [u64; 4],
}

impl TileSet {
    pub fn from_ids(ids: &[u8]) -> Self {
        ids.iter().copied().collect()
    }

    pub fn insert(&mut self, id: u8) {
        self.bits[usize::from(id >> 6)] |= 1 << (id & 63);
    }

    pub fn contains(&self, id: u8) -> bool {
        self.bits[usize::from(id >> 6)] & (1 << (id & 63)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }
}

impl FromIterator<u8> for TileSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = TileSet::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<u8>,
}

impl TileMap {
    pub fn new(width: usize, height: usize, tiles: Vec<u8>) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("Tile map width and height must be > 0".to_string());
        }
        if tiles.len() != width * height {
            return Err(format!(
                "Tile map expects {} tiles ({}x{}), got {}",
                width * height,
                width,
                height,
                tiles.len()
            ));
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Build a map by evaluating `tile(col, row)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut tile: impl FnMut(usize, usize) -> u8) -> Self {
        let tiles = (0..height)
            .flat_map(|row| (0..width).map(move |col| (col, row)))
            .map(|(col, row)| tile(col, row))
            .collect();
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Map width in world pixels.
    pub fn width_px(&self) -> i32 {
        self.width as i32 * TILE_SIZE
    }

    pub fn tile(&self, col: i32, row: i32) -> u8 {
        if col < 0 || row < 0 {
            return EMPTY_TILE;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.width || row >= self.height {
            return EMPTY_TILE;
        }
        self.tiles[row * self.width + col]
    }

    /// Tile under world pixel column `world_x` on tile row `row`.
    pub fn tile_at(&self, world_x: i32, row: i32) -> u8 {
        self.tile(world_x.div_euclid(TILE_SIZE), row)
    }

    /// True if any tile covered by `rect` belongs to `set`. The covered
    /// column and row ranges are clamped to the map first, so a rectangle
    /// lying wholly outside the map touches nothing.
    pub fn rect_collision(&self, rect: Aabb, set: &TileSet) -> bool {
        if rect.is_empty() || set.is_empty() {
            return false;
        }

        let first_col = rect.x.div_euclid(TILE_SIZE).max(0);
        let last_col = (rect.right() - 1)
            .div_euclid(TILE_SIZE)
            .min(self.width as i32 - 1);
        let first_row = rect.y.div_euclid(TILE_SIZE).max(0);
        let last_row = (rect.bottom() - 1)
            .div_euclid(TILE_SIZE)
            .min(self.height as i32 - 1);

        (first_row..=last_row)
            .any(|row| (first_col..=last_col).any(|col| set.contains(self.tile(col, row))))
    }

    /// Tile overlap for `sprite` as if it stood at `world_x`.
    pub fn tile_collision(&self, sprite: &Sprite, world_x: i32, set: &TileSet) -> bool {
        self.tile_collision_at(sprite, world_x, sprite.y, set)
    }

    pub fn tile_collision_at(
        &self,
        sprite: &Sprite,
        world_x: i32,
        world_y: i32,
        set: &TileSet,
    ) -> bool {
        sprite.active && self.rect_collision(sprite.hitbox_rect_at(world_x, world_y), set)
    }
}
