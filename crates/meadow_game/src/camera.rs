use meadow_core::video::{SCREEN_COLS, TILE_SIZE};

use crate::tilemap::TileMap;

/// Horizontal scroll position in world pixels, always within `0..=max_x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    x: i32,
    max_x: i32,
}

impl Camera {
    pub fn new(max_x: i32) -> Self {
        Self {
            x: 0,
            max_x: max_x.max(0),
        }
    }

    /// Camera for a map shown `SCREEN_COLS` tiles at a time.
    pub fn for_map(map: &TileMap) -> Self {
        let visible = i32::from(SCREEN_COLS);
        Self::new((map.width() as i32 - visible) * TILE_SIZE)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    pub fn set(&mut self, x: i32) {
        self.x = x.clamp(0, self.max_x);
    }

    pub fn nudge(&mut self, dx: i32) {
        self.set(self.x + dx);
    }

    pub fn to_screen_x(&self, world_x: i32) -> i32 {
        world_x - self.x
    }

    /// Value for the horizontal scroll register. The hardware background
    /// wraps every 256 pixels, matching the ring layout.
    pub fn scroll_register(&self) -> u8 {
        self.x.rem_euclid(256) as u8
    }
}
