//! Column streaming of a wide level into the hardware background ring.
//!
//! The background surface holds `ring_width` columns; level column `c` lives
//! in ring column `c % ring_width`. Columns are streamed strictly left to
//! right, one per tick at most, ahead of the camera's right edge. Once the
//! ring has wrapped, the oldest resident column is `streamed - ring_width`,
//! and [`BackgroundStreamer::min_world_x`] gives the leftmost player X that
//! keeps the camera from exposing anything older.

use meadow_core::video::TILE_SIZE;
use meadow_core::VideoOutput;

use crate::config::StreamConfig;
use crate::level::Level;

#[derive(Debug, Clone)]
pub struct BackgroundStreamer {
    /// Number of level columns written so far; also the next column to write.
    streamed: u16,
    config: StreamConfig,
    scroll_left: i32,
}

impl BackgroundStreamer {
    /// `scroll_left` is the player's left scroll threshold in screen pixels.
    pub fn new(config: StreamConfig, scroll_left: i32) -> Self {
        Self {
            streamed: 0,
            config,
            scroll_left,
        }
    }

    /// Fill the ring with the level's first columns.
    pub fn prime(&mut self, level: &Level, video: &mut dyn VideoOutput) {
        let count = self.config.ring_width.min(level.map.width() as u16);
        for col in 0..count {
            self.stream_column(col, level, video);
        }
        self.streamed = count;
        log::debug!("Primed {count} background columns");
    }

    /// Stream the next column if the camera's look-ahead column has reached
    /// it. Returns the level column written, if any.
    pub fn update(
        &mut self,
        camera_x: i32,
        level: &Level,
        video: &mut dyn VideoOutput,
    ) -> Option<u16> {
        let needed = camera_x.div_euclid(TILE_SIZE) + i32::from(self.config.lookahead_cols);
        if needed >= level.map.width() as i32 || needed < i32::from(self.streamed) {
            return None;
        }
        let col = self.streamed;
        self.stream_column(col, level, video);
        self.streamed += 1;
        log::trace!(
            "Streamed level column {col} into ring column {}",
            col % self.config.ring_width
        );
        Some(col)
    }

    /// Copy every row of level column `col`, tiles and attributes, into its
    /// ring column.
    pub fn stream_column(&self, col: u16, level: &Level, video: &mut dyn VideoOutput) {
        let ring_col = (col % self.config.ring_width) as u8;
        for row in 0..level.map.height() {
            let (c, r) = (i32::from(col), row as i32);
            video.set_bkg_tile(ring_col, row as u8, level.map.tile(c, r));
            video.set_bkg_attr(ring_col, row as u8, level.attributes.tile(c, r));
        }
    }

    /// Leftmost world X the player may occupy without the camera reaching a
    /// ring column that has been overwritten.
    pub fn min_world_x(&self) -> i32 {
        let ring = self.config.ring_width;
        if self.streamed > ring {
            i32::from(self.streamed - ring) * TILE_SIZE + self.scroll_left
        } else {
            self.config.min_world_x
        }
    }

    pub fn streamed(&self) -> u16 {
        self.streamed
    }

    /// True if the ring slot for level column `col` still holds that column.
    pub fn is_column_resident(&self, col: u16) -> bool {
        col < self.streamed && col + self.config.ring_width >= self.streamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::config::PlayerConfig;
    use crate::player::{Player, PlayerInput};
    use crate::pool::SpritePool;
    use crate::tilemap::{TileMap, TileSet};
    use meadow_core::{Buttons, ShadowVram};

    /// Flat ground whose sky tiles encode their column, so stale ring
    /// slots are detectable.
    fn marked_level() -> Level {
        let map = TileMap::from_fn(48, 18, |col, row| if row >= 10 { 200 } else { col as u8 + 1 });
        let attributes = TileMap::from_fn(48, 18, |col, _| (col % 8) as u8);
        let ground = TileSet::from_ids(&[200]);
        Level::new(map, attributes, ground, ground).expect("valid level")
    }

    fn streamer() -> BackgroundStreamer {
        BackgroundStreamer::new(StreamConfig::default(), 60)
    }

    #[test]
    fn prime_fills_ring_from_column_zero() {
        let level = marked_level();
        let mut vram = ShadowVram::new();
        let mut streamer = streamer();
        streamer.prime(&level, &mut vram);

        assert_eq!(streamer.streamed(), 32);
        assert_eq!(vram.bkg_tile(0, 0), 1);
        assert_eq!(vram.bkg_tile(31, 3), 32);
        assert_eq!(vram.bkg_attr(31, 3), 7);
        assert_eq!(vram.bkg_tile(31, 12), 200);
        assert_eq!(streamer.min_world_x(), 8);
    }

    #[test]
    fn streams_when_lookahead_reaches_frontier() {
        let level = marked_level();
        let mut vram = ShadowVram::new();
        let mut streamer = streamer();
        streamer.prime(&level, &mut vram);

        assert_eq!(streamer.update(87, &level, &mut vram), None);
        assert_eq!(streamer.update(88, &level, &mut vram), Some(32));
        assert_eq!(vram.bkg_tile(0, 0), 33);
        assert_eq!(streamer.update(88, &level, &mut vram), None);
        assert_eq!(streamer.min_world_x(), 8 + 60);
        assert!(!streamer.is_column_resident(0));
        assert!(streamer.is_column_resident(1));
        assert!(streamer.is_column_resident(32));
        assert!(!streamer.is_column_resident(33));
    }

    #[test]
    fn never_streams_past_level_end() {
        let level = marked_level();
        let mut vram = ShadowVram::new();
        let mut streamer = streamer();
        streamer.prime(&level, &mut vram);
        for camera_x in (0..=224).chain(std::iter::repeat(224).take(50)) {
            streamer.update(camera_x, &level, &mut vram);
        }
        assert_eq!(streamer.streamed(), 48);
        assert_eq!(vram.bkg_tile(47 % 32, 0), 48);
    }

    #[test]
    fn min_world_x_tracks_streamed_columns() {
        let level = marked_level();
        let mut vram = ShadowVram::new();
        let mut streamer = streamer();
        streamer.prime(&level, &mut vram);
        let mut camera_x = 0;
        while streamer.streamed() < 48 {
            camera_x += 1;
            streamer.update(camera_x, &level, &mut vram);
            let s = i32::from(streamer.streamed());
            if s > 32 {
                assert!(streamer.min_world_x() >= (s - 32) * 8 + 60);
            }
        }
    }

    #[test]
    fn visible_columns_are_always_current() {
        let level = marked_level();
        let mut vram = ShadowVram::new();
        let mut pool = SpritePool::new();
        let mut camera = Camera::for_map(&level.map);
        let mut streamer = streamer();
        streamer.prime(&level, &mut vram);
        let mut player =
            Player::spawn(&mut pool, &PlayerConfig::default(), &mut vram).expect("spawn player");

        let script = [(Buttons::RIGHT, 420), (Buttons::LEFT, 420), (Buttons::RIGHT, 60)];
        for (held, ticks) in script {
            for _ in 0..ticks {
                let min_world_x = streamer.min_world_x();
                let input = PlayerInput {
                    held,
                    pressed: Buttons::empty(),
                    min_world_x,
                };
                player.update(input, &mut pool, &mut camera, &level, &mut vram);
                streamer.update(camera.x(), &level, &mut vram);

                let (x, _) = player.position(&pool).expect("player alive");
                assert!(x >= min_world_x, "player x {x} below bound {min_world_x}");

                let first = camera.x() / 8;
                let last = ((camera.x() + 159) / 8).min(47);
                for col in first..=last {
                    assert!(
                        streamer.is_column_resident(col as u16),
                        "column {col} not resident at camera {}",
                        camera.x()
                    );
                    for row in 0..18 {
                        let shown = vram.bkg_tile((col % 32) as u8, row as u8);
                        assert_eq!(shown, level.map.tile(col, row));
                    }
                }
            }
        }
        assert_eq!(streamer.streamed(), 48);
        assert_eq!(streamer.min_world_x(), 16 * 8 + 60);
    }
}
