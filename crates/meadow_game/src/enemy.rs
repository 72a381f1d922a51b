use meadow_core::{SpriteAttr, VideoOutput};

use crate::config::EnemyConfig;
use crate::level::Level;
use crate::pool::{PoolError, SpriteDesc, SpriteHandle, SpritePool};
use crate::sprite::Sprite;

pub const ENEMY_HW_SLOT: u8 = 2;
pub const ENEMY_TILES_PER_FRAME: u8 = 2;

/// Patrolling walker. Turns around at its patrol bounds, at walls, and
/// where the next step would leave the leading foot over a pit.
#[derive(Debug, Clone)]
pub struct Enemy {
    handle: SpriteHandle,
    direction: i32,
    idle: bool,
    config: EnemyConfig,
}

impl Enemy {
    pub fn spawn(
        pool: &mut SpritePool,
        config: &EnemyConfig,
        video: &mut dyn VideoOutput,
    ) -> Result<Self, PoolError> {
        let handle = pool.alloc(SpriteDesc {
            hw_slot: ENEMY_HW_SLOT,
            slot_count: 1,
            width: config.width,
            height: config.height,
            tile_base: config.tile_base,
            tiles_per_frame: ENEMY_TILES_PER_FRAME,
        })?;

        let enemy = Self {
            handle,
            direction: 1,
            idle: false,
            config: *config,
        };
        if let Some(sprite) = pool.get_mut(handle) {
            sprite.x = config.start_x;
            sprite.y = config.start_y;
            sprite.anim.restart(&config.walk);
            let tile = config
                .walk
                .tile_for(sprite.tile_base, sprite.tiles_per_frame, 0);
            video.set_sprite_tile(ENEMY_HW_SLOT, tile);
            video.set_sprite_attr(ENEMY_HW_SLOT, enemy.attr());
        }
        pool.update_hardware(handle, 0, 0, video);
        Ok(enemy)
    }

    pub fn update(
        &mut self,
        pool: &mut SpritePool,
        camera_x: i32,
        level: &Level,
        video: &mut dyn VideoOutput,
    ) {
        let Some(mut sprite) = pool.get(self.handle).copied() else {
            return;
        };
        let config = self.config;

        let next_x = sprite.x + self.direction * config.speed;
        if level.map.tile_collision(&sprite, next_x, &level.solid)
            || !self.has_ground_at(&sprite, next_x, level)
        {
            self.direction = -self.direction;
        } else {
            sprite.x = next_x;
        }

        if sprite.x >= config.patrol_right {
            self.direction = -1;
        }
        if sprite.x <= config.patrol_left {
            self.direction = 1;
        }

        let clip = if self.idle { &config.idle } else { &config.walk };
        let frame = sprite.anim.tick(clip);
        let tile = clip.tile_for(sprite.tile_base, sprite.tiles_per_frame, frame);
        video.set_sprite_tile(sprite.hw_slot, tile);
        video.set_sprite_attr(sprite.hw_slot, self.attr());

        if let Some(slot) = pool.get_mut(self.handle) {
            *slot = sprite;
        }

        let screen_x = sprite.x - camera_x;
        if screen_x < config.visible_min_x || screen_x > config.visible_max_x {
            video.move_sprite(sprite.hw_slot, 0, 0);
        } else {
            pool.update_hardware(self.handle, camera_x, 0, video);
        }
    }

    pub fn cleanup(&self, pool: &mut SpritePool, video: &mut dyn VideoOutput) {
        pool.free(Some(self.handle), video);
    }

    /// Switch between the idle and walk clips. Patrol movement continues.
    pub fn set_idle(&mut self, idle: bool, pool: &mut SpritePool) {
        if self.idle == idle {
            return;
        }
        self.idle = idle;
        let clip = if idle { self.config.idle } else { self.config.walk };
        if let Some(sprite) = pool.get_mut(self.handle) {
            sprite.anim.restart(&clip);
        }
    }

    pub fn handle(&self) -> SpriteHandle {
        self.handle
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn position(&self, pool: &SpritePool) -> Option<(i32, i32)> {
        pool.get(self.handle).map(|s| (s.x, s.y))
    }

    fn attr(&self) -> SpriteAttr {
        SpriteAttr::empty()
            .with_palette(self.config.palette)
            .with_flip_x(self.direction < 0)
    }

    fn has_ground_at(&self, sprite: &Sprite, next_x: i32, level: &Level) -> bool {
        let body = sprite.hitbox_rect_at(next_x, sprite.y);
        let foot_x = if self.direction > 0 {
            body.right() - 1
        } else {
            body.x
        };
        let row = body.bottom().div_euclid(meadow_core::video::TILE_SIZE);
        level.landable.contains(level.map.tile_at(foot_x, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::{TileMap, TileSet};
    use meadow_core::ShadowVram;

    const GROUND: u8 = 12;

    fn level_from(tile: impl FnMut(usize, usize) -> u8) -> Level {
        let map = TileMap::from_fn(48, 18, tile);
        let attributes = TileMap::from_fn(48, 18, |_, _| 0);
        let ground = TileSet::from_ids(&[GROUND]);
        Level::new(map, attributes, ground, ground).expect("valid level")
    }

    fn flat_level() -> Level {
        level_from(|_, row| if row >= 10 { GROUND } else { 0 })
    }

    fn spawn_at(x: i32, pool: &mut SpritePool, vram: &mut ShadowVram) -> Enemy {
        let config = EnemyConfig {
            start_x: x,
            ..EnemyConfig::default()
        };
        Enemy::spawn(pool, &config, vram).expect("spawn enemy")
    }

    fn x_of(enemy: &Enemy, pool: &SpritePool) -> i32 {
        enemy.position(pool).expect("enemy alive").0
    }

    #[test]
    fn patrol_turns_at_right_bound() {
        let level = flat_level();
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(80, &mut pool, &mut vram);

        for _ in 0..100 {
            enemy.update(&mut pool, 0, &level, &mut vram);
        }
        assert_eq!(x_of(&enemy, &pool), 180);
        assert_eq!(enemy.direction(), -1);

        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 179);
    }

    #[test]
    fn patrol_turns_at_left_bound() {
        let level = flat_level();
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(12, &mut pool, &mut vram);
        enemy.direction = -1;

        enemy.update(&mut pool, 0, &level, &mut vram);
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 10);
        assert_eq!(enemy.direction(), 1);
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 11);
    }

    #[test]
    fn pit_edge_reverses_without_moving() {
        let level = level_from(|col, row| if row >= 10 && col < 10 { GROUND } else { 0 });
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(70, &mut pool, &mut vram);

        enemy.update(&mut pool, 0, &level, &mut vram);
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 72);
        assert_eq!(enemy.direction(), 1);

        // Leading foot would land on column 10.
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 72);
        assert_eq!(enemy.direction(), -1);

        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 71);
    }

    #[test]
    fn wall_reverses_without_moving() {
        let level = level_from(|col, row| match row {
            10.. => GROUND,
            9 if col == 12 => GROUND,
            _ => 0,
        });
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(86, &mut pool, &mut vram);

        enemy.update(&mut pool, 0, &level, &mut vram);
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 88);
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(x_of(&enemy, &pool), 88);
        assert_eq!(enemy.direction(), -1);
    }

    #[test]
    fn facing_mirrors_travel_direction() {
        let level = flat_level();
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(179, &mut pool, &mut vram);

        enemy.update(&mut pool, 0, &level, &mut vram);
        let attr = vram.oam(ENEMY_HW_SLOT).expect("enemy slot").attr;
        assert!(attr.contains(SpriteAttr::FLIP_X));
        assert_eq!(attr.palette(), 1);
    }

    #[test]
    fn walk_animation_uses_enemy_tiles() {
        let level = flat_level();
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(40, &mut pool, &mut vram);
        assert_eq!(vram.oam(ENEMY_HW_SLOT).expect("slot").tile, 32);
        for _ in 0..8 {
            enemy.update(&mut pool, 0, &level, &mut vram);
        }
        assert_eq!(vram.oam(ENEMY_HW_SLOT).expect("slot").tile, 34);

        enemy.set_idle(true, &mut pool);
        enemy.update(&mut pool, 0, &level, &mut vram);
        assert_eq!(vram.oam(ENEMY_HW_SLOT).expect("slot").tile, 36);
    }

    #[test]
    fn off_screen_enemy_is_hidden() {
        let level = flat_level();
        let mut pool = SpritePool::new();
        let mut vram = ShadowVram::new();
        let mut enemy = spawn_at(100, &mut pool, &mut vram);

        enemy.update(&mut pool, 0, &level, &mut vram);
        let shown = vram.oam(ENEMY_HW_SLOT).expect("slot");
        assert_eq!((shown.x, shown.y), (109, 88));

        enemy.update(&mut pool, 120, &level, &mut vram);
        let hidden = vram.oam(ENEMY_HW_SLOT).expect("slot");
        assert_eq!((hidden.x, hidden.y), (0, 0));
        assert!(pool.get(enemy.handle()).is_some());
    }
}
