//! Player controller: walking, jumping, tile collision and camera follow.
//!
//! Vertical motion is swept one pixel at a time so the feet stop exactly on
//! the top edge of a landable tile and the head stops just under a solid one.
//! Gravity adds one unit of downward velocity every `gravity_delay` ticks,
//! which gives a stepped, slightly floaty fall.

use meadow_core::video::TILE_SIZE;
use meadow_core::{Buttons, SpriteAttr, VideoOutput};

use crate::camera::Camera;
use crate::collision::Aabb;
use crate::config::PlayerConfig;
use crate::level::Level;
use crate::pool::{PoolError, SpriteDesc, SpriteHandle, SpritePool};
use crate::sprite::Sprite;

pub const PLAYER_HW_SLOT: u8 = 0;
pub const PLAYER_TILES_PER_FRAME: u8 = 4;

bitflags::bitflags! {
    /// Things that happened during one player tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PlayerEvents: u8 {
        const JUMPED   = 0b01;
        const FELL_GAP = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Walk,
    Jump,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub held: Buttons,
    pub pressed: Buttons,
    /// Leftmost world X the player may walk to this tick.
    pub min_world_x: i32,
}

enum Vertical {
    Airborne,
    Landed,
    HitCeiling,
}

#[derive(Debug, Clone)]
pub struct Player {
    handle: SpriteHandle,
    state: PlayerState,
    velocity_y: i32,
    gravity_counter: u8,
    facing_right: bool,
    config: PlayerConfig,
}

impl Player {
    pub fn spawn(
        pool: &mut SpritePool,
        config: &PlayerConfig,
        video: &mut dyn VideoOutput,
    ) -> Result<Self, PoolError> {
        let handle = pool.alloc(SpriteDesc {
            hw_slot: PLAYER_HW_SLOT,
            slot_count: 2,
            width: config.width,
            height: config.height,
            tile_base: config.tile_base,
            tiles_per_frame: PLAYER_TILES_PER_FRAME,
        })?;

        let player = Self {
            handle,
            state: PlayerState::Idle,
            velocity_y: 0,
            gravity_counter: 0,
            facing_right: true,
            config: *config,
        };

        if let Some(sprite) = pool.get_mut(handle) {
            sprite.x = config.start_x;
            sprite.y = config.start_y;
            sprite.anim.restart(&config.idle);
            let tile = config
                .idle
                .tile_for(sprite.tile_base, sprite.tiles_per_frame, 0);
            let sprite = *sprite;
            player.draw(&sprite, tile, video);
        }
        pool.update_hardware(handle, 0, 0, video);
        log::debug!(
            "Player spawned at ({}, {})",
            config.start_x,
            config.start_y
        );
        Ok(player)
    }

    /// Advance one tick. Mutates the camera and commits the sprite's tiles,
    /// attributes and hardware position.
    pub fn update(
        &mut self,
        input: PlayerInput,
        pool: &mut SpritePool,
        camera: &mut Camera,
        level: &Level,
        video: &mut dyn VideoOutput,
    ) -> PlayerEvents {
        let Some(mut sprite) = pool.get(self.handle).copied() else {
            return PlayerEvents::empty();
        };
        let config = self.config;
        let previous_state = self.state;
        let mut events = PlayerEvents::empty();

        let moved = self.walk(&mut sprite, input, level);

        if input.pressed.intersects(Buttons::A | Buttons::B) && self.state != PlayerState::Jump {
            self.become_airborne(config.jump_velocity);
            events |= PlayerEvents::JUMPED;
        }

        if self.state != PlayerState::Jump && !is_supported(&sprite, level) {
            self.become_airborne(0);
        }

        if self.state == PlayerState::Jump {
            match self.step_vertical(&mut sprite, level) {
                Vertical::Landed => {
                    self.velocity_y = 0;
                    self.gravity_counter = 0;
                    self.state = PlayerState::Idle;
                }
                Vertical::Airborne => self.apply_gravity(),
                Vertical::HitCeiling => {}
            }
            if self.state == PlayerState::Jump && sprite.y >= config.max_fall_y {
                events |= PlayerEvents::FELL_GAP;
            }
        }

        if self.state != PlayerState::Jump {
            self.state = if moved {
                PlayerState::Walk
            } else {
                PlayerState::Idle
            };
        }

        let screen_x = camera.to_screen_x(sprite.x);
        if screen_x > config.scroll_right {
            camera.nudge(1);
        } else if screen_x < config.scroll_left {
            camera.nudge(-1);
        }

        let tile = self.animate(&mut sprite, previous_state);

        if let Some(slot) = pool.get_mut(self.handle) {
            *slot = sprite;
        }
        self.draw(&sprite, tile, video);
        pool.update_hardware(self.handle, camera.x(), 0, video);

        if !events.is_empty() {
            log::trace!("Player events {:?} at ({}, {})", events, sprite.x, sprite.y);
        }
        events
    }

    pub fn cleanup(&self, pool: &mut SpritePool, video: &mut dyn VideoOutput) {
        pool.free(Some(self.handle), video);
    }

    pub fn handle(&self) -> SpriteHandle {
        self.handle
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn velocity_y(&self) -> i32 {
        self.velocity_y
    }

    pub fn is_jumping(&self) -> bool {
        self.state == PlayerState::Jump
    }

    pub fn is_facing_right(&self) -> bool {
        self.facing_right
    }

    /// World-space top-left of the player, if its sprite is still live.
    pub fn position(&self, pool: &SpritePool) -> Option<(i32, i32)> {
        pool.get(self.handle).map(|s| (s.x, s.y))
    }

    fn walk(&mut self, sprite: &mut Sprite, input: PlayerInput, level: &Level) -> bool {
        let dx = if input.held.contains(Buttons::RIGHT) {
            self.facing_right = true;
            self.config.walk_speed
        } else if input.held.contains(Buttons::LEFT) {
            self.facing_right = false;
            -self.config.walk_speed
        } else {
            return false;
        };

        let next_x = sprite.x + dx;
        let in_bounds = if dx > 0 {
            next_x <= level.map.width_px() - i32::from(sprite.width)
        } else {
            next_x >= input.min_world_x
        };
        if !in_bounds || level.map.tile_collision(sprite, next_x, &level.solid) {
            return false;
        }
        sprite.x = next_x;
        true
    }

    fn become_airborne(&mut self, velocity_y: i32) {
        self.state = PlayerState::Jump;
        self.velocity_y = velocity_y;
        self.gravity_counter = 0;
    }

    fn step_vertical(&mut self, sprite: &mut Sprite, level: &Level) -> Vertical {
        if self.velocity_y < 0 {
            for _ in 0..-self.velocity_y {
                let next_y = sprite.y - 1;
                if next_y < 0 {
                    break;
                }
                if level
                    .map
                    .tile_collision_at(sprite, sprite.x, next_y, &level.solid)
                {
                    self.velocity_y = self.config.ceiling_bounce_velocity;
                    self.gravity_counter = 0;
                    return Vertical::HitCeiling;
                }
                sprite.y = next_y;
            }
            return Vertical::Airborne;
        }

        for _ in 0..self.velocity_y {
            if is_supported(sprite, level) {
                return Vertical::Landed;
            }
            sprite.y += 1;
        }
        if is_supported(sprite, level) {
            Vertical::Landed
        } else {
            Vertical::Airborne
        }
    }

    fn apply_gravity(&mut self) {
        self.gravity_counter += 1;
        if self.gravity_counter >= self.config.gravity_delay {
            self.gravity_counter = 0;
            self.velocity_y += 1;
        }
    }

    fn animate(&self, sprite: &mut Sprite, previous_state: PlayerState) -> u8 {
        let config = &self.config;
        let clip = match self.state {
            PlayerState::Idle => &config.idle,
            PlayerState::Walk => &config.walk,
            PlayerState::Jump => &config.jump,
        };
        let frame = match self.state {
            PlayerState::Jump => sprite.anim.hold(u8::from(self.velocity_y >= 0)),
            _ => {
                if self.state != previous_state {
                    sprite.anim.restart(clip);
                }
                sprite.anim.tick(clip)
            }
        };
        clip.tile_for(sprite.tile_base, sprite.tiles_per_frame, frame)
    }

    /// The 16x16 body is two 8x16 halves; mirroring swaps which half each
    /// hardware slot shows.
    fn draw(&self, sprite: &Sprite, tile: u8, video: &mut dyn VideoOutput) {
        let half = sprite.tiles_per_frame / 2;
        let (left, right) = if self.facing_right {
            (tile, tile.wrapping_add(half))
        } else {
            (tile.wrapping_add(half), tile)
        };
        let attr = SpriteAttr::empty()
            .with_palette(self.config.palette)
            .with_flip_x(!self.facing_right);

        let slot = sprite.hw_slot;
        video.set_sprite_tile(slot, left);
        video.set_sprite_tile(slot + 1, right);
        video.set_sprite_attr(slot, attr);
        video.set_sprite_attr(slot + 1, attr);
    }
}

/// Feet rest exactly on the top edge of a landable tile.
fn is_supported(sprite: &Sprite, level: &Level) -> bool {
    let body = sprite.hitbox_rect();
    if !sprite.active || body.bottom().rem_euclid(TILE_SIZE) != 0 {
        return false;
    }
    let feet = Aabb {
        x: body.x,
        y: body.bottom(),
        w: body.w,
        h: 1,
    };
    level.map.rect_collision(feet, &level.landable)
}
