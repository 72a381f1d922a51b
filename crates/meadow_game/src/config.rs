//! Tunable game parameters.
//!
//! Every value has a compiled-in default, so a config file only needs the
//! fields it overrides. Units are world pixels and ticks.

use meadow_core::video::{BKG_SIZE, SCREEN_COLS};
use meadow_core::AnimationClip;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_x: i32,
    pub start_y: i32,
    pub width: u8,
    pub height: u8,
    pub tile_base: u8,
    pub walk_speed: i32,
    /// Initial vertical velocity of a jump; negative is up.
    pub jump_velocity: i32,
    /// Ticks between gravity steps while airborne.
    pub gravity_delay: u8,
    /// Velocity given after bumping a ceiling.
    pub ceiling_bounce_velocity: i32,
    pub max_fall_y: i32,
    pub scroll_right: i32,
    pub scroll_left: i32,
    pub palette: u8,
    pub idle: AnimationClip,
    pub walk: AnimationClip,
    pub jump: AnimationClip,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_x: 20,
            start_y: 64,
            width: 16,
            height: 16,
            tile_base: 0,
            walk_speed: 1,
            jump_velocity: -6,
            gravity_delay: 3,
            ceiling_bounce_velocity: 1,
            max_fall_y: 160,
            scroll_right: 100,
            scroll_left: 60,
            palette: 0,
            idle: AnimationClip::new(0, 2, 16),
            walk: AnimationClip::new(2, 4, 8),
            jump: AnimationClip::new(6, 2, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub start_x: i32,
    pub start_y: i32,
    pub width: u8,
    pub height: u8,
    pub tile_base: u8,
    pub patrol_left: i32,
    pub patrol_right: i32,
    pub speed: i32,
    pub palette: u8,
    /// Screen-space X range outside which the sprite is hidden.
    pub visible_min_x: i32,
    pub visible_max_x: i32,
    pub walk: AnimationClip,
    pub idle: AnimationClip,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            start_x: 140,
            start_y: 72,
            width: 8,
            height: 8,
            tile_base: 32,
            patrol_left: 10,
            patrol_right: 180,
            speed: 1,
            palette: 1,
            visible_min_x: -8,
            visible_max_x: 168,
            walk: AnimationClip::new(0, 2, 8),
            idle: AnimationClip::new(2, 1, 16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    pub starting_lives: u8,
    pub timer_ticks: u16,
    pub ticks_per_second: u16,
    /// Ticks of invincibility after touching the enemy.
    pub collision_cooldown: u8,
    /// Player world X that wins the level.
    pub checkpoint_x: i32,
    pub score_per_jump: u16,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            timer_ticks: 3600,
            ticks_per_second: 60,
            collision_cooldown: 60,
            checkpoint_x: 360,
            score_per_jump: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Background columns used as the ring; at most the hardware surface.
    pub ring_width: u16,
    /// Columns past the camera's left tile that must be resident.
    pub lookahead_cols: u16,
    /// Player lower X bound before the ring has wrapped.
    pub min_world_x: i32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ring_width: 32,
            lookahead_cols: 21,
            min_world_x: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub flash_interval: u8,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self { flash_interval: 30 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub gameplay: GameplayConfig,
    pub stream: StreamConfig,
    pub title: TitleConfig,
    /// VRAM tile holding ASCII space; the font follows the background tiles.
    pub font_first_tile: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            gameplay: GameplayConfig::default(),
            stream: StreamConfig::default(),
            title: TitleConfig::default(),
            font_first_tile: 16,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        let player = &self.player;
        if player.gravity_delay == 0 {
            return Err("Config validation failed: player.gravity_delay must be > 0".to_string());
        }
        for (name, clip) in [("idle", &player.idle), ("walk", &player.walk)] {
            if clip.ticks_per_frame == 0 || clip.frame_count == 0 {
                return Err(format!(
                    "Config validation failed: player.{name} needs frames and a non-zero speed"
                ));
            }
        }
        if self.enemy.walk.ticks_per_frame == 0 || self.enemy.walk.frame_count == 0 {
            return Err(
                "Config validation failed: enemy.walk needs frames and a non-zero speed"
                    .to_string(),
            );
        }
        if player.scroll_left >= player.scroll_right {
            return Err(format!(
                "Config validation failed: scroll_left ({}) must be < scroll_right ({})",
                player.scroll_left, player.scroll_right
            ));
        }
        let stream = &self.stream;
        if stream.ring_width > BKG_SIZE {
            return Err(format!(
                "Config validation failed: ring_width ({}) exceeds the {BKG_SIZE}-column surface",
                stream.ring_width
            ));
        }
        if stream.lookahead_cols <= SCREEN_COLS || stream.lookahead_cols >= stream.ring_width {
            return Err(format!(
                "Config validation failed: lookahead_cols ({}) must lie between the {SCREEN_COLS} \
                 visible columns and ring_width ({})",
                stream.lookahead_cols, stream.ring_width
            ));
        }
        if self.gameplay.starting_lives == 0 {
            return Err("Config validation failed: starting_lives must be > 0".to_string());
        }
        if self.gameplay.ticks_per_second == 0 {
            return Err("Config validation failed: ticks_per_second must be > 0".to_string());
        }
        if self.enemy.patrol_left >= self.enemy.patrol_right {
            return Err(format!(
                "Config validation failed: patrol_left ({}) must be < patrol_right ({})",
                self.enemy.patrol_left, self.enemy.patrol_right
            ));
        }
        Ok(())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    config.validate()?;
    Ok(config)
}
