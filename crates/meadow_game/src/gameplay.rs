use meadow_core::VideoOutput;

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::hud::Hud;
use crate::level::Level;
use crate::modes::{GameMode, ModeContext, ModeId, RunCarry};
use crate::player::{Player, PlayerEvents, PlayerInput};
use crate::pool::SpritePool;
use crate::streamer::BackgroundStreamer;

const MAX_SCORE: u16 = 9999;

/// One attempt at the level: sprites, camera, streaming and run counters.
#[derive(Debug)]
pub struct GameplaySession {
    pool: SpritePool,
    player: Option<Player>,
    enemy: Option<Enemy>,
    camera: Camera,
    streamer: BackgroundStreamer,
    hud: Hud,
    score: u16,
    lives: u8,
    time_remaining: u16,
    collision_cooldown: u8,
}

impl GameplaySession {
    /// Spawn sprites, prime the background and draw the HUD. Score and lives
    /// come from `carry` when restarting after a fall.
    pub fn start(
        level: &Level,
        config: &GameConfig,
        carry: Option<RunCarry>,
        video: &mut dyn VideoOutput,
    ) -> Self {
        let mut pool = SpritePool::new();
        pool.init();

        let player = Player::spawn(&mut pool, &config.player, video)
            .map_err(|err| log::warn!("Player not spawned: {err}"))
            .ok();
        let enemy = Enemy::spawn(&mut pool, &config.enemy, video)
            .map_err(|err| log::warn!("Enemy not spawned: {err}"))
            .ok();

        let mut streamer = BackgroundStreamer::new(config.stream, config.player.scroll_left);
        streamer.prime(level, video);
        video.set_scroll(0, 0);

        let (score, lives) = match carry {
            Some(carry) => (carry.score, carry.lives),
            None => (0, config.gameplay.starting_lives),
        };
        let time_remaining = config.gameplay.timer_ticks;

        let mut hud = Hud::new(config.font_first_tile);
        hud.init(video, score, seconds(time_remaining, config), lives);

        log::info!("Gameplay started with {lives} lives, score {score}");
        Self {
            pool,
            player,
            enemy,
            camera: Camera::for_map(&level.map),
            streamer,
            hud,
            score,
            lives,
            time_remaining,
            collision_cooldown: 0,
        }
    }

    pub fn update(&mut self, ctx: &mut ModeContext<'_>) -> Option<ModeId> {
        let config = ctx.config;

        if self.time_remaining == 0 {
            log::info!("Time up with score {}", self.score);
            return Some(ModeId::GameOver);
        }
        self.time_remaining -= 1;
        self.hud
            .show_seconds(ctx.video, seconds(self.time_remaining, config));

        let input = PlayerInput {
            held: ctx.input.held(),
            pressed: ctx.input.pressed(),
            min_world_x: self.streamer.min_world_x(),
        };
        let events = match self.player.as_mut() {
            Some(player) => player.update(
                input,
                &mut self.pool,
                &mut self.camera,
                ctx.level,
                ctx.video,
            ),
            None => PlayerEvents::empty(),
        };

        if events.contains(PlayerEvents::JUMPED) {
            self.score = self
                .score
                .saturating_add(config.gameplay.score_per_jump)
                .min(MAX_SCORE);
            self.hud.show_score(ctx.video, self.score);
        }

        if events.contains(PlayerEvents::FELL_GAP) {
            self.lose_life(ctx.video);
            if self.lives == 0 {
                log::info!("Fell with no lives left");
                return Some(ModeId::GameOver);
            }
            *ctx.carry = Some(RunCarry {
                score: self.score,
                lives: self.lives,
            });
            log::info!("Fell into a gap, {} lives left", self.lives);
            return Some(ModeId::Gameplay);
        }

        if let Some(enemy) = self.enemy.as_mut() {
            enemy.update(&mut self.pool, self.camera.x(), ctx.level, ctx.video);
        }

        if let Some((x, _)) = self.player_position() {
            if x >= config.gameplay.checkpoint_x {
                log::info!("Checkpoint reached at x {x} with score {}", self.score);
                return Some(ModeId::Win);
            }
        }

        if self.collision_cooldown > 0 {
            self.collision_cooldown -= 1;
        } else if self.player_touches_enemy() {
            self.lose_life(ctx.video);
            if self.lives == 0 {
                log::info!("Caught by the enemy with no lives left");
                return Some(ModeId::GameOver);
            }
            self.collision_cooldown = config.gameplay.collision_cooldown;
            log::debug!("Enemy contact, {} lives left", self.lives);
        }

        self.streamer.update(self.camera.x(), ctx.level, ctx.video);
        ctx.video.set_scroll(self.camera.scroll_register(), 0);
        None
    }

    pub fn cleanup(&mut self, video: &mut dyn VideoOutput) {
        if let Some(player) = self.player.take() {
            player.cleanup(&mut self.pool, video);
        }
        if let Some(enemy) = self.enemy.take() {
            enemy.cleanup(&mut self.pool, video);
        }
        self.hud.hide(video);
        video.set_scroll(0, 0);
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn time_remaining(&self) -> u16 {
        self.time_remaining
    }

    pub fn collision_cooldown(&self) -> u8 {
        self.collision_cooldown
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn streamer(&self) -> &BackgroundStreamer {
        &self.streamer
    }

    pub fn pool(&self) -> &SpritePool {
        &self.pool
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.enemy.as_ref()
    }

    pub fn player_position(&self) -> Option<(i32, i32)> {
        self.player.as_ref()?.position(&self.pool)
    }

    fn player_touches_enemy(&self) -> bool {
        match (&self.player, &self.enemy) {
            (Some(player), Some(enemy)) => self.pool.collide(player.handle(), enemy.handle()),
            _ => false,
        }
    }

    fn lose_life(&mut self, video: &mut dyn VideoOutput) {
        self.lives = self.lives.saturating_sub(1);
        self.hud.show_lives(video, self.lives);
    }
}

fn seconds(ticks: u16, config: &GameConfig) -> u16 {
    ticks / config.gameplay.ticks_per_second.max(1)
}

#[derive(Debug, Default)]
pub struct GameplayMode {
    session: Option<GameplaySession>,
}

impl GameMode for GameplayMode {
    fn id(&self) -> ModeId {
        ModeId::Gameplay
    }

    fn init(&mut self, ctx: &mut ModeContext<'_>) {
        let carry = ctx.carry.take();
        self.session = Some(GameplaySession::start(ctx.level, ctx.config, carry, ctx.video));
    }

    fn update(&mut self, ctx: &mut ModeContext<'_>) -> Option<ModeId> {
        self.session.as_mut()?.update(ctx)
    }

    fn cleanup(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(mut session) = self.session.take() {
            session.cleanup(ctx.video);
        }
    }

    fn session(&self) -> Option<&GameplaySession> {
        self.session.as_ref()
    }
}
