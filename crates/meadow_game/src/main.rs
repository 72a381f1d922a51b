//! Headless runner: loads config, level and replay from `assets/`, plays the
//! replay through the mode state machine against a shadow VRAM and logs a
//! summary of where the run ended.

use std::path::Path;

use env_logger::Env;
use meadow_core::ShadowVram;

use meadow_game::config::{load_config_from_path, GameConfig};
use meadow_game::level::{load_level_from_path, Level};
use meadow_game::modes::{ModeId, StateMachine};
use meadow_game::replay::{load_replay_from_path, ReplaySequence};

const CONFIG_PATH: &str = "assets/config/game.json";
const LEVEL_PATH: &str = "assets/levels/meadow.json";
const REPLAY_PATH: &str = "assets/replays/demo.json";

fn load_config() -> GameConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        log::warn!("Config '{}' not found, using defaults.", path.display());
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}; using defaults.");
            GameConfig::default()
        }
    }
}

fn load_level() -> Level {
    let path = Path::new(LEVEL_PATH);
    if !path.exists() {
        log::info!("Level '{}' not found, using built-in meadow.", path.display());
        return Level::meadow();
    }
    match load_level_from_path(path) {
        Ok(level) => {
            log::info!(
                "Loaded level '{}' ({}x{})",
                path.display(),
                level.map.width(),
                level.map.height()
            );
            level
        }
        Err(err) => {
            log::error!("{err}; using built-in meadow.");
            Level::meadow()
        }
    }
}

fn load_replay() -> ReplaySequence {
    let path = Path::new(REPLAY_PATH);
    if !path.exists() {
        log::warn!("Replay '{}' not found, using attract sequence.", path.display());
        return ReplaySequence::attract();
    }
    match load_replay_from_path(path) {
        Ok(replay) => replay,
        Err(err) => {
            log::error!("{err}; using attract sequence.");
            ReplaySequence::attract()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    log::info!("Meadow Run starting...");

    let config = load_config();
    let level = load_level();
    let inputs = load_replay().expanded_inputs();

    let mut vram = ShadowVram::new();
    let mut machine = StateMachine::new(level, config);
    machine.switch_state(ModeId::Title, &mut vram);

    for held in &inputs {
        machine.step(*held, &mut vram);
    }

    let mode = machine
        .current()
        .map_or_else(|| "none".to_string(), |id| id.to_string());
    match machine.session() {
        Some(session) => log::info!(
            "Replay finished after {} ticks in {mode}: score {}, lives {}, time left {}",
            machine.ticks(),
            session.score(),
            session.lives(),
            session.time_remaining()
        ),
        None => log::info!("Replay finished after {} ticks in {mode}", machine.ticks()),
    }
}
