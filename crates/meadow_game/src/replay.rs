use meadow_core::{Button, Buttons};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

/// Buttons held for `repeat` consecutive ticks.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReplayFrame {
    #[serde(default)]
    pub buttons: Vec<Button>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    fn new(buttons: &[Button], repeat: u32) -> Self {
        Self {
            buttons: buttons.to_vec(),
            repeat,
        }
    }

    pub fn mask(&self) -> Buttons {
        self.buttons
            .iter()
            .fold(Buttons::empty(), |mask, &button| mask | Buttons::from(button))
    }
}

impl ReplaySequence {
    /// Built-in attract run: start the game, walk right hopping over the
    /// first block, then let the first pit take a life.
    pub fn attract() -> Self {
        use Button::{Right, Start, A};
        Self {
            frames: vec![
                ReplayFrame::new(&[], 30),
                ReplayFrame::new(&[Start], 1),
                ReplayFrame::new(&[], 10),
                ReplayFrame::new(&[Right], 14),
                ReplayFrame::new(&[Right, A], 1),
                ReplayFrame::new(&[Right], 90),
                ReplayFrame::new(&[], 60),
            ],
        }
    }

    /// One held-button mask per tick. A `repeat` of zero counts as one.
    pub fn expanded_inputs(&self) -> Vec<Buttons> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let mask = frame.mask();
            for _ in 0..frame.repeat.max(1) {
                out.push(mask);
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::level::Level;
    use crate::modes::{ModeId, StateMachine};
    use meadow_core::ShadowVram;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "meadow_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "buttons": ["right"], "repeat": 3 },
                { "buttons": ["right", "a"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert_eq!(expanded[0], Buttons::RIGHT);
        assert_eq!(expanded[3], Buttons::RIGHT | Buttons::A);
        assert!(expanded[5].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(err.contains("frames list is empty"), "unexpected error: {err}");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_button_fails_to_parse() {
        let path = temp_file_path("bad_button");
        fs::write(&path, r#"{ "frames": [{ "buttons": ["turbo"] }] }"#)
            .expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("unknown button must fail");
        assert!(err.starts_with("Failed to parse replay JSON"), "unexpected error: {err}");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let inputs = ReplaySequence::attract().expanded_inputs();

        let run = || {
            let mut vram = ShadowVram::new();
            let mut sm = StateMachine::new(Level::meadow(), GameConfig::default());
            sm.switch_state(ModeId::Title, &mut vram);
            for held in &inputs {
                sm.step(*held, &mut vram);
            }
            let summary = sm
                .session()
                .map(|s| (s.score(), s.lives(), s.player_position(), s.camera().x()));
            (sm.current(), summary, vram.oam(0).copied(), vram.scroll())
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first.0, Some(ModeId::Gameplay));
    }

    #[test]
    fn attract_run_jumps_and_falls() {
        let mut vram = ShadowVram::new();
        let mut sm = StateMachine::new(Level::meadow(), GameConfig::default());
        sm.switch_state(ModeId::Title, &mut vram);
        for held in ReplaySequence::attract().expanded_inputs() {
            sm.step(held, &mut vram);
        }
        let session = sm.session().expect("still in gameplay");
        assert_eq!(session.score(), 1);
        assert_eq!(session.lives(), 2);
    }
}
