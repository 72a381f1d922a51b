//! Joypad state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `held()` reports every button physically down
//!   this tick. Used for continuous actions like walking.
//!
//! - **Edge-triggered (pressed):** `pressed()` reports buttons that went down
//!   on this tick only (`held & !previous`). Used for jumps and menu
//!   confirmation so a held button does not repeat.
//!
//! The mask is latched once per tick by `sample()`, which the frame loop calls
//! before running the active game mode.

use serde::Deserialize;

bitflags::bitflags! {
    /// Eight-button joypad mask, laid out like the handheld's P1 register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u8 {
        const RIGHT  = 0b0000_0001;
        const LEFT   = 0b0000_0010;
        const UP     = 0b0000_0100;
        const DOWN   = 0b0000_1000;
        const A      = 0b0001_0000;
        const B      = 0b0010_0000;
        const SELECT = 0b0100_0000;
        const START  = 0b1000_0000;
    }
}

/// A single named button, used where masks are awkward (replay files, frontends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl From<Button> for Buttons {
    fn from(button: Button) -> Self {
        match button {
            Button::Right => Buttons::RIGHT,
            Button::Left => Buttons::LEFT,
            Button::Up => Buttons::UP,
            Button::Down => Buttons::DOWN,
            Button::A => Buttons::A,
            Button::B => Buttons::B,
            Button::Select => Buttons::SELECT,
            Button::Start => Buttons::START,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    held: Buttons,
    previous: Buttons,
    pending: Buttons,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a new held mask for this tick.
    pub fn sample(&mut self, held: Buttons) {
        self.previous = self.held;
        self.held = held;
        self.pending = held;
    }

    /// Latch whatever `key_down`/`key_up` accumulated since the last tick.
    pub fn sample_pending(&mut self) {
        self.sample(self.pending);
    }

    pub fn key_down(&mut self, button: Button) {
        self.pending.insert(button.into());
    }

    pub fn key_up(&mut self, button: Button) {
        self.pending.remove(button.into());
    }

    pub fn held(&self) -> Buttons {
        self.held
    }

    pub fn pressed(&self) -> Buttons {
        self.held & !self.previous
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held.contains(button.into())
    }

    pub fn is_just_pressed(&self, button: Button) -> bool {
        self.pressed().contains(button.into())
    }
}
