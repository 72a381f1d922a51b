//! Game-mode state machine.
//!
//! Exactly one [`GameMode`] is active. A mode's `update` may request a
//! transition by returning the next [`ModeId`]; the machine applies it after
//! the update returns by calling `cleanup` on the old mode, constructing the
//! new one fresh, and calling its `init`. Re-entering the same mode (a
//! gameplay restart) goes through the same path.
//!
//! Joypad edge history is kept across transitions, so a START press that
//! leaves one screen does not also count as a press on the next.

use std::fmt;

use meadow_core::video::BKG_SIZE;
use meadow_core::{Button, Buttons, InputState, Plane, VideoOutput};

use crate::config::GameConfig;
use crate::gameplay::{GameplayMode, GameplaySession};
use crate::hud::{draw_text, glyph};
use crate::level::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeId {
    Title,
    Gameplay,
    GameOver,
    Win,
}

impl ModeId {
    pub const ALL: [ModeId; 4] = [
        ModeId::Title,
        ModeId::Gameplay,
        ModeId::GameOver,
        ModeId::Win,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Title => "title",
            Self::Gameplay => "gameplay",
            Self::GameOver => "game-over",
            Self::Win => "win",
        };
        write!(f, "{label}")
    }
}

/// Progress handed from one gameplay session to the next after a
/// non-fatal fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCarry {
    pub score: u16,
    pub lives: u8,
}

/// Everything a mode may touch during one lifecycle call.
pub struct ModeContext<'a> {
    pub input: &'a InputState,
    pub video: &'a mut dyn VideoOutput,
    pub level: &'a Level,
    pub config: &'a GameConfig,
    pub carry: &'a mut Option<RunCarry>,
}

pub trait GameMode {
    fn id(&self) -> ModeId;
    fn init(&mut self, ctx: &mut ModeContext<'_>);
    /// Run one tick. Returning a mode id requests a transition.
    fn update(&mut self, ctx: &mut ModeContext<'_>) -> Option<ModeId>;
    fn cleanup(&mut self, ctx: &mut ModeContext<'_>);

    fn session(&self) -> Option<&GameplaySession> {
        None
    }
}

fn create_mode(id: ModeId) -> Box<dyn GameMode> {
    match id {
        ModeId::Title => Box::new(TitleMode::default()),
        ModeId::Gameplay => Box::new(GameplayMode::default()),
        ModeId::GameOver => Box::new(MessageMode::game_over()),
        ModeId::Win => Box::new(MessageMode::win()),
    }
}

pub struct StateMachine {
    current: Option<Box<dyn GameMode>>,
    input: InputState,
    level: Level,
    config: GameConfig,
    carry: Option<RunCarry>,
    ticks: u64,
}

impl StateMachine {
    /// A machine with no active mode. Call [`StateMachine::switch_state`]
    /// to enter the first one.
    pub fn new(level: Level, config: GameConfig) -> Self {
        Self {
            current: None,
            input: InputState::new(),
            level,
            config,
            carry: None,
            ticks: 0,
        }
    }

    pub fn switch_state(&mut self, next: ModeId, video: &mut dyn VideoOutput) {
        let mut ctx = ModeContext {
            input: &self.input,
            video,
            level: &self.level,
            config: &self.config,
            carry: &mut self.carry,
        };
        let previous = self.current.take().map(|mut mode| {
            mode.cleanup(&mut ctx);
            mode.id()
        });

        let mut mode = create_mode(next);
        mode.init(&mut ctx);
        self.current = Some(mode);

        match previous {
            Some(from) => log::info!("Mode {from} -> {next} at tick {}", self.ticks),
            None => log::info!("Mode {next} entered"),
        }
    }

    /// Bounds-checked variant of [`StateMachine::switch_state`]. Unknown
    /// indices are ignored.
    pub fn switch_state_index(&mut self, index: usize, video: &mut dyn VideoOutput) {
        match ModeId::from_index(index) {
            Some(id) => self.switch_state(id, video),
            None => log::warn!("Ignoring switch to unknown mode index {index}"),
        }
    }

    /// Latch this tick's held buttons.
    pub fn sample_input(&mut self, held: Buttons) {
        self.input.sample(held);
    }

    /// Run the active mode's update once and apply any transition it asks for.
    pub fn run_current(&mut self, video: &mut dyn VideoOutput) {
        let Some(mode) = self.current.as_mut() else {
            return;
        };
        let mut ctx = ModeContext {
            input: &self.input,
            video: &mut *video,
            level: &self.level,
            config: &self.config,
            carry: &mut self.carry,
        };
        let next = mode.update(&mut ctx);
        self.ticks += 1;
        if let Some(next) = next {
            self.switch_state(next, video);
        }
    }

    /// One frame: sample input, then update.
    pub fn step(&mut self, held: Buttons, video: &mut dyn VideoOutput) {
        self.sample_input(held);
        self.run_current(video);
    }

    pub fn current(&self) -> Option<ModeId> {
        self.current.as_ref().map(|mode| mode.id())
    }

    pub fn session(&self) -> Option<&GameplaySession> {
        self.current.as_ref().and_then(|mode| mode.session())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Blank the background with font spaces, hide the HUD window and reset
/// scroll, ready for a static text screen.
fn clear_screen(ctx: &mut ModeContext<'_>) {
    let blank = glyph(b' ', ctx.config.font_first_tile);
    let cells = usize::from(BKG_SIZE) * usize::from(BKG_SIZE);
    ctx.video.set_bkg_tiles(0, &vec![blank; cells]);
    for row in 0..BKG_SIZE as u8 {
        for col in 0..BKG_SIZE as u8 {
            ctx.video.set_bkg_attr(col, row, 0);
        }
    }
    ctx.video.set_window_visible(false);
    ctx.video.set_scroll(0, 0);
}

const TITLE_PROMPT: &str = "PRESS START";
const TITLE_PROMPT_POS: (u8, u8) = (4, 13);

#[derive(Debug, Default)]
pub struct TitleMode {
    flash_counter: u8,
    prompt_visible: bool,
}

impl GameMode for TitleMode {
    fn id(&self) -> ModeId {
        ModeId::Title
    }

    fn init(&mut self, ctx: &mut ModeContext<'_>) {
        *ctx.carry = None;
        clear_screen(ctx);
        let font = ctx.config.font_first_tile;
        draw_text(ctx.video, Plane::Background, 5, 6, "MEADOW RUN", font);
        let (col, row) = TITLE_PROMPT_POS;
        draw_text(ctx.video, Plane::Background, col, row, TITLE_PROMPT, font);
        self.flash_counter = 0;
        self.prompt_visible = true;
    }

    fn update(&mut self, ctx: &mut ModeContext<'_>) -> Option<ModeId> {
        self.flash_counter += 1;
        if self.flash_counter >= ctx.config.title.flash_interval.max(1) {
            self.flash_counter = 0;
            self.prompt_visible = !self.prompt_visible;
            let text = if self.prompt_visible {
                TITLE_PROMPT
            } else {
                "           "
            };
            let (col, row) = TITLE_PROMPT_POS;
            draw_text(ctx.video, Plane::Background, col, row, text, ctx.config.font_first_tile);
        }

        ctx.input
            .is_just_pressed(Button::Start)
            .then_some(ModeId::Gameplay)
    }

    fn cleanup(&mut self, _ctx: &mut ModeContext<'_>) {}
}

/// Static text screen that returns to the title on START.
#[derive(Debug)]
pub struct MessageMode {
    id: ModeId,
    lines: &'static [(u8, u8, &'static str)],
}

impl MessageMode {
    pub fn game_over() -> Self {
        Self {
            id: ModeId::GameOver,
            lines: &[(5, 6, "GAME OVER"), (2, 9, "PRESS START")],
        }
    }

    pub fn win() -> Self {
        Self {
            id: ModeId::Win,
            lines: &[
                (4, 5, "YOU WIN!"),
                (1, 7, "CONGRATULATIONS!"),
                (2, 9, "PRESS START"),
            ],
        }
    }
}

impl GameMode for MessageMode {
    fn id(&self) -> ModeId {
        self.id
    }

    fn init(&mut self, ctx: &mut ModeContext<'_>) {
        clear_screen(ctx);
        for &(col, row, text) in self.lines {
            draw_text(ctx.video, Plane::Background, col, row, text, ctx.config.font_first_tile);
        }
    }

    fn update(&mut self, ctx: &mut ModeContext<'_>) -> Option<ModeId> {
        ctx.input
            .is_just_pressed(Button::Start)
            .then_some(ModeId::Title)
    }

    fn cleanup(&mut self, _ctx: &mut ModeContext<'_>) {}
}
