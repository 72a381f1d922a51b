//! Text drawing and the gameplay status window (score, time, lives).

use meadow_core::video::SCREEN_COLS;
use meadow_core::{Plane, VideoOutput};

/// Font glyph index of the heart, relative to the font's first tile.
pub const HEART_GLYPH: u8 = 95;
pub const HUD_TEXT_PALETTE: u8 = 3;
pub const HUD_HEART_PALETTE: u8 = 4;

/// Window origin in hardware window coordinates: flush left, bottom four rows.
pub const HUD_WINDOW_POS: (u8, u8) = (7, 112);

const HUD_ROWS: u8 = 4;
const MAX_HEARTS: u8 = 3;
const SCORE_POS: (u8, u8) = (7, 1);
const TIME_POS: (u8, u8) = (12, 1);
const LIVES_POS: (u8, u8) = (7, 2);

/// Tile index for an ASCII byte; anything outside printable ASCII draws as
/// a space.
pub fn glyph(c: u8, font_first_tile: u8) -> u8 {
    let c = if (32..128).contains(&c) { c } else { b' ' };
    font_first_tile.wrapping_add(c - 32)
}

pub fn draw_text(
    video: &mut dyn VideoOutput,
    plane: Plane,
    col: u8,
    row: u8,
    text: &str,
    font_first_tile: u8,
) {
    for (i, c) in text.bytes().enumerate() {
        video.set_tile(plane, col.wrapping_add(i as u8), row, glyph(c, font_first_tile));
    }
}

fn paint_attrs(video: &mut dyn VideoOutput, col: u8, row: u8, len: u8, palette: u8) {
    for i in 0..len {
        video.set_win_attr(col + i, row, palette);
    }
}

/// Window-layer HUD. Each field is redrawn only when its value changes.
#[derive(Debug, Clone)]
pub struct Hud {
    font_first_tile: u8,
    score: Option<u16>,
    seconds: Option<u16>,
    lives: Option<u8>,
}

impl Hud {
    pub fn new(font_first_tile: u8) -> Self {
        Self {
            font_first_tile,
            score: None,
            seconds: None,
            lives: None,
        }
    }

    pub fn init(&mut self, video: &mut dyn VideoOutput, score: u16, seconds: u16, lives: u8) {
        let blank = glyph(b' ', self.font_first_tile);
        for row in 0..HUD_ROWS {
            for col in 0..SCREEN_COLS as u8 {
                video.set_win_tile(col, row, blank);
                video.set_win_attr(col, row, HUD_TEXT_PALETTE);
            }
        }
        draw_text(video, Plane::Window, 0, 1, "SCORE: ", self.font_first_tile);
        draw_text(video, Plane::Window, 0, 2, "LIVES: ", self.font_first_tile);

        self.score = None;
        self.seconds = None;
        self.lives = None;
        self.show_score(video, score);
        self.show_seconds(video, seconds);
        self.show_lives(video, lives);
        let (x, y) = HUD_WINDOW_POS;
        video.move_window(x, y);
        video.set_window_visible(true);
    }

    pub fn show_score(&mut self, video: &mut dyn VideoOutput, score: u16) {
        let score = score.min(9999);
        if self.score == Some(score) {
            return;
        }
        self.score = Some(score);
        let (col, row) = SCORE_POS;
        draw_text(video, Plane::Window, col, row, &format!("{score:04}"), self.font_first_tile);
        paint_attrs(video, col, row, 4, HUD_TEXT_PALETTE);
    }

    pub fn show_seconds(&mut self, video: &mut dyn VideoOutput, seconds: u16) {
        let seconds = seconds.min(99);
        if self.seconds == Some(seconds) {
            return;
        }
        self.seconds = Some(seconds);
        let (col, row) = TIME_POS;
        let text = format!("TIME: {seconds:02}");
        draw_text(video, Plane::Window, col, row, &text, self.font_first_tile);
        paint_attrs(video, col, row, 8, HUD_TEXT_PALETTE);
    }

    pub fn show_lives(&mut self, video: &mut dyn VideoOutput, lives: u8) {
        if self.lives == Some(lives) {
            return;
        }
        self.lives = Some(lives);
        let (col, row) = LIVES_POS;
        let heart = self.font_first_tile.wrapping_add(HEART_GLYPH);
        let blank = glyph(b' ', self.font_first_tile);
        for i in 0..MAX_HEARTS {
            video.set_win_tile(col + i, row, if i < lives { heart } else { blank });
        }
        paint_attrs(video, col, row, MAX_HEARTS, HUD_HEART_PALETTE);
    }

    pub fn hide(&self, video: &mut dyn VideoOutput) {
        video.set_window_visible(false);
    }
}
