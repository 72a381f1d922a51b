//! Tick-counted sprite animation.
//!
//! A clip is a run of consecutive frames inside a sprite's tile block. Timing
//! is counted in whole ticks (one per vertical blank), so advancement is
//! deterministic and identical on every run: a frame is shown for exactly
//! `ticks_per_frame` ticks before the next one replaces it.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AnimationClip {
    /// Index of the clip's first frame within the sprite's frame strip.
    pub first_frame: u8,
    pub frame_count: u8,
    pub ticks_per_frame: u8,
}

impl AnimationClip {
    pub const fn new(first_frame: u8, frame_count: u8, ticks_per_frame: u8) -> Self {
        Self {
            first_frame,
            frame_count,
            ticks_per_frame,
        }
    }

    /// Tile index of `frame` within this clip.
    pub fn tile_for(&self, tile_base: u8, tiles_per_frame: u8, frame: u8) -> u8 {
        let absolute = self.first_frame.wrapping_add(frame);
        tile_base.wrapping_add(absolute.wrapping_mul(tiles_per_frame))
    }
}

/// Per-sprite playback cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub frame: u8,
    /// Ticks elapsed on the current frame.
    pub counter: u8,
    /// Ticks per frame for the clip currently playing.
    pub speed: u8,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            frame: 0,
            counter: 0,
            speed: 8,
        }
    }
}

impl AnimationState {
    pub fn restart(&mut self, clip: &AnimationClip) {
        self.frame = 0;
        self.counter = 0;
        self.speed = clip.ticks_per_frame;
    }

    /// Advance one tick through `clip`, looping. Returns the frame to display.
    pub fn tick(&mut self, clip: &AnimationClip) -> u8 {
        if clip.frame_count == 0 {
            self.frame = 0;
            return 0;
        }

        self.counter = self.counter.saturating_add(1);
        if self.counter >= self.speed.max(1) {
            self.counter = 0;
            self.frame = (self.frame + 1) % clip.frame_count;
        }
        if self.frame >= clip.frame_count {
            self.frame = 0;
        }
        self.frame
    }

    /// Pin a fixed frame without time-based cycling.
    pub fn hold(&mut self, frame: u8) -> u8 {
        self.frame = frame;
        self.counter = 0;
        frame
    }
}
