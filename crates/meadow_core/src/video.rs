//! The video-output capability consumed by the simulation.
//!
//! The handheld exposes a 32x32 background tile surface, a window layer used
//! for the HUD, 40 hardware sprite (OAM) slots and a pair of scroll registers.
//! Gameplay code talks to it exclusively through [`VideoOutput`], so the same
//! simulation can drive real registers, a desktop frontend, or the in-memory
//! [`ShadowVram`] used by tests and the headless runner.
//!
//! Hardware sprite coordinates are offset from screen space: a sprite drawn
//! at screen (0, 0) sits at OAM (8, 16). OAM (0, 0) is therefore fully off the
//! visible window, which is how slots are hidden.

/// Pixels per background tile edge.
pub const TILE_SIZE: i32 = 8;
pub const SCREEN_WIDTH: i32 = 160;
pub const SCREEN_HEIGHT: i32 = 144;
/// Tile columns visible at once.
pub const SCREEN_COLS: u16 = 20;
/// Width and height of the hardware background (and window) surface, in tiles.
pub const BKG_SIZE: u16 = 32;
pub const OAM_SLOTS: usize = 40;
pub const HW_SPRITE_X_OFFSET: i32 = 8;
pub const HW_SPRITE_Y_OFFSET: i32 = 16;

bitflags::bitflags! {
    /// OAM attribute byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteAttr: u8 {
        /// CGB palette selector (0-7).
        const PALETTE   = 0b0000_0111;
        const VRAM_BANK = 0b0000_1000;
        const FLIP_X    = 0b0010_0000;
        const FLIP_Y    = 0b0100_0000;
        const BEHIND_BG = 0b1000_0000;
    }
}

impl SpriteAttr {
    pub fn with_palette(self, palette: u8) -> Self {
        Self::from_bits_retain((self.bits() & !Self::PALETTE.bits()) | (palette & 0x07))
    }

    pub fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }

    pub fn with_flip_x(mut self, flipped: bool) -> Self {
        self.set(Self::FLIP_X, flipped);
        self
    }
}

/// Which tile plane a text or tile write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Background,
    Window,
}

pub trait VideoOutput {
    /// Copy `tiles` into the background map starting at a linear VRAM offset.
    fn set_bkg_tiles(&mut self, offset: u16, tiles: &[u8]);
    fn set_bkg_tile(&mut self, col: u8, row: u8, tile: u8);
    fn set_bkg_attr(&mut self, col: u8, row: u8, attr: u8);
    fn set_win_tile(&mut self, col: u8, row: u8, tile: u8);
    fn set_win_attr(&mut self, col: u8, row: u8, attr: u8);
    fn set_window_visible(&mut self, visible: bool);
    /// Place the window layer's top-left corner, in hardware window coordinates.
    fn move_window(&mut self, x: u8, y: u8);
    fn set_sprite_tile(&mut self, slot: u8, tile: u8);
    fn set_sprite_attr(&mut self, slot: u8, attr: SpriteAttr);
    fn move_sprite(&mut self, slot: u8, x: u8, y: u8);
    fn set_scroll(&mut self, x: u8, y: u8);

    fn set_tile(&mut self, plane: Plane, col: u8, row: u8, tile: u8) {
        match plane {
            Plane::Background => self.set_bkg_tile(col, row, tile),
            Plane::Window => self.set_win_tile(col, row, tile),
        }
    }

    fn set_attr(&mut self, plane: Plane, col: u8, row: u8, attr: u8) {
        match plane {
            Plane::Background => self.set_bkg_attr(col, row, attr),
            Plane::Window => self.set_win_attr(col, row, attr),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OamEntry {
    pub x: u8,
    pub y: u8,
    pub tile: u8,
    pub attr: SpriteAttr,
}

impl OamEntry {
    /// True when any part of the 8-pixel-wide slot lands inside the screen.
    pub fn is_on_screen(&self) -> bool {
        let x = i32::from(self.x);
        let y = i32::from(self.y);
        x > 0
            && x < SCREEN_WIDTH + HW_SPRITE_X_OFFSET
            && y > 0
            && y < SCREEN_HEIGHT + HW_SPRITE_Y_OFFSET
    }
}

const SURFACE_CELLS: usize = (BKG_SIZE as usize) * (BKG_SIZE as usize);

/// In-memory mirror of the video hardware.
#[derive(Debug, Clone)]
pub struct ShadowVram {
    bkg_tiles: Vec<u8>,
    bkg_attrs: Vec<u8>,
    win_tiles: Vec<u8>,
    win_attrs: Vec<u8>,
    window_visible: bool,
    window_position: (u8, u8),
    oam: [OamEntry; OAM_SLOTS],
    scroll: (u8, u8),
}

impl ShadowVram {
    pub fn new() -> Self {
        Self {
            bkg_tiles: vec![0; SURFACE_CELLS],
            bkg_attrs: vec![0; SURFACE_CELLS],
            win_tiles: vec![0; SURFACE_CELLS],
            win_attrs: vec![0; SURFACE_CELLS],
            window_visible: false,
            window_position: (0, 0),
            oam: [OamEntry::default(); OAM_SLOTS],
            scroll: (0, 0),
        }
    }

    pub fn bkg_tile(&self, col: u8, row: u8) -> u8 {
        self.bkg_tiles[surface_index(col, row)]
    }

    pub fn bkg_attr(&self, col: u8, row: u8) -> u8 {
        self.bkg_attrs[surface_index(col, row)]
    }

    pub fn win_tile(&self, col: u8, row: u8) -> u8 {
        self.win_tiles[surface_index(col, row)]
    }

    pub fn win_attr(&self, col: u8, row: u8) -> u8 {
        self.win_attrs[surface_index(col, row)]
    }

    pub fn window_visible(&self) -> bool {
        self.window_visible
    }

    pub fn window_position(&self) -> (u8, u8) {
        self.window_position
    }

    pub fn oam(&self, slot: u8) -> Option<&OamEntry> {
        self.oam.get(usize::from(slot))
    }

    pub fn scroll(&self) -> (u8, u8) {
        self.scroll
    }

    /// Decode a run of tiles on one plane back into ASCII, given the font base.
    pub fn read_text(
        &self,
        plane: Plane,
        col: u8,
        row: u8,
        len: u8,
        font_first_tile: u8,
    ) -> String {
        (0..len)
            .map(|i| {
                let c = col.wrapping_add(i);
                let tile = match plane {
                    Plane::Background => self.bkg_tile(c, row),
                    Plane::Window => self.win_tile(c, row),
                };
                char::from(tile.wrapping_sub(font_first_tile).wrapping_add(32))
            })
            .collect()
    }

    fn oam_slot_mut(&mut self, slot: u8) -> Option<&mut OamEntry> {
        let entry = self.oam.get_mut(usize::from(slot));
        if entry.is_none() {
            log::warn!("Ignoring write to OAM slot {slot}: only {OAM_SLOTS} slots exist");
        }
        entry
    }
}

impl Default for ShadowVram {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoOutput for ShadowVram {
    fn set_bkg_tiles(&mut self, offset: u16, tiles: &[u8]) {
        for (i, &tile) in tiles.iter().enumerate() {
            let index = (usize::from(offset) + i) % SURFACE_CELLS;
            self.bkg_tiles[index] = tile;
        }
    }

    fn set_bkg_tile(&mut self, col: u8, row: u8, tile: u8) {
        self.bkg_tiles[surface_index(col, row)] = tile;
    }

    fn set_bkg_attr(&mut self, col: u8, row: u8, attr: u8) {
        self.bkg_attrs[surface_index(col, row)] = attr;
    }

    fn set_win_tile(&mut self, col: u8, row: u8, tile: u8) {
        self.win_tiles[surface_index(col, row)] = tile;
    }

    fn set_win_attr(&mut self, col: u8, row: u8, attr: u8) {
        self.win_attrs[surface_index(col, row)] = attr;
    }

    fn set_window_visible(&mut self, visible: bool) {
        self.window_visible = visible;
    }

    fn move_window(&mut self, x: u8, y: u8) {
        self.window_position = (x, y);
    }

    fn set_sprite_tile(&mut self, slot: u8, tile: u8) {
        if let Some(entry) = self.oam_slot_mut(slot) {
            entry.tile = tile;
        }
    }

    fn set_sprite_attr(&mut self, slot: u8, attr: SpriteAttr) {
        if let Some(entry) = self.oam_slot_mut(slot) {
            entry.attr = attr;
        }
    }

    fn move_sprite(&mut self, slot: u8, x: u8, y: u8) {
        if let Some(entry) = self.oam_slot_mut(slot) {
            entry.x = x;
            entry.y = y;
        }
    }

    fn set_scroll(&mut self, x: u8, y: u8) {
        self.scroll = (x, y);
    }
}

fn surface_index(col: u8, row: u8) -> usize {
    let size = usize::from(BKG_SIZE);
    (usize::from(row) % size) * size + usize::from(col) % size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_and_flip_compose() {
        let attr = SpriteAttr::empty().with_palette(1).with_flip_x(true);
        assert_eq!(attr.palette(), 1);
        assert!(attr.contains(SpriteAttr::FLIP_X));

        let unflipped = attr.with_flip_x(false);
        assert_eq!(unflipped.palette(), 1);
        assert!(!unflipped.contains(SpriteAttr::FLIP_X));
        assert_eq!(attr.with_palette(9).palette(), 1);
    }

    #[test]
    fn background_writes_wrap_around_surface() {
        let mut vram = ShadowVram::new();
        vram.set_bkg_tile(33, 1, 7);
        assert_eq!(vram.bkg_tile(1, 1), 7);

        vram.set_bkg_tiles(1023, &[4, 5]);
        assert_eq!(vram.bkg_tile(31, 31), 4);
        assert_eq!(vram.bkg_tile(0, 0), 5);
    }

    #[test]
    fn block_write_is_row_major() {
        let mut vram = ShadowVram::new();
        vram.set_bkg_tiles(32 * 2 + 30, &[1, 2, 3]);
        assert_eq!(vram.bkg_tile(30, 2), 1);
        assert_eq!(vram.bkg_tile(31, 2), 2);
        assert_eq!(vram.bkg_tile(0, 3), 3);
    }

    #[test]
    fn out_of_range_oam_slot_is_ignored() {
        let mut vram = ShadowVram::new();
        vram.move_sprite(40, 10, 10);
        vram.set_sprite_tile(200, 3);
        assert!(vram.oam(40).is_none());
    }

    #[test]
    fn origin_slot_is_off_screen() {
        let mut vram = ShadowVram::new();
        vram.move_sprite(0, 0, 0);
        assert!(!vram.oam(0).expect("slot 0").is_on_screen());
        vram.move_sprite(0, 8, 16);
        assert!(vram.oam(0).expect("slot 0").is_on_screen());
    }

    #[test]
    fn read_text_decodes_font_tiles() {
        let mut vram = ShadowVram::new();
        for (i, c) in "HI!".bytes().enumerate() {
            vram.set_win_tile(2 + i as u8, 0, 16 + (c - 32));
        }
        assert_eq!(vram.read_text(Plane::Window, 2, 0, 3, 16), "HI!");
    }

    #[test]
    fn plane_helpers_route_writes() {
        let mut vram = ShadowVram::new();
        vram.set_tile(Plane::Window, 3, 4, 9);
        vram.set_attr(Plane::Background, 3, 4, 2);
        assert_eq!(vram.win_tile(3, 4), 9);
        assert_eq!(vram.bkg_tile(3, 4), 0);
        assert_eq!(vram.bkg_attr(3, 4), 2);
    }
}
