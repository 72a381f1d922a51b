//! Fixed-capacity sprite arena.
//!
//! The pool owns every [`Sprite`] record. Controllers hold a [`SpriteHandle`]
//! (slot index plus generation) and go through the pool for every access, so
//! a handle kept across `init()` or `free()` simply stops resolving instead
//! of aliasing whatever reuses the slot.

use std::fmt;

use meadow_core::video::{HW_SPRITE_X_OFFSET, HW_SPRITE_Y_OFFSET, TILE_SIZE};
use meadow_core::VideoOutput;

use crate::collision;
use crate::sprite::Sprite;

pub const POOL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    index: u8,
    generation: u32,
}

impl SpriteHandle {
    pub fn index(&self) -> usize {
        usize::from(self.index)
    }
}

/// Parameters for [`SpritePool::alloc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteDesc {
    pub hw_slot: u8,
    pub slot_count: u8,
    pub width: u8,
    pub height: u8,
    pub tile_base: u8,
    pub tiles_per_frame: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    Full,
    /// The requested hardware slot range overlaps an active sprite.
    SlotConflict { hw_slot: u8 },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "sprite pool is full ({POOL_CAPACITY} slots)"),
            Self::SlotConflict { hw_slot } => {
                write!(f, "hardware sprite slot {hw_slot} is already in use")
            }
        }
    }
}

impl std::error::Error for PoolError {}

#[derive(Debug, Clone)]
pub struct SpritePool {
    slots: [Sprite; POOL_CAPACITY],
    generations: [u32; POOL_CAPACITY],
}

impl Default for SpritePool {
    fn default() -> Self {
        Self::new()
    }
}

impl SpritePool {
    pub fn new() -> Self {
        Self {
            slots: [Sprite::default(); POOL_CAPACITY],
            generations: [0; POOL_CAPACITY],
        }
    }

    /// Mark every slot inactive. Outstanding handles stop resolving.
    pub fn init(&mut self) {
        for sprite in &mut self.slots {
            sprite.active = false;
        }
    }

    pub fn alloc(&mut self, desc: SpriteDesc) -> Result<SpriteHandle, PoolError> {
        let requested = desc.hw_slot..desc.hw_slot.saturating_add(desc.slot_count.max(1));
        let conflict = self.slots.iter().filter(|s| s.active).any(|s| {
            let taken = s.hw_slots();
            requested.start < taken.end && taken.start < requested.end
        });
        if conflict {
            let err = PoolError::SlotConflict {
                hw_slot: desc.hw_slot,
            };
            log::warn!("Sprite allocation rejected: {err}");
            return Err(err);
        }

        let Some(index) = self.slots.iter().position(|s| !s.active) else {
            log::warn!("Sprite allocation rejected: {}", PoolError::Full);
            return Err(PoolError::Full);
        };

        self.slots[index] = Sprite {
            hw_slot: desc.hw_slot,
            slot_count: desc.slot_count.max(1),
            width: desc.width,
            height: desc.height,
            tile_base: desc.tile_base,
            tiles_per_frame: desc.tiles_per_frame,
            active: true,
            ..Sprite::default()
        };
        self.generations[index] = self.generations[index].wrapping_add(1);

        let handle = SpriteHandle {
            index: index as u8,
            generation: self.generations[index],
        };
        log::trace!(
            "Allocated sprite {} on hardware slot(s) {:?}",
            index,
            self.slots[index].hw_slots()
        );
        Ok(handle)
    }

    /// Release a sprite and park its hardware slots at (0, 0), off the
    /// visible window. `None` and stale handles are ignored.
    pub fn free(&mut self, handle: Option<SpriteHandle>, video: &mut dyn VideoOutput) {
        let Some(sprite) = handle.and_then(|h| self.get_mut(h)) else {
            return;
        };
        sprite.active = false;
        for slot in sprite.hw_slots() {
            video.move_sprite(slot, 0, 0);
        }
    }

    pub fn get(&self, handle: SpriteHandle) -> Option<&Sprite> {
        let index = handle.index();
        if self.generations.get(index) != Some(&handle.generation) {
            return None;
        }
        self.slots.get(index).filter(|s| s.active)
    }

    pub fn get_mut(&mut self, handle: SpriteHandle) -> Option<&mut Sprite> {
        let index = handle.index();
        if self.generations.get(index) != Some(&handle.generation) {
            return None;
        }
        self.slots.get_mut(index).filter(|s| s.active)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Project the sprite's world position into hardware space and move its
    /// slot(s). Two-slot sprites place the second unit one tile to the right.
    pub fn update_hardware(
        &self,
        handle: SpriteHandle,
        camera_x: i32,
        camera_y: i32,
        video: &mut dyn VideoOutput,
    ) {
        let Some(sprite) = self.get(handle) else {
            return;
        };
        let hw_x = sprite.x - camera_x + HW_SPRITE_X_OFFSET;
        let hw_y = (sprite.y - camera_y + HW_SPRITE_Y_OFFSET) as u8;
        for (i, slot) in sprite.hw_slots().enumerate() {
            let x = (hw_x + i as i32 * TILE_SIZE) as u8;
            video.move_sprite(slot, x, hw_y);
        }
    }

    pub fn collide(&self, a: SpriteHandle, b: SpriteHandle) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => collision::collide(a, b),
            _ => false,
        }
    }

    /// First active sprite other than `handle` whose hitbox overlaps it.
    pub fn first_collision(&self, handle: SpriteHandle) -> Option<SpriteHandle> {
        let me = self.get(handle)?;
        self.slots
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != handle.index())
            .find(|(_, other)| collision::collide(me, other))
            .map(|(index, _)| SpriteHandle {
                index: index as u8,
                generation: self.generations[index],
            })
    }
}
