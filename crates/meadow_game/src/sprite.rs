use std::ops::Range;

use meadow_core::AnimationState;

use crate::collision::Aabb;

/// Collision rectangle relative to the sprite's top-left corner.
/// A zero width or height falls back to the sprite's visual size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hitbox {
    pub x: u8,
    pub y: u8,
    pub w: u8,
    pub h: u8,
}

/// One on-screen character, backed by one or two consecutive OAM slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sprite {
    pub hw_slot: u8,
    pub slot_count: u8,
    /// World-space top-left, independent of the camera.
    pub x: i32,
    pub y: i32,
    pub width: u8,
    pub height: u8,
    pub hitbox: Hitbox,
    pub tile_base: u8,
    pub tiles_per_frame: u8,
    pub anim: AnimationState,
    pub active: bool,
    /// Behaviour-specific scratch bytes.
    pub scratch: [u8; 4],
}

impl Sprite {
    pub fn hitbox_rect(&self) -> Aabb {
        self.hitbox_rect_at(self.x, self.y)
    }

    /// Hitbox as it would be with the sprite's top-left at (`x`, `y`).
    pub fn hitbox_rect_at(&self, x: i32, y: i32) -> Aabb {
        let w = if self.hitbox.w != 0 {
            self.hitbox.w
        } else {
            self.width
        };
        let h = if self.hitbox.h != 0 {
            self.hitbox.h
        } else {
            self.height
        };
        Aabb {
            x: x + i32::from(self.hitbox.x),
            y: y + i32::from(self.hitbox.y),
            w: i32::from(w),
            h: i32::from(h),
        }
    }

    pub fn hw_slots(&self) -> Range<u8> {
        self.hw_slot..self.hw_slot.saturating_add(self.slot_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hitbox_uses_visual_size() {
        let sprite = Sprite {
            x: 10,
            y: 20,
            width: 16,
            height: 8,
            ..Sprite::default()
        };
        assert_eq!(
            sprite.hitbox_rect(),
            Aabb {
                x: 10,
                y: 20,
                w: 16,
                h: 8
            }
        );
    }

    #[test]
    fn partial_hitbox_mixes_dimensions() {
        let sprite = Sprite {
            width: 16,
            height: 16,
            hitbox: Hitbox {
                x: 2,
                y: 0,
                w: 12,
                h: 0,
            },
            ..Sprite::default()
        };
        let rect = sprite.hitbox_rect_at(100, 50);
        assert_eq!(rect.x, 102);
        assert_eq!(rect.w, 12);
        assert_eq!(rect.h, 16);
    }

    #[test]
    fn hw_slots_cover_consecutive_units() {
        let sprite = Sprite {
            hw_slot: 4,
            slot_count: 2,
            ..Sprite::default()
        };
        assert_eq!(sprite.hw_slots().collect::<Vec<_>>(), vec![4, 5]);
    }
}
