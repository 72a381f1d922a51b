//! Axis-aligned rectangle overlap between sprite hitboxes.
//!
//! Rectangles are half-open in pixel space: a box at x=0 with w=8 covers
//! pixels 0..=7, so two boxes whose edges merely touch do not overlap.

use crate::sprite::Sprite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Aabb {
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Hitbox overlap between two sprites. Inactive sprites never collide.
pub fn collide(a: &Sprite, b: &Sprite) -> bool {
    if !a.active || !b.active {
        return false;
    }
    a.hitbox_rect().overlaps(&b.hitbox_rect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::{Hitbox, Sprite};

    fn sprite_at(x: i32, y: i32, width: u8, height: u8) -> Sprite {
        Sprite {
            x,
            y,
            width,
            height,
            active: true,
            ..Sprite::default()
        }
    }

    #[test]
    fn disjoint_boxes_do_not_collide() {
        let a = sprite_at(0, 0, 8, 8);
        let b = sprite_at(40, 40, 8, 8);
        assert!(!collide(&a, &b));
        assert!(!collide(&b, &a));
    }

    #[test]
    fn overlapping_boxes_collide() {
        let a = sprite_at(0, 0, 8, 8);
        let b = sprite_at(7, 7, 8, 8);
        assert!(collide(&a, &b));
        assert!(collide(&b, &a));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = sprite_at(0, 0, 8, 8);
        assert!(!collide(&a, &sprite_at(8, 0, 8, 8)));
        assert!(!collide(&a, &sprite_at(-8, 0, 8, 8)));
        assert!(!collide(&a, &sprite_at(0, 8, 8, 8)));
        assert!(!collide(&a, &sprite_at(0, -8, 8, 8)));
    }

    #[test]
    fn inactive_sprite_never_collides() {
        let a = sprite_at(0, 0, 8, 8);
        let mut b = sprite_at(0, 0, 8, 8);
        b.active = false;
        assert!(!collide(&a, &b));
        assert!(!collide(&b, &a));
    }

    #[test]
    fn hitbox_overrides_visual_size() {
        let mut a = sprite_at(0, 0, 16, 16);
        a.hitbox = Hitbox { x: 4, y: 4, w: 8, h: 8 };
        // Inside the visual rect but left of the shrunken hitbox.
        assert!(!collide(&a, &sprite_at(0, 0, 4, 4)));
        assert!(collide(&a, &sprite_at(5, 5, 2, 2)));
    }

    #[test]
    fn player_and_enemy_sized_boxes() {
        let player = sprite_at(100, 64, 16, 16);
        let enemy = sprite_at(100, 64, 8, 8);
        assert!(collide(&player, &enemy));

        let enemy_far = sprite_at(120, 64, 8, 8);
        assert!(!collide(&player, &enemy_far));
        let player_far = sprite_at(80, 64, 16, 16);
        assert!(!collide(&player_far, &enemy));
    }

    #[test]
    fn empty_rect_never_overlaps() {
        let zero = Aabb { x: 0, y: 0, w: 0, h: 8 };
        let full = Aabb { x: 0, y: 0, w: 8, h: 8 };
        assert!(!zero.overlaps(&full));
        assert!(!full.overlaps(&zero));
    }
}
