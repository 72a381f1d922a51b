pub mod animation;
pub mod input;
pub mod video;

pub use animation::{AnimationClip, AnimationState};
pub use input::{Button, Buttons, InputState};
pub use video::{OamEntry, Plane, ShadowVram, SpriteAttr, VideoOutput};
