//! Gaze and pointer driven block widgets: buttons with dwell selection, audio
//! players and plain content blocks that react to each other's selection.

pub mod audio;
pub mod audio_block;
pub mod block;
pub mod button;
mod context;
pub mod error;
pub mod focus;
pub mod loader;
pub mod rules;
mod session;
pub mod timer;
pub mod tween;
pub mod visual_block;
pub mod visuals;

#[cfg(test)]
mod testing;

pub use block::{BlockId, GroupId};
pub use context::*;
pub use error::*;
pub use session::*;
