use crate::BlockId;
use serde::{Deserialize, Serialize};

/// A piece of a block the renderer styles independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decoration {
	CenterImage,
	BackgroundImage,
	ParallaxImage,
	Text,
	/// The dwell progress indicator
	FillImage,
	FillBackground,
	/// Main content of an image, model or video block
	Content,
}
impl Decoration {
	pub const BUTTON: [Decoration; 6] = [
		Decoration::CenterImage,
		Decoration::BackgroundImage,
		Decoration::ParallaxImage,
		Decoration::Text,
		Decoration::FillImage,
		Decoration::FillBackground,
	];

	pub fn is_fill(self) -> bool {
		matches!(self, Decoration::FillImage | Decoration::FillBackground)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
	Show,
	Hide,
	HoverEnter,
	HoverExit,
	Enabled,
	Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
	/// Tween toward the state
	Animate,
	/// Snap to it this frame
	Force,
}

/// The renderer side of a block. Implementations own meshes, materials,
/// colliders and whatever animation they use to move between states.
pub trait Visuals {
	fn set_decoration(
		&mut self,
		block: BlockId,
		decoration: Decoration,
		state: VisualState,
		transition: Transition,
	);
	fn set_collider(&mut self, block: BlockId, enabled: bool);
	fn set_idle_animation(&mut self, block: BlockId, playing: bool);
	fn set_gaze_growable(&mut self, block: BlockId, enabled: bool);
	/// `amount` is the normalized dwell progress shown by the fill decoration.
	fn set_fill_amount(&mut self, block: BlockId, amount: f32);
	/// The block is gone, release anything held for it.
	fn forget(&mut self, _block: BlockId) {}
}

/// Visuals for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVisuals;
impl Visuals for NoVisuals {
	fn set_decoration(&mut self, _: BlockId, _: Decoration, _: VisualState, _: Transition) {}
	fn set_collider(&mut self, _: BlockId, _: bool) {}
	fn set_idle_animation(&mut self, _: BlockId, _: bool) {}
	fn set_gaze_growable(&mut self, _: BlockId, _: bool) {}
	fn set_fill_amount(&mut self, _: BlockId, _: f32) {}
}
