use crate::{
	block::{BlockCore, BlockEventKind, BlockKind, Command, EnabledState, Interactable, ShowState},
	context::Context,
	visuals::{Decoration, Transition, VisualState},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
	#[default]
	Image,
	Model,
	Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualBlockSettings {
	pub kind: VisualKind,
	/// Apply the disabled look instead of leaving the content as is
	pub change_on_disable: bool,
	pub enabled_at_start: bool,
	pub visible_at_start: bool,
	pub command_on_start: Option<Command>,
}
impl Default for VisualBlockSettings {
	fn default() -> Self {
		Self {
			kind: VisualKind::Image,
			change_on_disable: false,
			enabled_at_start: true,
			visible_at_start: true,
			command_on_start: None,
		}
	}
}

/// Image, model or video content with no input of its own. It still follows
/// reactive rules, so buttons can reveal or hide it.
pub struct VisualBlock {
	core: BlockCore,
	settings: VisualBlockSettings,
}
impl VisualBlock {
	pub(crate) fn new(core: BlockCore, settings: VisualBlockSettings) -> Self {
		VisualBlock { core, settings }
	}
	pub fn settings(&self) -> &VisualBlockSettings {
		&self.settings
	}

	fn set_shown(&mut self, shown: ShowState, transition: Transition, ctx: &mut Context) {
		self.core.shown = shown;
		debug!(block = ?self.core.id(), ?shown, ?transition, "content visibility changed");
		let state = match shown {
			ShowState::Hiding => VisualState::Hide,
			ShowState::Showing if self.core.is_disabled() && self.settings.change_on_disable => {
				VisualState::Disabled
			}
			ShowState::Showing => VisualState::Show,
		};
		ctx.visuals
			.set_decoration(self.core.id(), Decoration::Content, state, transition);
	}
	fn set_enabled(&mut self, enabled: EnabledState, ctx: &mut Context) {
		self.core.enabled = enabled;
		if self.settings.change_on_disable {
			let state = match enabled {
				EnabledState::Enabled => VisualState::Enabled,
				EnabledState::Disabled => VisualState::Disabled,
			};
			ctx.restyle(&self.core, Decoration::Content, state, Transition::Animate);
		}
	}
}

impl Interactable for VisualBlock {
	fn kind(&self) -> BlockKind {
		match self.settings.kind {
			VisualKind::Image => BlockKind::Image,
			VisualKind::Model => BlockKind::Model,
			VisualKind::Video => BlockKind::Video,
		}
	}
	fn core(&self) -> &BlockCore {
		&self.core
	}
	fn core_mut(&mut self) -> &mut BlockCore {
		&mut self.core
	}

	fn show(&mut self, ctx: &mut Context) {
		self.set_shown(ShowState::Showing, Transition::Animate, ctx);
		ctx.emit(self.core.id(), BlockEventKind::Shown);
	}
	fn force_show(&mut self, ctx: &mut Context) {
		self.set_shown(ShowState::Showing, Transition::Force, ctx);
		ctx.emit(self.core.id(), BlockEventKind::ForceShown);
	}
	fn hide(&mut self, ctx: &mut Context) {
		self.set_shown(ShowState::Hiding, Transition::Animate, ctx);
		ctx.emit(self.core.id(), BlockEventKind::Hidden);
	}
	fn force_hide(&mut self, ctx: &mut Context) {
		self.set_shown(ShowState::Hiding, Transition::Force, ctx);
		ctx.emit(self.core.id(), BlockEventKind::ForceHidden);
	}
	fn enable(&mut self, ctx: &mut Context) {
		self.set_enabled(EnabledState::Enabled, ctx);
		ctx.emit(self.core.id(), BlockEventKind::Enabled);
	}
	fn disable(&mut self, ctx: &mut Context) {
		self.set_enabled(EnabledState::Disabled, ctx);
		ctx.emit(self.core.id(), BlockEventKind::Disabled);
	}

	fn prepare_for_destroy(&mut self, ctx: &mut Context) {
		ctx.release(self.core.id());
	}
}
