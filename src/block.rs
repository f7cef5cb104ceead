use crate::{
	audio_block::AudioBlock, button::Button, context::Context, rules::ReactiveRules,
	visual_block::VisualBlock,
};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::debug;

new_key_type! {
	pub struct BlockId;
	pub struct GroupId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnabledState {
	Enabled,
	Disabled,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowState {
	Showing,
	Hiding,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverState {
	Hovering,
	NotHovering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
	Button,
	Audio,
	Image,
	Model,
	Video,
}

/// Something the host can ask any block to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
	Show,
	Hide,
	ForceShow,
	ForceHide,
	Enable,
	Disable,
	/// Kind specific activation (an audio block plays)
	Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockEventKind {
	Enabled,
	Disabled,
	Shown,
	Hidden,
	ForceShown,
	ForceHidden,
	ColliderEnter,
	ColliderHover,
	ColliderExit,
	Selected,
	Called,
	PlaybackStarted,
	PlaybackStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockEvent {
	pub block: BlockId,
	pub kind: BlockEventKind,
}

/// What other blocks are told about a block that was selected or looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockNotice {
	pub block: BlockId,
	pub group: Option<GroupId>,
	pub kind: BlockKind,
}

/// State every block kind shares.
#[derive(Debug)]
pub struct BlockCore {
	id: BlockId,
	name: String,
	pub(crate) group: Option<GroupId>,
	pub(crate) enabled: EnabledState,
	pub(crate) shown: ShowState,
	pub(crate) hover: HoverState,
	pub(crate) rules: ReactiveRules,
}
impl BlockCore {
	pub(crate) fn new(id: BlockId, name: String, group: Option<GroupId>) -> Self {
		BlockCore {
			id,
			name,
			group,
			enabled: EnabledState::Enabled,
			shown: ShowState::Showing,
			hover: HoverState::NotHovering,
			rules: ReactiveRules::default(),
		}
	}

	pub fn id(&self) -> BlockId {
		self.id
	}
	pub fn name(&self) -> &str {
		&self.name
	}
	pub fn group(&self) -> Option<GroupId> {
		self.group
	}
	pub fn enabled_state(&self) -> EnabledState {
		self.enabled
	}
	pub fn show_state(&self) -> ShowState {
		self.shown
	}
	pub fn hover_state(&self) -> HoverState {
		self.hover
	}
	pub fn rules(&self) -> &ReactiveRules {
		&self.rules
	}

	pub fn is_disabled(&self) -> bool {
		self.enabled == EnabledState::Disabled
	}
	pub fn is_hiding(&self) -> bool {
		self.shown == ShowState::Hiding
	}
	pub fn is_hovering(&self) -> bool {
		self.hover == HoverState::Hovering
	}
}

/// The capability every block kind exposes to the session.
///
/// Transitions take the session's [`Context`] so they can reach the focus
/// registry, timers, tweens, audio and visuals without owning any of them.
pub trait Interactable {
	fn kind(&self) -> BlockKind;
	fn core(&self) -> &BlockCore;
	fn core_mut(&mut self) -> &mut BlockCore;

	fn show(&mut self, ctx: &mut Context);
	fn force_show(&mut self, ctx: &mut Context);
	fn hide(&mut self, ctx: &mut Context);
	fn force_hide(&mut self, ctx: &mut Context);
	fn enable(&mut self, ctx: &mut Context);
	fn disable(&mut self, ctx: &mut Context);

	fn call(&mut self, ctx: &mut Context) {
		ctx.emit(self.core().id(), BlockEventKind::Called);
	}
	/// Once per frame, so late resources can finish any deferred work.
	fn poll_resources(&mut self, _ctx: &mut Context) {}

	/// Another block was selected. Evaluates the reactive rules by default.
	fn other_block_selected(&mut self, notice: &BlockNotice, ctx: &mut Context) {
		self.apply_rules(notice, ctx);
	}
	fn other_gaze_entered(&mut self, _notice: &BlockNotice, _ctx: &mut Context) {}
	fn other_gaze_exited(&mut self, _notice: &BlockNotice, _ctx: &mut Context) {}

	/// Release everything the block holds in the context before it's removed.
	fn prepare_for_destroy(&mut self, ctx: &mut Context);

	fn apply_rules(&mut self, notice: &BlockNotice, ctx: &mut Context) {
		let core = self.core();
		let responses = core.rules.responses(core.id(), core.group(), notice);
		for command in responses {
			debug!(block = ?self.core().id(), selected = ?notice.block, ?command, "reactive rule matched");
			self.send_command(command, ctx);
		}
	}

	fn send_command(&mut self, command: Command, ctx: &mut Context) {
		match command {
			Command::Show => self.show(ctx),
			Command::Hide => self.hide(ctx),
			Command::ForceShow => self.force_show(ctx),
			Command::ForceHide => self.force_hide(ctx),
			Command::Enable => self.enable(ctx),
			Command::Disable => self.disable(ctx),
			Command::Call => self.call(ctx),
		}
	}
}

pub enum Block {
	Button(Button),
	Audio(AudioBlock),
	Visual(VisualBlock),
}
impl Block {
	pub fn interactable(&self) -> &dyn Interactable {
		match self {
			Block::Button(button) => button,
			Block::Audio(audio) => audio,
			Block::Visual(visual) => visual,
		}
	}
	pub fn interactable_mut(&mut self) -> &mut dyn Interactable {
		match self {
			Block::Button(button) => button,
			Block::Audio(audio) => audio,
			Block::Visual(visual) => visual,
		}
	}

	pub fn core(&self) -> &BlockCore {
		self.interactable().core()
	}
	pub fn kind(&self) -> BlockKind {
		self.interactable().kind()
	}
	pub fn notice(&self) -> BlockNotice {
		let core = self.core();
		BlockNotice {
			block: core.id(),
			group: core.group(),
			kind: self.kind(),
		}
	}

	pub fn as_button(&self) -> Option<&Button> {
		match self {
			Block::Button(button) => Some(button),
			_ => None,
		}
	}
	pub fn as_button_mut(&mut self) -> Option<&mut Button> {
		match self {
			Block::Button(button) => Some(button),
			_ => None,
		}
	}
	pub fn as_audio(&self) -> Option<&AudioBlock> {
		match self {
			Block::Audio(audio) => Some(audio),
			_ => None,
		}
	}
	pub fn as_visual(&self) -> Option<&VisualBlock> {
		match self {
			Block::Visual(visual) => Some(visual),
			_ => None,
		}
	}
}

/// A focus scope. Holds ids only, blocks are owned by the session.
#[derive(Debug, Clone)]
pub struct Group {
	name: String,
	pub(crate) blocks: Vec<BlockId>,
}
impl Group {
	pub(crate) fn new(name: String) -> Self {
		Group {
			name,
			blocks: Vec::new(),
		}
	}
	pub fn name(&self) -> &str {
		&self.name
	}
	pub fn blocks(&self) -> &[BlockId] {
		&self.blocks
	}
	pub fn contains(&self, block: BlockId) -> bool {
		self.blocks.contains(&block)
	}
}
