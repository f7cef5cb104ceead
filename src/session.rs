use crate::{
	audio::{AudioService, SourceId},
	audio_block::{AudioBlock, AudioBlockSettings},
	block::{Block, BlockCore, BlockEvent, BlockEventKind, BlockNotice, Command, Group, Interactable},
	button::{Button, ButtonSettings, DwellStart},
	context::Context,
	error::BlockError,
	focus::FocusRegistry,
	loader::ResourceLoader,
	rules::ReactiveRules,
	timer::Action,
	tween::{TweenProperty, TweenStep},
	visual_block::{VisualBlock, VisualBlockSettings},
	visuals::Visuals,
	BlockId, GroupId,
};
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

struct StartState {
	enabled: bool,
	visible: bool,
	command: Option<Command>,
}

/// Owns every block and group of one scene, plus the shared [`Context`].
///
/// Single threaded and frame driven: feed it input as it arrives and call
/// [`Session::update`] once per frame.
pub struct Session {
	blocks: SlotMap<BlockId, Block>,
	groups: SlotMap<GroupId, Group>,
	ctx: Context,
}
impl Session {
	pub fn new(
		audio: impl AudioService + 'static,
		visuals: impl Visuals + 'static,
		loader: impl ResourceLoader + 'static,
	) -> Self {
		Session {
			blocks: SlotMap::with_key(),
			groups: SlotMap::with_key(),
			ctx: Context::new(Box::new(audio), Box::new(visuals), Box::new(loader)),
		}
	}

	pub fn create_group(&mut self, name: impl ToString) -> GroupId {
		let id = self.groups.insert(Group::new(name.to_string()));
		debug!(group = ?id, "group created");
		id
	}
	/// Removes the group. Its blocks stay alive but belong to no group, so they
	/// can't be selected until they're recreated elsewhere.
	pub fn remove_group(&mut self, id: GroupId) -> Result<(), BlockError> {
		let group = self.groups.remove(id).ok_or(BlockError::UnknownGroup(id))?;
		for block_id in group.blocks {
			let Some(block) = self.blocks.get_mut(block_id) else {
				continue;
			};
			if let Block::Button(button) = block {
				button.cancel_dwell(&mut self.ctx);
			}
			block.interactable_mut().core_mut().group = None;
		}
		self.ctx.focus.forget_group(id);
		debug!(group = ?id, "group removed");
		Ok(())
	}

	/// Release a group's focus so its buttons can be selected again.
	pub fn clear_focus(&mut self, group: GroupId) {
		if !self.groups.contains_key(group) {
			warn!(?group, "clear focus on unknown group ignored");
			return;
		}
		debug!(?group, "focus cleared");
		self.ctx.focus.clear_focus(group);
	}

	pub fn create_button(
		&mut self,
		group: Option<GroupId>,
		name: impl ToString,
		settings: ButtonSettings,
	) -> Result<BlockId, BlockError> {
		settings.validate()?;
		let start = StartState {
			enabled: settings.enabled_at_start,
			visible: settings.visible_at_start,
			command: settings.command_on_start,
		};
		self.insert(group, name.to_string(), start, |core, ctx| {
			Block::Button(Button::new(core, settings, ctx))
		})
	}
	pub fn create_audio(
		&mut self,
		group: Option<GroupId>,
		name: impl ToString,
		settings: AudioBlockSettings,
	) -> Result<BlockId, BlockError> {
		settings.validate()?;
		let start = StartState {
			enabled: settings.enabled_at_start,
			visible: settings.visible_at_start,
			command: settings.command_on_start,
		};
		self.insert(group, name.to_string(), start, |core, ctx| {
			Block::Audio(AudioBlock::new(core, settings, ctx))
		})
	}
	pub fn create_visual(
		&mut self,
		group: Option<GroupId>,
		name: impl ToString,
		settings: VisualBlockSettings,
	) -> Result<BlockId, BlockError> {
		let start = StartState {
			enabled: settings.enabled_at_start,
			visible: settings.visible_at_start,
			command: settings.command_on_start,
		};
		self.insert(group, name.to_string(), start, |core, _| {
			Block::Visual(VisualBlock::new(core, settings))
		})
	}

	fn insert(
		&mut self,
		group: Option<GroupId>,
		name: String,
		start: StartState,
		build: impl FnOnce(BlockCore, &mut Context) -> Block,
	) -> Result<BlockId, BlockError> {
		if let Some(group) = group {
			if !self.groups.contains_key(group) {
				return Err(BlockError::UnknownGroup(group));
			}
		}
		let ctx = &mut self.ctx;
		let id = self
			.blocks
			.insert_with_key(|id| build(BlockCore::new(id, name, group), ctx));
		if let Some(group) = group.and_then(|group| self.groups.get_mut(group)) {
			group.blocks.push(id);
		}
		debug!(block = ?id, ?group, "block created");

		if let Some(block) = self.blocks.get_mut(id) {
			let block = block.interactable_mut();
			if start.visible {
				block.force_show(&mut self.ctx);
			} else {
				block.force_hide(&mut self.ctx);
			}
			if !start.enabled {
				block.disable(&mut self.ctx);
			}
			if let Some(command) = start.command {
				block.send_command(command, &mut self.ctx);
			}
		}
		Ok(id)
	}

	/// Replace a block's reactive rules. Every block or group they name must exist.
	pub fn set_rules(&mut self, id: BlockId, rules: ReactiveRules) -> Result<(), BlockError> {
		rules.validate()?;
		if let Some(missing) = rules
			.referenced_blocks()
			.find(|block| !self.blocks.contains_key(*block))
		{
			return Err(BlockError::UnknownBlock(missing));
		}
		if let Some(missing) = rules
			.referenced_groups()
			.find(|group| !self.groups.contains_key(*group))
		{
			return Err(BlockError::UnknownGroup(missing));
		}
		let block = self.blocks.get_mut(id).ok_or(BlockError::UnknownBlock(id))?;
		block.interactable_mut().core_mut().rules = rules;
		Ok(())
	}

	/// Cancels everything the block has in flight, then removes it.
	pub fn destroy(&mut self, id: BlockId) -> Result<(), BlockError> {
		let mut block = self.blocks.remove(id).ok_or(BlockError::UnknownBlock(id))?;
		block.interactable_mut().prepare_for_destroy(&mut self.ctx);
		if let Some(group) = block.core().group().and_then(|group| self.groups.get_mut(group)) {
			group.blocks.retain(|block| *block != id);
		}
		debug!(block = ?id, "block destroyed");
		Ok(())
	}

	pub fn send_command(&mut self, id: BlockId, command: Command) {
		match self.blocks.get_mut(id) {
			Some(block) => block
				.interactable_mut()
				.send_command(command, &mut self.ctx),
			None => warn!(block = ?id, ?command, "command for unknown block ignored"),
		}
	}

	pub fn pointer_enter(&mut self, id: BlockId) {
		self.with_button(id, |button, ctx| button.pointer_enter(ctx));
	}
	pub fn pointer_over(&mut self, id: BlockId) {
		self.with_button(id, |button, ctx| button.pointer_over(ctx));
	}
	pub fn pointer_exit(&mut self, id: BlockId) {
		self.with_button(id, |button, ctx| button.pointer_exit(ctx));
	}
	/// An explicit click or tap.
	pub fn pointer_down(&mut self, id: BlockId) {
		if self.button(id).is_some_and(|button| button.accepts_click(&self.ctx)) {
			self.commit_selection(id);
		}
	}
	/// A discrete confirm while the button is being gazed at.
	pub fn pointer_down_during_gaze(&mut self, id: BlockId) {
		if self
			.button(id)
			.is_some_and(|button| button.accepts_gaze_click(&self.ctx))
		{
			self.commit_selection(id);
		}
	}

	pub fn gaze_enter(&mut self, id: BlockId) {
		let Some(button) = self.button_or_warn(id) else {
			return;
		};
		let Some(group) = button.gaze_enter_group(&self.ctx) else {
			return;
		};
		self.with_button(id, |button, ctx| button.enable_hover_state(ctx));
		self.broadcast(id, |block, notice, ctx| block.other_gaze_entered(notice, ctx));

		let Some(button) = self.blocks.get_mut(id).and_then(Block::as_button_mut) else {
			return;
		};
		if button.begin_dwell(group, &mut self.ctx) == DwellStart::Complete {
			self.commit_selection(id);
		}
	}
	pub fn gaze_exit(&mut self, id: BlockId) {
		let Some(button) = self.button_or_warn(id) else {
			return;
		};
		if !button.accepts_gaze_exit() {
			return;
		}
		self.broadcast(id, |block, notice, ctx| block.other_gaze_exited(notice, ctx));
		self.with_button(id, |button, ctx| button.end_gaze(ctx));
	}

	/// Advance the frame: finish resource loads, step tweens, then fire timers.
	pub fn update(&mut self, delta: f32) {
		for block in self.blocks.values_mut() {
			block.interactable_mut().poll_resources(&mut self.ctx);
		}
		for step in self.ctx.tweens.update(delta) {
			self.apply_tween_step(step);
		}
		self.ctx.timers.advance(delta);
		while let Some(action) = self.ctx.timers.pop_due() {
			self.dispatch(action);
		}
	}

	pub fn block(&self, id: BlockId) -> Option<&Block> {
		self.blocks.get(id)
	}
	pub fn button(&self, id: BlockId) -> Option<&Button> {
		self.blocks.get(id).and_then(Block::as_button)
	}
	pub fn audio(&self, id: BlockId) -> Option<&AudioBlock> {
		self.blocks.get(id).and_then(Block::as_audio)
	}
	pub fn visual(&self, id: BlockId) -> Option<&VisualBlock> {
		self.blocks.get(id).and_then(Block::as_visual)
	}
	pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
		self.blocks.iter()
	}
	pub fn group(&self, id: GroupId) -> Option<&Group> {
		self.groups.get(id)
	}
	pub fn focus(&self) -> &FocusRegistry {
		&self.ctx.focus
	}
	pub fn context(&self) -> &Context {
		&self.ctx
	}
	/// Seconds of simulated time so far.
	pub fn now(&self) -> f64 {
		self.ctx.timers.now()
	}
	pub fn drain_events(&mut self) -> Vec<BlockEvent> {
		self.ctx.drain_events()
	}

	fn button_or_warn(&self, id: BlockId) -> Option<&Button> {
		let button = self.button(id);
		if button.is_none() {
			warn!(block = ?id, "input for unknown button ignored");
		}
		button
	}
	fn with_button(&mut self, id: BlockId, f: impl FnOnce(&mut Button, &mut Context)) {
		match self.blocks.get_mut(id).and_then(Block::as_button_mut) {
			Some(button) => f(button, &mut self.ctx),
			None => warn!(block = ?id, "input for unknown button ignored"),
		}
	}

	/// Siblings in the sender's group first, then everything else in the
	/// session. The sender itself is never a recipient.
	fn recipients(&self, notice: &BlockNotice) -> Vec<BlockId> {
		let siblings = notice
			.group
			.and_then(|group| self.groups.get(group))
			.map(|group| group.blocks.clone())
			.unwrap_or_default();
		let others = self.blocks.keys().filter(|id| !siblings.contains(id));
		siblings
			.iter()
			.copied()
			.chain(others)
			.filter(|id| *id != notice.block)
			.collect()
	}
	fn broadcast(
		&mut self,
		from: BlockId,
		mut deliver: impl FnMut(&mut dyn Interactable, &BlockNotice, &mut Context),
	) {
		let Some(notice) = self.blocks.get(from).map(Block::notice) else {
			return;
		};
		for target in self.recipients(&notice) {
			if let Some(block) = self.blocks.get_mut(target) {
				deliver(block.interactable_mut(), &notice, &mut self.ctx);
			}
		}
	}

	/// Focus the button, tell everyone else, then let it react to itself.
	fn commit_selection(&mut self, id: BlockId) {
		let Some(group) = self.blocks.get(id).and_then(|block| block.core().group()) else {
			trace!(block = ?id, "selection without a group ignored");
			return;
		};
		debug!(block = ?id, ?group, "selection committed");
		self.ctx.focus.clear_gaze_target(group, id);
		self.ctx.focus.set_focus(group, id);
		self.broadcast(id, |block, notice, ctx| block.other_block_selected(notice, ctx));
		self.with_button(id, |button, ctx| {
			button.apply_selection_response(ctx);
			button.finish_selection(ctx);
		});
	}

	fn apply_tween_step(&mut self, step: TweenStep) {
		match step.property {
			TweenProperty::Fill(id) => {
				if let Some(button) = self.blocks.get_mut(id).and_then(Block::as_button_mut) {
					button.set_fill(step.value, &mut self.ctx);
				}
			}
			TweenProperty::Volume(source) => self.ctx.mixer.set_volume(source, step.value),
			TweenProperty::Pitch(source) => self.ctx.mixer.set_pitch(source, step.value),
		}
		if let Some(action) = step.completed {
			self.dispatch(action);
		}
	}

	fn dispatch(&mut self, action: Action) {
		trace!(?action, "dispatching");
		match action {
			Action::FadeOutFillSound(id) => self.with_button(id, |button, ctx| {
				if button.is_filling() {
					button.fade_out_fill_sound(ctx);
				}
			}),
			Action::CompleteDwell(id) => {
				let Some(button) = self.blocks.get_mut(id).and_then(Block::as_button_mut) else {
					return;
				};
				if !button.accepts_dwell_completion() {
					trace!(block = ?id, "dwell completion ignored");
					return;
				}
				button.mark_completing();
				self.commit_selection(id);
			}
			Action::StopSource(source) => {
				if !self.ctx.mixer.is_playing(source) {
					return;
				}
				self.ctx.stop_source(source);
				if let SourceId::Playback(block) = source {
					self.ctx.emit(block, BlockEventKind::PlaybackStopped);
				}
			}
		}
	}
}
