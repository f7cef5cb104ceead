mod dwell;
mod settings;

pub use dwell::*;
pub use settings::*;

use crate::{
	audio::{SoundResource, SourceId},
	block::{
		BlockCore, BlockEventKind, BlockKind, EnabledState, HoverState, Interactable, ShowState,
	},
	context::Context,
	tween::TweenProperty,
	visuals::{Decoration, Transition, VisualState},
	GroupId,
};
use tracing::{debug, trace};

struct Sounds {
	select: SoundResource,
	enter: SoundResource,
	exit: SoundResource,
	fill: SoundResource,
	/// The fill loop should start as soon as its clip finishes loading
	fill_requested: bool,
}

/// A block selected by clicking it or by looking at it long enough.
pub struct Button {
	core: BlockCore,
	settings: ButtonSettings,
	sounds: Sounds,
	dwell: Dwell,
}
impl Button {
	pub(crate) fn new(core: BlockCore, settings: ButtonSettings, ctx: &mut Context) -> Self {
		let loader = &mut *ctx.loader;
		let sounds = Sounds {
			select: SoundResource::load(settings.sounds.select.as_ref(), loader),
			enter: SoundResource::load(settings.sounds.enter.as_ref(), loader),
			exit: SoundResource::load(settings.sounds.exit.as_ref(), loader),
			fill: SoundResource::load(settings.sounds.fill.as_ref().map(|f| &f.sound), loader),
			fill_requested: false,
		};
		Button {
			core,
			settings,
			sounds,
			dwell: Dwell::default(),
		}
	}

	pub fn settings(&self) -> &ButtonSettings {
		&self.settings
	}
	/// Current value of the fill decoration.
	pub fn fill_amount(&self) -> f32 {
		self.dwell.fill
	}
	/// Progress kept from an interrupted dwell.
	pub fn dwell_progress(&self) -> f32 {
		self.dwell.progress
	}
	pub fn dwell_phase(&self) -> DwellPhase {
		self.dwell.phase
	}
	pub fn is_dwell_scheduled(&self, ctx: &Context) -> bool {
		self.dwell
			.token
			.is_some_and(|token| ctx.timers.is_pending(token))
	}

	fn fill_source(&self) -> SourceId {
		SourceId::FillLoop(self.core.id())
	}

	pub(crate) fn set_fill(&mut self, amount: f32, ctx: &mut Context) {
		self.dwell.fill = amount;
		ctx.visuals.set_fill_amount(self.core.id(), amount);
	}
	fn reset_fill(&mut self, ctx: &mut Context) {
		ctx.tweens.cancel_property(TweenProperty::Fill(self.core.id()));
		self.set_fill(0.0, ctx);
	}

	/// Fade the fill loop out unless it's silent or already fading.
	pub(crate) fn fade_out_fill_sound(&mut self, ctx: &mut Context) {
		let source = self.fill_source();
		if !ctx.mixer.is_playing(source) || ctx.is_fading_out(source) {
			return;
		}
		trace!(block = ?self.core.id(), "fading out fill sound");
		ctx.fade(source, 0.0, FILL_SOUND_FADE_OUT, 0.0);
	}

	fn decoration_state(&self, settings: DecorationSettings) -> VisualState {
		if self.core.is_disabled() && settings.change_on_disable {
			VisualState::Disabled
		} else if self.core.is_hovering()
			&& self.settings.change_visuals_on_hover
			&& settings.change_on_hover
		{
			VisualState::HoverEnter
		} else {
			VisualState::Show
		}
	}

	fn restyle(
		&self,
		ctx: &mut Context,
		state: VisualState,
		mut wants: impl FnMut(Decoration, DecorationSettings) -> bool,
	) {
		for (decoration, settings) in self.settings.decorations.iter() {
			if wants(decoration, settings) {
				ctx.restyle(&self.core, decoration, state, Transition::Animate);
			}
		}
	}

	pub(crate) fn enable_hover_state(&mut self, ctx: &mut Context) {
		if self.core.is_disabled() {
			return;
		}
		self.core.hover = HoverState::Hovering;
		if self.settings.change_visuals_on_hover {
			self.restyle(ctx, VisualState::HoverEnter, |decoration, settings| {
				settings.change_on_hover && !decoration.is_fill()
			});
		}
	}
	pub(crate) fn disable_hover_state(&mut self, ctx: &mut Context) {
		if self.core.is_disabled() {
			return;
		}
		self.core.hover = HoverState::NotHovering;
		if self.settings.change_visuals_on_hover {
			self.restyle(ctx, VisualState::HoverExit, |decoration, settings| {
				settings.change_on_hover && !decoration.is_fill()
			});
		}
	}

	fn accepts_pointer(&self) -> bool {
		let accepts =
			self.settings.use_pointer_input && !self.core.is_disabled() && !self.core.is_hiding();
		if !accepts {
			trace!(block = ?self.core.id(), "pointer input ignored");
		}
		accepts
	}
	pub(crate) fn pointer_enter(&mut self, ctx: &mut Context) {
		if !self.accepts_pointer() {
			return;
		}
		self.enable_hover_state(ctx);
		self.sounds.enter.play_one_shot(&mut ctx.mixer);
		ctx.emit(self.core.id(), BlockEventKind::ColliderEnter);
	}
	pub(crate) fn pointer_over(&mut self, ctx: &mut Context) {
		if !self.accepts_pointer() {
			return;
		}
		ctx.emit(self.core.id(), BlockEventKind::ColliderHover);
	}
	pub(crate) fn pointer_exit(&mut self, ctx: &mut Context) {
		if !self.accepts_pointer() {
			return;
		}
		self.disable_hover_state(ctx);
		self.sounds.exit.play_one_shot(&mut ctx.mixer);
		ctx.emit(self.core.id(), BlockEventKind::ColliderExit);
	}

	/// The group a selection would commit into, if selecting is allowed now.
	fn selectable_group(&self, ctx: &Context) -> Option<GroupId> {
		if self.core.is_disabled() || self.core.is_hiding() {
			return None;
		}
		let group = self.core.group()?;
		if self.settings.on_selected == SelectionResponse::DisableSelf && ctx.focus.is_focused(group)
		{
			return None;
		}
		Some(group)
	}
	pub(crate) fn accepts_click(&self, ctx: &Context) -> bool {
		let accepts = self.settings.use_pointer_input && self.selectable_group(ctx).is_some();
		if !accepts {
			trace!(block = ?self.core.id(), "click ignored");
		}
		accepts
	}
	/// Confirming while gazing only needs gaze input, not pointer input.
	pub(crate) fn accepts_gaze_click(&self, ctx: &Context) -> bool {
		let accepts = self.settings.use_gaze_input && self.selectable_group(ctx).is_some();
		if !accepts {
			trace!(block = ?self.core.id(), "gaze click ignored");
		}
		accepts
	}

	/// What the button does to itself once selected.
	pub(crate) fn apply_selection_response(&mut self, ctx: &mut Context) {
		match self.settings.on_selected {
			SelectionResponse::DoNothing => {}
			SelectionResponse::HideSelf => {
				self.hide(ctx);
				if self.settings.decorations.fill_background.is_some() {
					ctx.visuals.set_decoration(
						self.core.id(),
						Decoration::FillBackground,
						VisualState::Hide,
						Transition::Force,
					);
				}
			}
			SelectionResponse::DisableSelf => self.disable(ctx),
		}
	}
	/// The rest of a selection, once focus and broadcast are done.
	pub(crate) fn finish_selection(&mut self, ctx: &mut Context) {
		self.cancel_dwell_timers(ctx);
		self.reset_fill(ctx);
		self.dwell.progress = 0.0;
		self.dwell.phase = DwellPhase::Idle;
		self.sounds.fill_requested = false;
		self.sounds.select.play_one_shot(&mut ctx.mixer);
		self.fade_out_fill_sound(ctx);
		ctx.emit(self.core.id(), BlockEventKind::Selected);
	}

	fn cancel_dwell_timers(&mut self, ctx: &mut Context) {
		if let Some(token) = self.dwell.token.take() {
			ctx.timers.cancel(token);
		}
	}
	/// Abandon any dwell in progress without easing anything back.
	pub(crate) fn cancel_dwell(&mut self, ctx: &mut Context) {
		self.cancel_dwell_timers(ctx);
		self.reset_fill(ctx);
		self.fade_out_fill_sound(ctx);
		self.sounds.fill_requested = false;
		if let Some(group) = self.core.group() {
			ctx.focus.clear_gaze_target(group, self.core.id());
		}
		self.dwell.progress = 0.0;
		self.dwell.phase = DwellPhase::Idle;
	}

	fn show_with(&mut self, ctx: &mut Context, transition: Transition, event: BlockEventKind) {
		let id = self.core.id();
		self.core.shown = ShowState::Showing;
		debug!(block = ?id, ?transition, "showing");

		ctx.visuals.set_collider(id, true);
		if self.settings.idle_animation {
			let idle = !self.core.is_disabled() || !self.settings.stop_idle_when_disabled;
			ctx.visuals.set_idle_animation(id, idle);
		}
		self.reset_fill(ctx);

		let show_fill = !self.core.is_disabled() || !self.settings.hide_fill_when_disabled;
		for (decoration, settings) in self.settings.decorations.iter() {
			let state = match (decoration.is_fill(), show_fill) {
				(true, true) => VisualState::Show,
				(true, false) => VisualState::Hide,
				(false, _) => self.decoration_state(settings),
			};
			ctx.visuals.set_decoration(id, decoration, state, transition);
		}
		if self.settings.use_gaze_input && self.settings.decorations.has_fill() {
			ctx.visuals.set_gaze_growable(id, true);
		}
		ctx.emit(id, event);
	}

	fn hide_with(&mut self, ctx: &mut Context, transition: Transition, event: BlockEventKind) {
		let id = self.core.id();
		self.core.shown = ShowState::Hiding;
		debug!(block = ?id, ?transition, "hiding");

		ctx.visuals.set_collider(id, false);
		if self.settings.idle_animation {
			ctx.visuals.set_idle_animation(id, false);
		}
		self.cancel_dwell(ctx);
		if transition == Transition::Force {
			ctx.stop_source(self.fill_source());
		}
		ctx.visuals.set_gaze_growable(id, false);
		self.core.hover = HoverState::NotHovering;
		for (decoration, _) in self.settings.decorations.iter() {
			ctx.visuals
				.set_decoration(id, decoration, VisualState::Hide, transition);
		}
		ctx.emit(id, event);
	}
}

impl Interactable for Button {
	fn kind(&self) -> BlockKind {
		BlockKind::Button
	}
	fn core(&self) -> &BlockCore {
		&self.core
	}
	fn core_mut(&mut self) -> &mut BlockCore {
		&mut self.core
	}

	fn show(&mut self, ctx: &mut Context) {
		self.show_with(ctx, Transition::Animate, BlockEventKind::Shown);
	}
	fn force_show(&mut self, ctx: &mut Context) {
		self.show_with(ctx, Transition::Force, BlockEventKind::ForceShown);
	}
	fn hide(&mut self, ctx: &mut Context) {
		self.hide_with(ctx, Transition::Animate, BlockEventKind::Hidden);
	}
	fn force_hide(&mut self, ctx: &mut Context) {
		self.hide_with(ctx, Transition::Force, BlockEventKind::ForceHidden);
	}

	fn enable(&mut self, ctx: &mut Context) {
		let id = self.core.id();
		self.core.enabled = EnabledState::Enabled;
		debug!(block = ?id, "enabled");

		if self.settings.reshows_when_enabled() {
			self.show(ctx);
		} else {
			self.restyle(ctx, VisualState::Enabled, |decoration, settings| {
				settings.change_on_disable && !decoration.is_fill()
			});
			if self.settings.hide_fill_when_disabled {
				self.restyle(ctx, VisualState::Show, |decoration, _| decoration.is_fill());
			}
			if self.settings.idle_animation && !self.core.is_hiding() {
				ctx.visuals.set_idle_animation(id, true);
			}
		}
		ctx.emit(id, BlockEventKind::Enabled);
	}

	fn disable(&mut self, ctx: &mut Context) {
		let id = self.core.id();
		self.core.enabled = EnabledState::Disabled;
		debug!(block = ?id, "disabled");

		self.cancel_dwell(ctx);
		if self.settings.hides_when_disabled() {
			self.hide(ctx);
		} else {
			self.restyle(ctx, VisualState::Disabled, |decoration, settings| {
				settings.change_on_disable && !decoration.is_fill()
			});
			if self.settings.hide_fill_when_disabled {
				self.restyle(ctx, VisualState::Hide, |decoration, _| decoration.is_fill());
			}
			if self.settings.idle_animation && self.settings.stop_idle_when_disabled {
				ctx.visuals.set_idle_animation(id, false);
			}
		}
		ctx.emit(id, BlockEventKind::Disabled);
	}

	fn poll_resources(&mut self, ctx: &mut Context) {
		self.sounds.select.poll();
		self.sounds.enter.poll();
		self.sounds.exit.poll();
		if self.sounds.fill.poll() && self.sounds.fill_requested {
			self.sounds.fill_requested = false;
			if self.dwell.phase == DwellPhase::Filling {
				let remaining = self.dwell.remaining(ctx.timers.now());
				self.start_fill_sound(remaining, ctx);
			}
		}
	}

	fn prepare_for_destroy(&mut self, ctx: &mut Context) {
		self.dwell.token = None;
		self.sounds.fill_requested = false;
		ctx.release(self.core.id());
	}
}
