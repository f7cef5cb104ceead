use super::Button;
use crate::{
	audio::PlayParams,
	block::{BlockEventKind, Interactable},
	context::Context,
	timer::{Action, TimerToken},
	tween::{TweenProperty, TweenSpec},
	GroupId,
};
use tracing::{debug, trace};

/// Seconds the fill loop takes to fade out.
pub const FILL_SOUND_FADE_OUT: f32 = 0.25;
/// How long before completion the fill loop starts fading.
pub const FILL_SOUND_FADE_LEAD: f32 = 0.15;
/// Seconds an interrupted fill takes to ease back to empty.
pub const FILL_RESET_DURATION: f32 = 0.5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DwellPhase {
	/// Nothing is being looked at
	#[default]
	Idle,
	Filling,
	/// Dwell time ran out and the selection is committing
	Completing,
	/// Gaze left before completion
	Cancelled,
}

/// What the session should do after a dwell starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellStart {
	Filling,
	/// Enough progress was already banked, select right away
	Complete,
}

#[derive(Debug, Default)]
pub(super) struct Dwell {
	pub(super) phase: DwellPhase,
	pub(super) fill: f32,
	pub(super) progress: f32,
	/// Covers both the fill sound fade and the completion
	pub(super) token: Option<TimerToken>,
	ends_at: f64,
}
impl Dwell {
	pub(super) fn remaining(&self, now: f64) -> f32 {
		(self.ends_at - now).max(0.0) as f32
	}
}

impl Button {
	/// The group a gaze dwell would run in, if one may start now.
	pub(crate) fn gaze_enter_group(&self, ctx: &Context) -> Option<GroupId> {
		let group = self
			.settings
			.use_gaze_input
			.then(|| self.selectable_group(ctx))
			.flatten();
		if group.is_none() {
			trace!(block = ?self.core.id(), "gaze enter ignored");
		}
		group
	}

	/// Everything after hover and the gaze entered broadcast.
	pub(crate) fn begin_dwell(&mut self, group: GroupId, ctx: &mut Context) -> DwellStart {
		let id = self.core.id();
		if ctx
			.focus
			.last_gaze_target(group)
			.is_some_and(|last| last != id)
		{
			self.dwell.progress = 0.0;
		}
		if self.dwell.phase == DwellPhase::Filling {
			// continue from the visible fill rather than restarting
			self.dwell.progress = self.dwell.fill;
		}
		ctx.focus.set_gaze_target(group, id);
		self.sounds.enter.play_one_shot(&mut ctx.mixer);
		ctx.emit(id, BlockEventKind::ColliderEnter);

		self.cancel_dwell_timers(ctx);
		let remaining = (self.settings.dwell_duration - self.dwell.progress).max(0.0);
		debug!(block = ?id, ?group, remaining, progress = self.dwell.progress, "dwell started");
		if remaining <= 0.0 {
			self.dwell.phase = DwellPhase::Completing;
			return DwellStart::Complete;
		}

		let from = self.dwell.progress.min(1.0);
		self.set_fill(from, ctx);
		ctx.tweens.animate(
			TweenProperty::Fill(id),
			TweenSpec::new(from, 1.0, remaining),
			None,
		);
		self.start_fill_sound(remaining, ctx);

		let token = ctx.timers.token(id);
		ctx.timers.schedule(
			token,
			remaining - FILL_SOUND_FADE_LEAD,
			Action::FadeOutFillSound(id),
		);
		ctx.timers
			.schedule(token, remaining, Action::CompleteDwell(id));
		self.dwell.token = Some(token);
		self.dwell.ends_at = ctx.timers.now() + remaining as f64;
		self.dwell.phase = DwellPhase::Filling;
		DwellStart::Filling
	}

	pub(super) fn start_fill_sound(&mut self, remaining: f32, ctx: &mut Context) {
		let Some(fill) = &self.settings.sounds.fill else {
			return;
		};
		let source = self.fill_source();
		let Some(clip) = self.sounds.fill.ready() else {
			self.sounds.fill_requested = self.sounds.fill.is_loading();
			return;
		};
		ctx.tweens.cancel_property(TweenProperty::Volume(source));
		ctx.tweens.cancel_property(TweenProperty::Pitch(source));
		ctx.mixer.play(
			source,
			clip,
			PlayParams {
				volume: fill.sound.volume,
				looping: true,
				pitch: 1.0,
			},
		);
		if let Some(ramp) = fill.pitch_ramp {
			ctx.tweens.animate(
				TweenProperty::Pitch(source),
				TweenSpec::new(1.0, ramp.to, remaining).easing(ramp.easing),
				None,
			);
		}
	}

	pub(crate) fn accepts_gaze_exit(&self) -> bool {
		let accepts =
			self.settings.use_gaze_input && !self.core.is_disabled() && !self.core.is_hiding();
		if !accepts {
			trace!(block = ?self.core.id(), "gaze exit ignored");
		}
		accepts
	}

	/// Everything after the gaze exited broadcast.
	pub(crate) fn end_gaze(&mut self, ctx: &mut Context) {
		let id = self.core.id();
		ctx.emit(id, BlockEventKind::ColliderExit);
		self.disable_hover_state(ctx);
		self.sounds.exit.play_one_shot(&mut ctx.mixer);

		let focused = self
			.core
			.group()
			.is_some_and(|group| ctx.focus.is_focused(group));
		let filling = self.dwell.phase == DwellPhase::Filling;
		if focused && !filling {
			return;
		}

		if let Some(group) = self.core.group() {
			ctx.focus.clear_gaze_target(group, id);
		}
		let reached = self.dwell.fill;
		if filling {
			self.dwell.progress = reached;
		}
		self.cancel_dwell_timers(ctx);
		self.sounds.fill_requested = false;
		self.fade_out_fill_sound(ctx);
		self.show(ctx);

		self.set_fill(reached, ctx);
		ctx.tweens.animate(
			TweenProperty::Fill(id),
			TweenSpec::new(reached, 0.0, FILL_RESET_DURATION),
			None,
		);
		self.dwell.phase = DwellPhase::Cancelled;
		debug!(block = ?id, progress = self.dwell.progress, "dwell cancelled");
	}

	/// Whether a fired completion timer still applies.
	pub(crate) fn accepts_dwell_completion(&self) -> bool {
		!self.core.is_disabled()
			&& self.settings.use_gaze_input
			&& self.dwell.phase == DwellPhase::Filling
	}
	pub(crate) fn mark_completing(&mut self) {
		self.dwell.token = None;
		self.dwell.phase = DwellPhase::Completing;
	}
	pub(crate) fn is_filling(&self) -> bool {
		self.dwell.phase == DwellPhase::Filling
	}
}
