use crate::{
	audio::{PlayParams, SoundResource, SoundSettings, SourceId},
	block::{
		BlockCore, BlockEventKind, BlockKind, BlockNotice, Command, EnabledState, Interactable,
		ShowState,
	},
	context::Context,
	error::SettingsError,
	tween::TweenProperty,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExitBehavior {
	Stop,
	/// Seconds
	FadeOut { length: f32, delay: f32 },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaybackMode {
	#[default]
	PlayEntireClip,
	/// Plays while a button in the group is looked at.
	EndWhenGazeExits {
		on_exit: ExitBehavior,
		fade_in_on_reenter: bool,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBlockSettings {
	pub sound: Option<SoundSettings>,
	pub looping: bool,
	pub pitch: f32,
	/// Only start once a button in the same group is selected
	pub activate_on_button_select: bool,
	pub playback: PlaybackMode,
	/// Seconds, used when hiding
	pub fade_out_length: f32,
	pub enabled_at_start: bool,
	pub visible_at_start: bool,
	pub command_on_start: Option<Command>,
}
impl Default for AudioBlockSettings {
	fn default() -> Self {
		Self {
			sound: None,
			looping: false,
			pitch: 1.0,
			activate_on_button_select: true,
			playback: PlaybackMode::PlayEntireClip,
			fade_out_length: 1.0,
			enabled_at_start: true,
			visible_at_start: true,
			command_on_start: None,
		}
	}
}
impl AudioBlockSettings {
	pub fn validate(&self) -> Result<(), SettingsError> {
		if let Some(sound) = &self.sound {
			if !(0.0..=1.0).contains(&sound.volume) {
				return Err(SettingsError::InvalidVolume {
					sound: "playback",
					volume: sound.volume,
				});
			}
		}
		if !(self.pitch.is_finite() && self.pitch > 0.0) {
			return Err(SettingsError::InvalidPitch(self.pitch));
		}
		let mut fades = vec![self.fade_out_length];
		if let PlaybackMode::EndWhenGazeExits {
			on_exit: ExitBehavior::FadeOut { length, delay },
			..
		} = self.playback
		{
			fades.extend([length, delay]);
		}
		match fades.into_iter().find(|f| !(f.is_finite() && *f >= 0.0)) {
			Some(fade) => Err(SettingsError::InvalidFade(fade)),
			None => Ok(()),
		}
	}
}

/// Plays one clip in response to buttons in its group.
pub struct AudioBlock {
	core: BlockCore,
	settings: AudioBlockSettings,
	sound: SoundResource,
	/// Playback was asked for while the clip was still loading
	play_requested: bool,
}
impl AudioBlock {
	pub(crate) fn new(core: BlockCore, settings: AudioBlockSettings, ctx: &mut Context) -> Self {
		let sound = SoundResource::load(settings.sound.as_ref(), &mut *ctx.loader);
		AudioBlock {
			core,
			settings,
			sound,
			play_requested: false,
		}
	}

	pub fn settings(&self) -> &AudioBlockSettings {
		&self.settings
	}
	pub fn ready_to_play(&self) -> bool {
		self.sound.ready().is_some()
	}
	pub fn play_requested(&self) -> bool {
		self.play_requested
	}
	pub fn is_playing(&self, ctx: &Context) -> bool {
		ctx.mixer.is_playing(self.source())
	}

	fn source(&self) -> SourceId {
		SourceId::Playback(self.core.id())
	}
	fn in_my_group(&self, notice: &BlockNotice) -> bool {
		notice.kind == BlockKind::Button
			&& self.core.group().is_some()
			&& notice.group == self.core.group()
	}
	fn group_focused(&self, ctx: &Context) -> bool {
		self.core
			.group()
			.is_some_and(|group| ctx.focus.is_focused(group))
	}

	/// Play now if the clip is loaded, otherwise as soon as it is.
	fn request_play(&mut self, ctx: &mut Context) {
		if self.core.is_disabled() || self.core.is_hiding() {
			trace!(block = ?self.core.id(), "playback ignored");
			return;
		}
		if self.ready_to_play() {
			self.play_or_fade(ctx);
		} else if self.sound.is_loading() {
			debug!(block = ?self.core.id(), "playback deferred until the clip loads");
			self.play_requested = true;
		}
	}

	fn play_or_fade(&mut self, ctx: &mut Context) {
		let source = self.source();
		let Some(clip) = self.sound.ready() else {
			return;
		};
		let volume = self.sound.volume();
		ctx.tweens.cancel_property(TweenProperty::Volume(source));

		let fade_in = match self.settings.playback {
			PlaybackMode::EndWhenGazeExits {
				on_exit: ExitBehavior::FadeOut { length, delay },
				fade_in_on_reenter: true,
			} => Some((length, delay)),
			_ => None,
		};
		match fade_in {
			Some((length, delay)) => {
				if !ctx.mixer.is_playing(source) {
					ctx.mixer.play(source, clip, self.params(0.0));
					ctx.emit(self.core.id(), BlockEventKind::PlaybackStarted);
				}
				ctx.fade(source, volume, length, delay);
			}
			None => {
				ctx.mixer.play(source, clip, self.params(volume));
				ctx.emit(self.core.id(), BlockEventKind::PlaybackStarted);
			}
		}
	}
	fn params(&self, volume: f32) -> PlayParams {
		PlayParams {
			volume,
			looping: self.settings.looping,
			pitch: self.settings.pitch,
		}
	}

	fn stop(&mut self, ctx: &mut Context) {
		self.play_requested = false;
		if ctx.mixer.is_playing(self.source()) {
			ctx.stop_source(self.source());
			ctx.emit(self.core.id(), BlockEventKind::PlaybackStopped);
		}
	}
	fn fade_out(&mut self, length: f32, delay: f32, ctx: &mut Context) {
		self.play_requested = false;
		if !ctx.is_fading_out(self.source()) {
			ctx.fade(self.source(), 0.0, length, delay);
		}
	}
}

impl Interactable for AudioBlock {
	fn kind(&self) -> BlockKind {
		BlockKind::Audio
	}
	fn core(&self) -> &BlockCore {
		&self.core
	}
	fn core_mut(&mut self) -> &mut BlockCore {
		&mut self.core
	}

	fn show(&mut self, ctx: &mut Context) {
		self.core.shown = ShowState::Showing;
		ctx.emit(self.core.id(), BlockEventKind::Shown);
		if self.settings.activate_on_button_select
			&& self.group_focused(ctx)
			&& !self.is_playing(ctx)
		{
			self.request_play(ctx);
		}
	}
	fn force_show(&mut self, ctx: &mut Context) {
		self.core.shown = ShowState::Showing;
		ctx.emit(self.core.id(), BlockEventKind::ForceShown);
		if self.settings.activate_on_button_select
			&& self.group_focused(ctx)
			&& !self.is_playing(ctx)
		{
			self.request_play(ctx);
		}
	}
	fn hide(&mut self, ctx: &mut Context) {
		self.core.shown = ShowState::Hiding;
		self.fade_out(self.settings.fade_out_length, 0.0, ctx);
		ctx.emit(self.core.id(), BlockEventKind::Hidden);
	}
	fn force_hide(&mut self, ctx: &mut Context) {
		self.core.shown = ShowState::Hiding;
		self.stop(ctx);
		ctx.emit(self.core.id(), BlockEventKind::ForceHidden);
	}
	fn enable(&mut self, ctx: &mut Context) {
		self.core.enabled = EnabledState::Enabled;
		ctx.emit(self.core.id(), BlockEventKind::Enabled);
	}
	fn disable(&mut self, ctx: &mut Context) {
		self.core.enabled = EnabledState::Disabled;
		self.play_requested = false;
		ctx.emit(self.core.id(), BlockEventKind::Disabled);
	}

	fn call(&mut self, ctx: &mut Context) {
		ctx.emit(self.core.id(), BlockEventKind::Called);
		self.request_play(ctx);
	}

	fn poll_resources(&mut self, ctx: &mut Context) {
		if self.sound.poll() && self.play_requested {
			self.play_requested = false;
			self.play_or_fade(ctx);
		} else if !self.sound.is_loading() {
			// a failed load never satisfies a request
			self.play_requested = false;
		}
	}

	fn other_block_selected(&mut self, notice: &BlockNotice, ctx: &mut Context) {
		self.apply_rules(notice, ctx);
		if self.settings.activate_on_button_select && self.in_my_group(notice) {
			self.request_play(ctx);
		}
	}
	fn other_gaze_entered(&mut self, notice: &BlockNotice, ctx: &mut Context) {
		if !matches!(self.settings.playback, PlaybackMode::EndWhenGazeExits { .. })
			|| !self.in_my_group(notice)
		{
			return;
		}
		if !self.settings.activate_on_button_select || self.group_focused(ctx) {
			self.request_play(ctx);
		}
	}
	fn other_gaze_exited(&mut self, notice: &BlockNotice, ctx: &mut Context) {
		if !self.in_my_group(notice) {
			return;
		}
		self.play_requested = false;
		let PlaybackMode::EndWhenGazeExits { on_exit, .. } = self.settings.playback else {
			return;
		};
		if !ctx.mixer.is_playing(self.source()) {
			return;
		}
		match on_exit {
			ExitBehavior::Stop => self.stop(ctx),
			ExitBehavior::FadeOut { length, delay } => self.fade_out(length, delay, ctx),
		}
	}

	fn prepare_for_destroy(&mut self, ctx: &mut Context) {
		self.play_requested = false;
		ctx.release(self.core.id());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_bad_fades_and_pitch() {
		let settings = AudioBlockSettings {
			playback: PlaybackMode::EndWhenGazeExits {
				on_exit: ExitBehavior::FadeOut {
					length: -0.5,
					delay: 0.0,
				},
				fade_in_on_reenter: false,
			},
			..Default::default()
		};
		assert_eq!(settings.validate(), Err(SettingsError::InvalidFade(-0.5)));

		let settings = AudioBlockSettings {
			pitch: 0.0,
			..Default::default()
		};
		assert_eq!(settings.validate(), Err(SettingsError::InvalidPitch(0.0)));
		assert_eq!(AudioBlockSettings::default().validate(), Ok(()));
	}
}
