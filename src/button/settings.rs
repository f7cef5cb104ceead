use crate::{
	audio::SoundSettings, block::Command, error::SettingsError, tween::Easing,
	visuals::Decoration,
};
use serde::{Deserialize, Serialize};

/// What a button does to itself once it's selected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionResponse {
	#[default]
	DoNothing,
	HideSelf,
	DisableSelf,
}

/// Which state changes a decoration follows. Decorations that are `None`
/// in [`ButtonDecorations`] don't exist on the button at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationSettings {
	pub change_on_hover: bool,
	pub change_on_disable: bool,
}
impl Default for DecorationSettings {
	fn default() -> Self {
		Self {
			change_on_hover: true,
			change_on_disable: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonDecorations {
	pub center_image: Option<DecorationSettings>,
	pub background_image: Option<DecorationSettings>,
	pub parallax_image: Option<DecorationSettings>,
	pub text: Option<DecorationSettings>,
	pub fill_image: Option<DecorationSettings>,
	pub fill_background: Option<DecorationSettings>,
}
impl Default for ButtonDecorations {
	fn default() -> Self {
		Self {
			center_image: Some(DecorationSettings::default()),
			background_image: Some(DecorationSettings::default()),
			parallax_image: None,
			text: None,
			fill_image: Some(DecorationSettings::default()),
			fill_background: Some(DecorationSettings::default()),
		}
	}
}
impl ButtonDecorations {
	pub fn get(&self, decoration: Decoration) -> Option<DecorationSettings> {
		match decoration {
			Decoration::CenterImage => self.center_image,
			Decoration::BackgroundImage => self.background_image,
			Decoration::ParallaxImage => self.parallax_image,
			Decoration::Text => self.text,
			Decoration::FillImage => self.fill_image,
			Decoration::FillBackground => self.fill_background,
			Decoration::Content => None,
		}
	}
	/// Configured decorations in a fixed order.
	pub fn iter(&self) -> impl Iterator<Item = (Decoration, DecorationSettings)> + '_ {
		Decoration::BUTTON
			.into_iter()
			.filter_map(|decoration| Some((decoration, self.get(decoration)?)))
	}
	pub fn has_fill(&self) -> bool {
		self.fill_image.is_some()
	}
}

/// Pitch change applied to the fill loop over the dwell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchRamp {
	pub to: f32,
	pub easing: Easing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSoundSettings {
	pub sound: SoundSettings,
	pub pitch_ramp: Option<PitchRamp>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSounds {
	pub select: Option<SoundSettings>,
	pub enter: Option<SoundSettings>,
	pub exit: Option<SoundSettings>,
	/// Loops while the dwell fills
	pub fill: Option<FillSoundSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSettings {
	pub use_gaze_input: bool,
	pub use_pointer_input: bool,
	/// Seconds of sustained gaze needed to select
	pub dwell_duration: f32,
	pub on_selected: SelectionResponse,
	pub decorations: ButtonDecorations,
	pub change_visuals_on_hover: bool,
	pub hide_when_disabled: bool,
	/// Only meaningful when disabling hides the button
	pub show_after_reenabled: bool,
	pub stop_idle_when_disabled: bool,
	pub hide_fill_when_disabled: bool,
	/// Breathing animation while idle
	pub idle_animation: bool,
	pub sounds: ButtonSounds,
	pub enabled_at_start: bool,
	pub visible_at_start: bool,
	pub command_on_start: Option<Command>,
}
impl Default for ButtonSettings {
	fn default() -> Self {
		Self {
			use_gaze_input: true,
			use_pointer_input: true,
			dwell_duration: 1.0,
			on_selected: SelectionResponse::DoNothing,
			decorations: ButtonDecorations::default(),
			change_visuals_on_hover: true,
			hide_when_disabled: false,
			show_after_reenabled: false,
			stop_idle_when_disabled: true,
			hide_fill_when_disabled: true,
			idle_animation: false,
			sounds: ButtonSounds::default(),
			enabled_at_start: true,
			visible_at_start: true,
			command_on_start: None,
		}
	}
}
impl ButtonSettings {
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !self.use_gaze_input && !self.use_pointer_input {
			return Err(SettingsError::NoInputMethod);
		}
		if self.use_gaze_input && !(self.dwell_duration.is_finite() && self.dwell_duration > 0.0) {
			return Err(SettingsError::InvalidDwellDuration(self.dwell_duration));
		}
		let sounds = [
			("select", self.sounds.select.as_ref()),
			("enter", self.sounds.enter.as_ref()),
			("exit", self.sounds.exit.as_ref()),
			("fill", self.sounds.fill.as_ref().map(|f| &f.sound)),
		];
		for (sound, settings) in sounds {
			if let Some(settings) = settings {
				if !(0.0..=1.0).contains(&settings.volume) {
					return Err(SettingsError::InvalidVolume {
						sound,
						volume: settings.volume,
					});
				}
			}
		}
		if let Some(fill) = &self.sounds.fill {
			if !self.use_gaze_input {
				return Err(SettingsError::FillSoundWithoutGaze);
			}
			if let Some(ramp) = fill.pitch_ramp {
				if !(ramp.to.is_finite() && ramp.to > 0.0) {
					return Err(SettingsError::InvalidPitch(ramp.to));
				}
			}
		}
		if self.show_after_reenabled && !self.hides_when_disabled() {
			return Err(SettingsError::ReshowWithoutHide);
		}
		Ok(())
	}

	pub fn hides_when_disabled(&self) -> bool {
		self.hide_when_disabled || self.on_selected == SelectionResponse::HideSelf
	}
	pub fn reshows_when_enabled(&self) -> bool {
		self.hides_when_disabled() && self.show_after_reenabled
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::audio::AudioClip;

	#[test]
	fn defaults_are_valid() {
		assert_eq!(ButtonSettings::default().validate(), Ok(()));
	}

	#[test]
	fn rejects_bad_dwell_only_with_gaze() {
		let mut settings = ButtonSettings {
			dwell_duration: 0.0,
			..Default::default()
		};
		assert_eq!(
			settings.validate(),
			Err(SettingsError::InvalidDwellDuration(0.0))
		);
		settings.use_gaze_input = false;
		assert_eq!(settings.validate(), Ok(()));
	}

	#[test]
	fn rejects_no_input() {
		let settings = ButtonSettings {
			use_gaze_input: false,
			use_pointer_input: false,
			..Default::default()
		};
		assert_eq!(settings.validate(), Err(SettingsError::NoInputMethod));
	}

	#[test]
	fn rejects_loud_sounds() {
		let mut settings = ButtonSettings::default();
		settings.sounds.exit = Some(SoundSettings::clip(AudioClip::new("exit")).volume(1.5));
		assert_eq!(
			settings.validate(),
			Err(SettingsError::InvalidVolume {
				sound: "exit",
				volume: 1.5
			})
		);
	}

	#[test]
	fn fill_sound_needs_gaze_and_a_sane_pitch() {
		let mut settings = ButtonSettings::default();
		settings.sounds.fill = Some(FillSoundSettings {
			sound: SoundSettings::clip(AudioClip::new("fill")),
			pitch_ramp: Some(PitchRamp {
				to: 0.0,
				easing: Easing::Linear,
			}),
		});
		assert_eq!(settings.validate(), Err(SettingsError::InvalidPitch(0.0)));

		settings.use_gaze_input = false;
		assert_eq!(settings.validate(), Err(SettingsError::FillSoundWithoutGaze));
	}

	#[test]
	fn reshow_needs_something_that_hides() {
		let mut settings = ButtonSettings {
			show_after_reenabled: true,
			..Default::default()
		};
		assert_eq!(settings.validate(), Err(SettingsError::ReshowWithoutHide));
		settings.on_selected = SelectionResponse::HideSelf;
		assert_eq!(settings.validate(), Ok(()));
		assert!(settings.reshows_when_enabled());
	}

	#[test]
	fn decorations_iterate_in_fixed_order() {
		let decorations: Vec<_> = ButtonDecorations::default()
			.iter()
			.map(|(decoration, _)| decoration)
			.collect();
		assert_eq!(
			decorations,
			vec![
				Decoration::CenterImage,
				Decoration::BackgroundImage,
				Decoration::FillImage,
				Decoration::FillBackground,
			]
		);
	}
}
