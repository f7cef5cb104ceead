use crate::{BlockId, GroupId};
use thiserror::Error;

/// A settings value object that can't describe a working block.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
	#[error("dwell duration must be finite and positive when gaze input is used, got {0}")]
	InvalidDwellDuration(f32),
	#[error("volume for the {sound} sound must be within 0..=1, got {volume}")]
	InvalidVolume { sound: &'static str, volume: f32 },
	#[error("a looping fill sound needs gaze input to be enabled")]
	FillSoundWithoutGaze,
	#[error("pitch ramp target must be finite and positive, got {0}")]
	InvalidPitch(f32),
	#[error("show_after_reenabled has no effect unless the block hides when disabled")]
	ReshowWithoutHide,
	#[error("at least one of pointer or gaze input must be enabled")]
	NoInputMethod,
	#[error("the {rule} rule targets an empty list")]
	EmptyTargetList { rule: &'static str },
	#[error("fade length must be finite and non-negative, got {0}")]
	InvalidFade(f32),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockError {
	#[error("invalid settings: {0}")]
	Settings(#[from] SettingsError),
	#[error("block {0:?} doesn't exist")]
	UnknownBlock(BlockId),
	#[error("group {0:?} doesn't exist")]
	UnknownGroup(GroupId),
}
