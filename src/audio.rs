use crate::{
	loader::{PendingClip, ResourceLoader},
	BlockId,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Opaque handle to decoded audio, owned by the host's audio backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioClip(Arc<str>);
impl AudioClip {
	pub fn new(name: impl AsRef<str>) -> Self {
		AudioClip(Arc::from(name.as_ref()))
	}
	pub fn name(&self) -> &str {
		&self.0
	}
}

/// A playback voice a block can address more than once (for fades and pitch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
	/// The looping dwell fill sound of a button
	FillLoop(BlockId),
	/// The main clip of an audio block
	Playback(BlockId),
}
impl SourceId {
	pub fn block(self) -> BlockId {
		match self {
			SourceId::FillLoop(block) | SourceId::Playback(block) => block,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
	pub volume: f32,
	pub looping: bool,
	pub pitch: f32,
}

/// The host's mixer.
pub trait AudioService {
	fn play_one_shot(&mut self, clip: &AudioClip, volume: f32);
	fn play(&mut self, source: SourceId, clip: &AudioClip, params: PlayParams);
	fn set_volume(&mut self, source: SourceId, volume: f32);
	fn set_pitch(&mut self, source: SourceId, pitch: f32);
	fn stop(&mut self, source: SourceId);
}

#[derive(Debug, Clone, Copy)]
struct SourceState {
	volume: f32,
}

/// Wraps the backend and remembers what each source is doing so fades can
/// start from the current volume.
pub struct Mixer {
	backend: Box<dyn AudioService>,
	sources: FxHashMap<SourceId, SourceState>,
}
impl Mixer {
	pub fn new(backend: Box<dyn AudioService>) -> Self {
		Mixer {
			backend,
			sources: FxHashMap::default(),
		}
	}

	pub fn play_one_shot(&mut self, clip: &AudioClip, volume: f32) {
		self.backend.play_one_shot(clip, volume);
	}
	pub fn play(&mut self, source: SourceId, clip: &AudioClip, params: PlayParams) {
		debug!(?source, clip = clip.name(), "playing");
		self.sources.insert(
			source,
			SourceState {
				volume: params.volume,
			},
		);
		self.backend.play(source, clip, params);
	}
	pub fn set_volume(&mut self, source: SourceId, volume: f32) {
		if let Some(state) = self.sources.get_mut(&source) {
			state.volume = volume;
			self.backend.set_volume(source, volume);
		}
	}
	pub fn set_pitch(&mut self, source: SourceId, pitch: f32) {
		if self.sources.contains_key(&source) {
			self.backend.set_pitch(source, pitch);
		}
	}
	pub fn stop(&mut self, source: SourceId) {
		if self.sources.remove(&source).is_some() {
			self.backend.stop(source);
		}
	}

	pub fn is_playing(&self, source: SourceId) -> bool {
		self.sources.contains_key(&source)
	}
	pub fn volume(&self, source: SourceId) -> Option<f32> {
		self.sources.get(&source).map(|s| s.volume)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipSource {
	Clip(AudioClip),
	Path { path: String, cache_if_remote: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
	pub source: ClipSource,
	pub volume: f32,
}
impl SoundSettings {
	pub fn clip(clip: AudioClip) -> Self {
		SoundSettings {
			source: ClipSource::Clip(clip),
			volume: 1.0,
		}
	}
	pub fn path(path: impl ToString) -> Self {
		SoundSettings {
			source: ClipSource::Path {
				path: path.to_string(),
				cache_if_remote: true,
			},
			volume: 1.0,
		}
	}
	pub fn volume(mut self, volume: f32) -> Self {
		self.volume = volume;
		self
	}
}

#[derive(Debug, Default)]
enum ClipState {
	#[default]
	Unconfigured,
	Loading(PendingClip),
	Ready(AudioClip),
	Failed,
}

/// A sound that may still be loading. Playing it before it's ready is simply
/// skipped; blocks that want late playback keep their own request flag.
#[derive(Debug, Default)]
pub struct SoundResource {
	state: ClipState,
	volume: f32,
}
impl SoundResource {
	pub fn load(settings: Option<&SoundSettings>, loader: &mut dyn ResourceLoader) -> Self {
		let Some(settings) = settings else {
			return SoundResource::default();
		};
		let state = match &settings.source {
			ClipSource::Clip(clip) => ClipState::Ready(clip.clone()),
			ClipSource::Path {
				path,
				cache_if_remote,
			} => ClipState::Loading(loader.load_audio_clip(path, *cache_if_remote)),
		};
		SoundResource {
			state,
			volume: settings.volume,
		}
	}

	/// Returns `true` on the poll where the clip became ready.
	pub fn poll(&mut self) -> bool {
		let ClipState::Loading(pending) = &mut self.state else {
			return false;
		};
		match pending.poll() {
			None => false,
			Some(Ok(clip)) => {
				debug!(clip = clip.name(), "audio clip ready");
				self.state = ClipState::Ready(clip);
				true
			}
			Some(Err(error)) => {
				warn!(%error, "audio clip failed to load");
				self.state = ClipState::Failed;
				false
			}
		}
	}

	pub fn is_configured(&self) -> bool {
		!matches!(self.state, ClipState::Unconfigured)
	}
	pub fn is_loading(&self) -> bool {
		matches!(self.state, ClipState::Loading(_))
	}
	pub fn ready(&self) -> Option<&AudioClip> {
		match &self.state {
			ClipState::Ready(clip) => Some(clip),
			_ => None,
		}
	}
	pub fn volume(&self) -> f32 {
		self.volume
	}

	/// Fire and forget, if the clip is ready.
	pub fn play_one_shot(&self, mixer: &mut Mixer) -> bool {
		match self.ready() {
			Some(clip) => {
				mixer.play_one_shot(clip, self.volume);
				true
			}
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::loader::{NoLoader, PendingClip};

	struct OneClip(Option<PendingClip>);
	impl ResourceLoader for OneClip {
		fn load_audio_clip(&mut self, _path: &str, _cache: bool) -> PendingClip {
			self.0.take().unwrap()
		}
	}

	#[test]
	fn sound_settings_are_serde_values() {
		fn serde_value<T: serde::Serialize + serde::de::DeserializeOwned>() {}
		serde_value::<AudioClip>();
		serde_value::<SoundSettings>();
		serde_value::<crate::button::ButtonSettings>();
	}

	#[test]
	fn in_memory_clip_is_ready_immediately() {
		let sound = SoundResource::load(
			Some(&SoundSettings::clip(AudioClip::new("click")).volume(0.5)),
			&mut NoLoader,
		);
		assert_eq!(sound.ready(), Some(&AudioClip::new("click")));
		assert_eq!(sound.volume(), 0.5);
	}

	#[test]
	fn path_clip_becomes_ready_when_the_loader_answers() {
		let (tx, pending) = PendingClip::channel();
		let mut sound =
			SoundResource::load(Some(&SoundSettings::path("sfx/fill.ogg")), &mut OneClip(Some(pending)));
		assert!(sound.is_loading());
		assert!(!sound.poll());

		tx.send(Ok(AudioClip::new("fill"))).unwrap();
		assert!(sound.poll());
		assert!(sound.ready().is_some());
		assert!(!sound.poll());
	}

	#[test]
	fn failed_load_stays_silent() {
		let mut sound =
			SoundResource::load(Some(&SoundSettings::path("missing.ogg")), &mut NoLoader);
		assert!(!sound.poll());
		assert!(sound.is_configured());
		assert!(sound.ready().is_none());
	}

	#[test]
	fn unconfigured_sound_is_inert() {
		let sound = SoundResource::load(None, &mut NoLoader);
		assert!(!sound.is_configured());
		assert!(sound.ready().is_none());
	}
}
