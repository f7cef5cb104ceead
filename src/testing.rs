use crate::{
	audio::{AudioClip, AudioService, PlayParams, SourceId},
	loader::{ClipSender, LoadError, PendingClip, ResourceLoader},
	visuals::{Decoration, Transition, VisualState, Visuals},
	BlockId, Session,
};
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
	OneShot(AudioClip, f32),
	Play(SourceId, AudioClip, PlayParams),
	Volume(SourceId, f32),
	Pitch(SourceId, f32),
	Stop(SourceId),
}

#[derive(Debug, Default, Clone)]
pub struct RecordingAudio(Rc<RefCell<Vec<AudioCall>>>);
impl RecordingAudio {
	pub fn calls(&self) -> Vec<AudioCall> {
		self.0.borrow().clone()
	}
	pub fn clear(&self) {
		self.0.borrow_mut().clear();
	}
	pub fn one_shots(&self) -> Vec<String> {
		self.0
			.borrow()
			.iter()
			.filter_map(|call| match call {
				AudioCall::OneShot(clip, _) => Some(clip.name().to_string()),
				_ => None,
			})
			.collect()
	}
	pub fn plays_of(&self, source: SourceId) -> usize {
		self.0
			.borrow()
			.iter()
			.filter(|call| matches!(call, AudioCall::Play(s, ..) if *s == source))
			.count()
	}
	/// Last pitch the backend was told for `source`.
	pub fn last_pitch(&self, source: SourceId) -> Option<f32> {
		self.0.borrow().iter().rev().find_map(|call| match call {
			AudioCall::Pitch(s, pitch) if *s == source => Some(*pitch),
			_ => None,
		})
	}
	pub fn stops_of(&self, source: SourceId) -> usize {
		self.0
			.borrow()
			.iter()
			.filter(|call| matches!(call, AudioCall::Stop(s) if *s == source))
			.count()
	}
}
impl AudioService for RecordingAudio {
	fn play_one_shot(&mut self, clip: &AudioClip, volume: f32) {
		self.0
			.borrow_mut()
			.push(AudioCall::OneShot(clip.clone(), volume));
	}
	fn play(&mut self, source: SourceId, clip: &AudioClip, params: PlayParams) {
		self.0
			.borrow_mut()
			.push(AudioCall::Play(source, clip.clone(), params));
	}
	fn set_volume(&mut self, source: SourceId, volume: f32) {
		self.0.borrow_mut().push(AudioCall::Volume(source, volume));
	}
	fn set_pitch(&mut self, source: SourceId, pitch: f32) {
		self.0.borrow_mut().push(AudioCall::Pitch(source, pitch));
	}
	fn stop(&mut self, source: SourceId) {
		self.0.borrow_mut().push(AudioCall::Stop(source));
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualCall {
	Decoration(BlockId, Decoration, VisualState, Transition),
	Collider(BlockId, bool),
	Idle(BlockId, bool),
	GazeGrowable(BlockId, bool),
	Fill(BlockId, f32),
}

#[derive(Debug, Default, Clone)]
pub struct RecordingVisuals(Rc<RefCell<Vec<VisualCall>>>);
impl RecordingVisuals {
	pub fn calls(&self) -> Vec<VisualCall> {
		self.0.borrow().clone()
	}
	pub fn clear(&self) {
		self.0.borrow_mut().clear();
	}
	/// Last state sent to a decoration.
	pub fn decoration(&self, block: BlockId, decoration: Decoration) -> Option<VisualState> {
		self.0.borrow().iter().rev().find_map(|call| match call {
			VisualCall::Decoration(b, d, state, _) if *b == block && *d == decoration => {
				Some(*state)
			}
			_ => None,
		})
	}
	/// Every state a decoration was sent, oldest first.
	pub fn decoration_history(&self, block: BlockId, decoration: Decoration) -> Vec<VisualState> {
		self.0
			.borrow()
			.iter()
			.filter_map(|call| match call {
				VisualCall::Decoration(b, d, state, _) if *b == block && *d == decoration => {
					Some(*state)
				}
				_ => None,
			})
			.collect()
	}
	pub fn collider(&self, block: BlockId) -> Option<bool> {
		self.0.borrow().iter().rev().find_map(|call| match call {
			VisualCall::Collider(b, enabled) if *b == block => Some(*enabled),
			_ => None,
		})
	}
	pub fn fill(&self, block: BlockId) -> Option<f32> {
		self.0.borrow().iter().rev().find_map(|call| match call {
			VisualCall::Fill(b, amount) if *b == block => Some(*amount),
			_ => None,
		})
	}
}
impl Visuals for RecordingVisuals {
	fn set_decoration(
		&mut self,
		block: BlockId,
		decoration: Decoration,
		state: VisualState,
		transition: Transition,
	) {
		self.0
			.borrow_mut()
			.push(VisualCall::Decoration(block, decoration, state, transition));
	}
	fn set_collider(&mut self, block: BlockId, enabled: bool) {
		self.0.borrow_mut().push(VisualCall::Collider(block, enabled));
	}
	fn set_idle_animation(&mut self, block: BlockId, playing: bool) {
		self.0.borrow_mut().push(VisualCall::Idle(block, playing));
	}
	fn set_gaze_growable(&mut self, block: BlockId, enabled: bool) {
		self.0
			.borrow_mut()
			.push(VisualCall::GazeGrowable(block, enabled));
	}
	fn set_fill_amount(&mut self, block: BlockId, amount: f32) {
		self.0.borrow_mut().push(VisualCall::Fill(block, amount));
	}
}

/// Hands out loads that stay pending until the test resolves them.
#[derive(Debug, Default, Clone)]
pub struct ScriptedLoader(Rc<RefCell<FxHashMap<String, ClipSender>>>);
impl ScriptedLoader {
	pub fn is_pending(&self, path: &str) -> bool {
		self.0.borrow().contains_key(path)
	}
	pub fn finish(&self, path: &str, clip: AudioClip) {
		if let Some(sender) = self.0.borrow_mut().remove(path) {
			let _ = sender.send(Ok(clip));
		}
	}
	pub fn fail(&self, path: &str) {
		if let Some(sender) = self.0.borrow_mut().remove(path) {
			let _ = sender.send(Err(LoadError::Fetch(path.to_string())));
		}
	}
}
impl ResourceLoader for ScriptedLoader {
	fn load_audio_clip(&mut self, path: &str, _cache_if_remote: bool) -> PendingClip {
		let (sender, pending) = PendingClip::channel();
		self.0.borrow_mut().insert(path.to_string(), sender);
		pending
	}
}

pub struct Harness {
	pub session: Session,
	pub audio: RecordingAudio,
	pub visuals: RecordingVisuals,
	pub loader: ScriptedLoader,
}
impl Harness {
	pub fn new() -> Self {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
		let audio = RecordingAudio::default();
		let visuals = RecordingVisuals::default();
		let loader = ScriptedLoader::default();
		Harness {
			session: Session::new(audio.clone(), visuals.clone(), loader.clone()),
			audio,
			visuals,
			loader,
		}
	}

	/// Run `seconds` of frames at 100 Hz.
	pub fn run(&mut self, seconds: f32) {
		let frames = (seconds * 100.0).round() as usize;
		for _ in 0..frames {
			self.session.update(0.01);
		}
	}
}
