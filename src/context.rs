use crate::{
	audio::{AudioService, Mixer, SourceId},
	block::{BlockCore, BlockEvent, BlockEventKind},
	focus::FocusRegistry,
	loader::ResourceLoader,
	timer::{Action, Scheduler},
	tween::{TweenHandle, TweenProperty, TweenSpec, Tweener},
	visuals::{Decoration, Transition, VisualState, Visuals},
	BlockId,
};
use tracing::debug;

/// Everything blocks share: the focus registry and the services they drive.
/// Owned by a [`Session`](crate::Session) and lent to blocks per transition.
pub struct Context {
	pub focus: FocusRegistry,
	pub timers: Scheduler,
	pub tweens: Tweener,
	pub mixer: Mixer,
	pub visuals: Box<dyn Visuals>,
	pub loader: Box<dyn ResourceLoader>,
	events: Vec<BlockEvent>,
}
impl Context {
	pub fn new(
		audio: Box<dyn AudioService>,
		visuals: Box<dyn Visuals>,
		loader: Box<dyn ResourceLoader>,
	) -> Self {
		Context {
			focus: FocusRegistry::default(),
			timers: Scheduler::default(),
			tweens: Tweener::default(),
			mixer: Mixer::new(audio),
			visuals,
			loader,
			events: Vec::new(),
		}
	}

	pub fn emit(&mut self, block: BlockId, kind: BlockEventKind) {
		debug!(?block, ?kind, "block event");
		self.events.push(BlockEvent { block, kind });
	}
	pub(crate) fn drain_events(&mut self) -> Vec<BlockEvent> {
		std::mem::take(&mut self.events)
	}

	/// Style a decoration, keeping it hidden while its block is hiding.
	pub fn restyle(
		&mut self,
		core: &BlockCore,
		decoration: Decoration,
		state: VisualState,
		transition: Transition,
	) {
		let state = if core.is_hiding() {
			VisualState::Hide
		} else {
			state
		};
		self.visuals
			.set_decoration(core.id(), decoration, state, transition);
	}

	/// Tween a playing source's volume. Fading to silence stops the source
	/// once the fade ends. Returns `None` if the source isn't playing.
	pub fn fade(
		&mut self,
		source: SourceId,
		target: f32,
		duration: f32,
		delay: f32,
	) -> Option<TweenHandle> {
		let from = self.mixer.volume(source)?;
		let on_complete = (target <= 0.0).then_some(Action::StopSource(source));
		Some(self.tweens.animate(
			TweenProperty::Volume(source),
			TweenSpec::new(from, target, duration).delay(delay),
			on_complete,
		))
	}
	/// Whether `source` is already on its way to silence.
	pub fn is_fading_out(&self, source: SourceId) -> bool {
		self.tweens
			.target(TweenProperty::Volume(source))
			.is_some_and(|target| target <= 0.0)
	}

	pub fn stop_source(&mut self, source: SourceId) {
		self.tweens.cancel_property(TweenProperty::Volume(source));
		self.tweens.cancel_property(TweenProperty::Pitch(source));
		self.mixer.stop(source);
	}

	/// Drop every timer, tween and voice belonging to `block`.
	pub fn release(&mut self, block: BlockId) {
		self.timers.cancel_owner(block);
		self.tweens.cancel_where(|property| match property {
			TweenProperty::Fill(owner) => owner == block,
			TweenProperty::Volume(source) | TweenProperty::Pitch(source) => source.block() == block,
		});
		self.mixer.stop(SourceId::FillLoop(block));
		self.mixer.stop(SourceId::Playback(block));
		self.focus.forget_block(block);
		self.visuals.forget(block);
	}
}
