use crate::{audio::SourceId, timer::Action, BlockId};
use lerp::Lerp;
use map_range::MapRange;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::f32::consts::PI;

new_key_type! {
	pub struct TweenHandle;
}

/// Anything the core animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
	/// Dwell fill amount of a button
	Fill(BlockId),
	Volume(SourceId),
	Pitch(SourceId),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
	#[default]
	Linear,
	QuadIn,
	QuadOut,
	QuadInOut,
	SineInOut,
	BounceOut,
}
impl Easing {
	pub fn apply(self, t: f32) -> f32 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Easing::Linear => t,
			Easing::QuadIn => t * t,
			Easing::QuadOut => t * (2.0 - t),
			Easing::QuadInOut => {
				if t < 0.5 {
					2.0 * t * t
				} else {
					-1.0 + (4.0 - 2.0 * t) * t
				}
			}
			Easing::SineInOut => -((PI * t).cos() - 1.0) * 0.5,
			Easing::BounceOut => {
				const N: f32 = 7.5625;
				const D: f32 = 2.75;
				if t < 1.0 / D {
					N * t * t
				} else if t < 2.0 / D {
					let t = t - 1.5 / D;
					N * t * t + 0.75
				} else if t < 2.5 / D {
					let t = t - 2.25 / D;
					N * t * t + 0.9375
				} else {
					let t = t - 2.625 / D;
					N * t * t + 0.984375
				}
			}
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
	pub from: f32,
	pub to: f32,
	/// Seconds
	pub duration: f32,
	/// Seconds before the value starts moving
	pub delay: f32,
	pub easing: Easing,
}
impl TweenSpec {
	pub fn new(from: f32, to: f32, duration: f32) -> Self {
		TweenSpec {
			from,
			to,
			duration,
			delay: 0.0,
			easing: Easing::Linear,
		}
	}
	pub fn delay(mut self, delay: f32) -> Self {
		self.delay = delay;
		self
	}
	pub fn easing(mut self, easing: Easing) -> Self {
		self.easing = easing;
		self
	}

	fn value_at(&self, elapsed: f32) -> (f32, bool) {
		let moving = elapsed - self.delay;
		if moving < 0.0 {
			return (self.from, false);
		}
		if self.duration <= 0.0 || moving >= self.duration {
			return (self.to, true);
		}
		let t = moving.map_range(0.0..self.duration, 0.0..1.0);
		(Lerp::lerp(self.from, self.to, self.easing.apply(t)), false)
	}
}

#[derive(Debug)]
struct Tween {
	property: TweenProperty,
	spec: TweenSpec,
	elapsed: f32,
	on_complete: Option<Action>,
}

/// One frame of output for a running tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
	pub property: TweenProperty,
	pub value: f32,
	/// Set on the frame the tween finishes, if it had a completion action
	pub completed: Option<Action>,
	pub finished: bool,
}

/// Scalar tweens keyed by the property they drive. A property only ever has
/// one tween; starting another replaces it.
#[derive(Debug, Default)]
pub struct Tweener {
	tweens: SlotMap<TweenHandle, Tween>,
	by_property: FxHashMap<TweenProperty, TweenHandle>,
}
impl Tweener {
	pub fn animate(
		&mut self,
		property: TweenProperty,
		spec: TweenSpec,
		on_complete: Option<Action>,
	) -> TweenHandle {
		self.cancel_property(property);
		let handle = self.tweens.insert(Tween {
			property,
			spec,
			elapsed: 0.0,
			on_complete,
		});
		self.by_property.insert(property, handle);
		handle
	}
	pub fn cancel(&mut self, handle: TweenHandle) -> bool {
		let Some(tween) = self.tweens.remove(handle) else {
			return false;
		};
		if self.by_property.get(&tween.property) == Some(&handle) {
			self.by_property.remove(&tween.property);
		}
		true
	}
	pub fn cancel_property(&mut self, property: TweenProperty) -> bool {
		match self.by_property.remove(&property) {
			Some(handle) => self.tweens.remove(handle).is_some(),
			None => false,
		}
	}
	pub fn cancel_where(&mut self, mut predicate: impl FnMut(TweenProperty) -> bool) {
		self.tweens.retain(|_, tween| !predicate(tween.property));
		self.by_property.retain(|property, _| !predicate(*property));
	}

	pub fn is_animating(&self, property: TweenProperty) -> bool {
		self.by_property.contains_key(&property)
	}
	pub fn target(&self, property: TweenProperty) -> Option<f32> {
		let handle = self.by_property.get(&property)?;
		self.tweens.get(*handle).map(|t| t.spec.to)
	}
	pub fn len(&self) -> usize {
		self.tweens.len()
	}
	pub fn is_empty(&self) -> bool {
		self.tweens.is_empty()
	}

	/// Advance every tween. Finished tweens are removed.
	pub fn update(&mut self, delta: f32) -> Vec<TweenStep> {
		let mut steps = Vec::with_capacity(self.tweens.len());
		let mut finished = Vec::new();
		for (handle, tween) in self.tweens.iter_mut() {
			tween.elapsed += delta.max(0.0);
			let (value, done) = tween.spec.value_at(tween.elapsed);
			steps.push(TweenStep {
				property: tween.property,
				value,
				completed: if done { tween.on_complete } else { None },
				finished: done,
			});
			if done {
				finished.push(handle);
			}
		}
		for handle in finished {
			self.cancel(handle);
		}
		steps
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fill() -> TweenProperty {
		TweenProperty::Fill(SlotMap::<BlockId, ()>::with_key().insert(()))
	}

	#[test]
	fn linear_tween_reaches_target() {
		let property = fill();
		let mut tweener = Tweener::default();
		tweener.animate(property, TweenSpec::new(0.0, 1.0, 2.0), None);

		let steps = tweener.update(0.5);
		assert!((steps[0].value - 0.25).abs() < 1e-5);
		assert!(!steps[0].finished);

		let steps = tweener.update(2.0);
		assert_eq!(steps[0].value, 1.0);
		assert!(steps[0].finished);
		assert!(!tweener.is_animating(property));
	}

	#[test]
	fn delay_holds_the_start_value() {
		let property = fill();
		let mut tweener = Tweener::default();
		tweener.animate(property, TweenSpec::new(0.6, 0.0, 1.0).delay(1.0), None);
		assert_eq!(tweener.update(0.5)[0].value, 0.6);
		assert!((tweener.update(1.0)[0].value - 0.3).abs() < 1e-5);
	}

	#[test]
	fn new_tween_replaces_old_one() {
		let property = fill();
		let mut tweener = Tweener::default();
		let first = tweener.animate(property, TweenSpec::new(0.0, 1.0, 1.0), None);
		tweener.animate(property, TweenSpec::new(0.5, 0.0, 1.0), None);
		assert_eq!(tweener.len(), 1);
		assert!(!tweener.cancel(first));
		assert_eq!(tweener.target(property), Some(0.0));
	}

	#[test]
	fn completion_action_fires_once() {
		let property = fill();
		let TweenProperty::Fill(block) = property else {
			unreachable!()
		};
		let mut tweener = Tweener::default();
		tweener.animate(
			property,
			TweenSpec::new(1.0, 0.0, 0.25),
			Some(Action::CompleteDwell(block)),
		);
		let steps = tweener.update(0.3);
		assert_eq!(steps[0].completed, Some(Action::CompleteDwell(block)));
		assert!(tweener.update(0.3).is_empty());
	}

	#[test]
	fn easings_hit_their_endpoints() {
		for easing in [
			Easing::Linear,
			Easing::QuadIn,
			Easing::QuadOut,
			Easing::QuadInOut,
			Easing::SineInOut,
			Easing::BounceOut,
		] {
			assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?}");
			assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?}");
		}
	}
}
