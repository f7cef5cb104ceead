use crate::{audio::SourceId, BlockId};
use slotmap::{new_key_type, SlotMap};
use std::{cmp::Ordering, collections::BinaryHeap};
use tracing::trace;

new_key_type! {
	/// Cancels every action scheduled under it at once.
	pub struct TimerToken;
}

/// Deferred work. Actions are plain data addressed to a block, so a fired
/// action can never reach into a block that's gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	FadeOutFillSound(BlockId),
	CompleteDwell(BlockId),
	StopSource(SourceId),
}

#[derive(Debug)]
struct TokenState {
	owner: BlockId,
	pending: usize,
}

#[derive(Debug)]
struct Entry {
	due: f64,
	seq: u64,
	token: TimerToken,
	action: Action,
}
impl PartialEq for Entry {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}
impl Eq for Entry {}
impl PartialOrd for Entry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for Entry {
	fn cmp(&self, other: &Self) -> Ordering {
		// reversed so the BinaryHeap pops the earliest entry first
		other
			.due
			.total_cmp(&self.due)
			.then_with(|| other.seq.cmp(&self.seq))
	}
}

/// Frame driven one-shot timers.
#[derive(Debug, Default)]
pub struct Scheduler {
	now: f64,
	seq: u64,
	tokens: SlotMap<TimerToken, TokenState>,
	queue: BinaryHeap<Entry>,
}
impl Scheduler {
	/// Seconds since the scheduler was created.
	pub fn now(&self) -> f64 {
		self.now
	}

	pub fn token(&mut self, owner: BlockId) -> TimerToken {
		self.tokens.insert(TokenState { owner, pending: 0 })
	}
	/// Negative delays are treated as zero. Does nothing if `token` was cancelled.
	pub fn schedule(&mut self, token: TimerToken, delay: f32, action: Action) {
		let Some(state) = self.tokens.get_mut(token) else {
			return;
		};
		state.pending += 1;
		self.seq += 1;
		self.queue.push(Entry {
			due: self.now + delay.max(0.0) as f64,
			seq: self.seq,
			token,
			action,
		});
	}

	/// Returns whether anything was still pending under the token.
	pub fn cancel(&mut self, token: TimerToken) -> bool {
		self.tokens.remove(token).is_some_and(|s| s.pending > 0)
	}
	pub fn cancel_owner(&mut self, owner: BlockId) {
		self.tokens.retain(|_, state| state.owner != owner);
	}
	pub fn is_pending(&self, token: TimerToken) -> bool {
		self.tokens.get(token).is_some_and(|s| s.pending > 0)
	}
	/// Number of live actions waiting to fire.
	pub fn pending_count(&self) -> usize {
		self.tokens.values().map(|s| s.pending).sum()
	}

	pub fn advance(&mut self, delta: f32) {
		self.now += delta.max(0.0) as f64;
	}
	/// Pop the next action that's due, skipping cancelled ones.
	/// Call repeatedly until it returns `None`.
	pub fn pop_due(&mut self) -> Option<Action> {
		while let Some(entry) = self.queue.peek() {
			if entry.due > self.now {
				return None;
			}
			let entry = self.queue.pop()?;
			let Some(state) = self.tokens.get_mut(entry.token) else {
				continue;
			};
			state.pending -= 1;
			if state.pending == 0 {
				self.tokens.remove(entry.token);
			}
			trace!(action = ?entry.action, due = entry.due, "timer fired");
			return Some(entry.action);
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn block() -> BlockId {
		SlotMap::<BlockId, ()>::with_key().insert(())
	}

	fn schedule(scheduler: &mut Scheduler, owner: BlockId, delay: f32, action: Action) -> TimerToken {
		let token = scheduler.token(owner);
		scheduler.schedule(token, delay, action);
		token
	}

	fn drain(scheduler: &mut Scheduler) -> Vec<Action> {
		std::iter::from_fn(|| scheduler.pop_due()).collect()
	}

	#[test]
	fn fires_in_due_order() {
		let owner = block();
		let mut scheduler = Scheduler::default();
		schedule(&mut scheduler, owner, 2.0, Action::CompleteDwell(owner));
		schedule(&mut scheduler, owner, 1.0, Action::FadeOutFillSound(owner));

		scheduler.advance(0.5);
		assert!(drain(&mut scheduler).is_empty());
		scheduler.advance(2.0);
		assert_eq!(
			drain(&mut scheduler),
			vec![Action::FadeOutFillSound(owner), Action::CompleteDwell(owner)]
		);
		assert_eq!(scheduler.pending_count(), 0);
	}

	#[test]
	fn one_token_cancels_both_actions() {
		let owner = block();
		let mut scheduler = Scheduler::default();
		let token = scheduler.token(owner);
		scheduler.schedule(token, 0.5, Action::FadeOutFillSound(owner));
		scheduler.schedule(token, 1.0, Action::CompleteDwell(owner));
		assert_eq!(scheduler.pending_count(), 2);

		assert!(scheduler.cancel(token));
		assert!(!scheduler.cancel(token));
		scheduler.advance(5.0);
		assert!(drain(&mut scheduler).is_empty());
	}

	#[test]
	fn negative_delay_fires_on_the_next_pop() {
		let owner = block();
		let mut scheduler = Scheduler::default();
		schedule(&mut scheduler, owner, -3.0, Action::CompleteDwell(owner));
		assert_eq!(scheduler.pop_due(), Some(Action::CompleteDwell(owner)));
	}

	#[test]
	fn cancelled_token_rejects_new_actions() {
		let owner = block();
		let mut scheduler = Scheduler::default();
		let token = scheduler.token(owner);
		scheduler.cancel(token);
		scheduler.schedule(token, 0.0, Action::CompleteDwell(owner));
		assert_eq!(scheduler.pending_count(), 0);
		assert_eq!(scheduler.pop_due(), None);
	}

	#[test]
	fn cancel_owner_only_touches_that_owner() {
		let mut blocks = SlotMap::<BlockId, ()>::with_key();
		let (a, b) = (blocks.insert(()), blocks.insert(()));
		let mut scheduler = Scheduler::default();
		schedule(&mut scheduler, a, 1.0, Action::CompleteDwell(a));
		let kept = schedule(&mut scheduler, b, 1.0, Action::CompleteDwell(b));

		scheduler.cancel_owner(a);
		assert!(scheduler.is_pending(kept));
		scheduler.advance(1.0);
		assert_eq!(drain(&mut scheduler), vec![Action::CompleteDwell(b)]);
	}
}
