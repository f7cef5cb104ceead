use crate::{BlockId, GroupId};
use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct GroupFocus {
	focused: Option<BlockId>,
	gaze_target: Option<BlockId>,
	/// Survives `clear_gaze_target` so a returning gaze can tell whether
	/// something else was looked at in between.
	last_gaze_target: Option<BlockId>,
}

/// Which block holds focus, and which block is being dwelled on, per group.
///
/// Owned by a [`Session`](crate::Session) rather than being global, so separate
/// sessions never see each other's focus.
#[derive(Debug, Default)]
pub struct FocusRegistry {
	groups: FxHashMap<GroupId, GroupFocus>,
}
impl FocusRegistry {
	pub fn set_focus(&mut self, group: GroupId, block: BlockId) {
		trace!(?group, ?block, "focus set");
		self.groups.entry(group).or_default().focused = Some(block);
	}
	pub fn clear_focus(&mut self, group: GroupId) {
		if let Some(focus) = self.groups.get_mut(&group) {
			focus.focused = None;
		}
	}
	pub fn is_focused(&self, group: GroupId) -> bool {
		self.focused(group).is_some()
	}
	pub fn focused(&self, group: GroupId) -> Option<BlockId> {
		self.groups.get(&group).and_then(|f| f.focused)
	}
	pub fn is_block_focused(&self, group: GroupId, block: BlockId) -> bool {
		self.focused(group) == Some(block)
	}

	/// Replaces whatever was the gaze target of this group before.
	pub fn set_gaze_target(&mut self, group: GroupId, block: BlockId) {
		trace!(?group, ?block, "gaze target set");
		let focus = self.groups.entry(group).or_default();
		focus.gaze_target = Some(block);
		focus.last_gaze_target = Some(block);
	}
	/// Only clears the target if it's still `block`.
	pub fn clear_gaze_target(&mut self, group: GroupId, block: BlockId) {
		if let Some(focus) = self.groups.get_mut(&group) {
			if focus.gaze_target == Some(block) {
				trace!(?group, ?block, "gaze target cleared");
				focus.gaze_target = None;
			}
		}
	}
	pub fn gaze_target(&self, group: GroupId) -> Option<BlockId> {
		self.groups.get(&group).and_then(|f| f.gaze_target)
	}
	pub fn last_gaze_target(&self, group: GroupId) -> Option<BlockId> {
		self.groups.get(&group).and_then(|f| f.last_gaze_target)
	}

	/// Drop every reference to a block that's about to be destroyed.
	pub fn forget_block(&mut self, block: BlockId) {
		for focus in self.groups.values_mut() {
			if focus.focused == Some(block) {
				focus.focused = None;
			}
			if focus.gaze_target == Some(block) {
				focus.gaze_target = None;
			}
			if focus.last_gaze_target == Some(block) {
				focus.last_gaze_target = None;
			}
		}
	}
	pub fn forget_group(&mut self, group: GroupId) {
		self.groups.remove(&group);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use slotmap::SlotMap;

	fn ids() -> (GroupId, GroupId, BlockId, BlockId) {
		let mut groups = SlotMap::<GroupId, ()>::with_key();
		let mut blocks = SlotMap::<BlockId, ()>::with_key();
		(
			groups.insert(()),
			groups.insert(()),
			blocks.insert(()),
			blocks.insert(()),
		)
	}

	#[test]
	fn focus_is_per_group() {
		let (g1, g2, a, b) = ids();
		let mut focus = FocusRegistry::default();
		focus.set_focus(g1, a);
		assert!(focus.is_focused(g1));
		assert!(!focus.is_focused(g2));

		focus.set_focus(g1, b);
		assert_eq!(focus.focused(g1), Some(b));
		assert!(!focus.is_block_focused(g1, a));

		focus.clear_focus(g1);
		assert!(!focus.is_focused(g1));
	}

	#[test]
	fn clearing_someone_elses_gaze_target_is_ignored() {
		let (g, _, a, b) = ids();
		let mut focus = FocusRegistry::default();
		focus.set_gaze_target(g, a);
		focus.set_gaze_target(g, b);
		focus.clear_gaze_target(g, a);
		assert_eq!(focus.gaze_target(g), Some(b));

		focus.clear_gaze_target(g, b);
		assert_eq!(focus.gaze_target(g), None);
		assert_eq!(focus.last_gaze_target(g), Some(b));
	}

	#[test]
	fn forgetting_a_block_clears_every_reference() {
		let (g, _, a, _) = ids();
		let mut focus = FocusRegistry::default();
		focus.set_focus(g, a);
		focus.set_gaze_target(g, a);
		focus.forget_block(a);
		assert!(!focus.is_focused(g));
		assert_eq!(focus.gaze_target(g), None);
		assert_eq!(focus.last_gaze_target(g), None);
	}
}
