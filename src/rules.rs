use crate::{
	block::{BlockNotice, Command},
	error::SettingsError,
	BlockId, GroupId,
};
use serde::{Deserialize, Serialize};

/// When a block should react to another block being selected.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactiveRule {
	#[default]
	Never,
	OnAnyOtherSelected,
	OnSpecificBlocksSelected(Vec<BlockId>),
	OnAnyInMyGroupSelected,
	OnAnyInSpecificGroupsSelected(Vec<GroupId>),
}
impl ReactiveRule {
	pub fn matches(&self, me: BlockId, my_group: Option<GroupId>, selected: &BlockNotice) -> bool {
		match self {
			ReactiveRule::Never => false,
			ReactiveRule::OnAnyOtherSelected => selected.block != me,
			ReactiveRule::OnSpecificBlocksSelected(blocks) => blocks.contains(&selected.block),
			ReactiveRule::OnAnyInMyGroupSelected => {
				my_group.is_some() && selected.group == my_group
			}
			ReactiveRule::OnAnyInSpecificGroupsSelected(groups) => selected
				.group
				.is_some_and(|group| groups.contains(&group)),
		}
	}

	fn validate(&self, rule: &'static str) -> Result<(), SettingsError> {
		let empty = match self {
			ReactiveRule::OnSpecificBlocksSelected(blocks) => blocks.is_empty(),
			ReactiveRule::OnAnyInSpecificGroupsSelected(groups) => groups.is_empty(),
			_ => false,
		};
		if empty {
			return Err(SettingsError::EmptyTargetList { rule });
		}
		Ok(())
	}
}

/// Four independent rule slots, one per transition.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactiveRules {
	pub hide_when: ReactiveRule,
	pub show_when: ReactiveRule,
	pub disable_when: ReactiveRule,
	pub enable_when: ReactiveRule,
}
impl ReactiveRules {
	fn slots(&self) -> [(&'static str, &ReactiveRule, Command); 4] {
		[
			("hide", &self.hide_when, Command::Hide),
			("show", &self.show_when, Command::Show),
			("disable", &self.disable_when, Command::Disable),
			("enable", &self.enable_when, Command::Enable),
		]
	}

	/// Every transition whose rule matches, in Hide, Show, Disable, Enable order.
	pub fn responses(
		&self,
		me: BlockId,
		my_group: Option<GroupId>,
		selected: &BlockNotice,
	) -> Vec<Command> {
		self.slots()
			.into_iter()
			.filter(|(_, rule, _)| rule.matches(me, my_group, selected))
			.map(|(_, _, command)| command)
			.collect()
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		for (name, rule, _) in self.slots() {
			rule.validate(name)?;
		}
		Ok(())
	}

	pub(crate) fn referenced_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
		self.slots().into_iter().flat_map(|(_, rule, _)| match rule {
			ReactiveRule::OnSpecificBlocksSelected(blocks) => blocks.clone(),
			_ => Vec::new(),
		})
	}
	pub(crate) fn referenced_groups(&self) -> impl Iterator<Item = GroupId> + '_ {
		self.slots().into_iter().flat_map(|(_, rule, _)| match rule {
			ReactiveRule::OnAnyInSpecificGroupsSelected(groups) => groups.clone(),
			_ => Vec::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::block::BlockKind;
	use slotmap::SlotMap;

	struct Ids {
		me: BlockId,
		other: BlockId,
		third: BlockId,
		mine: GroupId,
		elsewhere: GroupId,
	}
	fn ids() -> Ids {
		let mut blocks = SlotMap::<BlockId, ()>::with_key();
		let mut groups = SlotMap::<GroupId, ()>::with_key();
		Ids {
			me: blocks.insert(()),
			other: blocks.insert(()),
			third: blocks.insert(()),
			mine: groups.insert(()),
			elsewhere: groups.insert(()),
		}
	}
	fn selected(block: BlockId, group: Option<GroupId>) -> BlockNotice {
		BlockNotice {
			block,
			group,
			kind: BlockKind::Button,
		}
	}

	#[test]
	fn each_rule_matches_its_own_condition() {
		let ids = ids();
		let sibling = selected(ids.other, Some(ids.mine));
		let stranger = selected(ids.third, Some(ids.elsewhere));

		assert!(!ReactiveRule::Never.matches(ids.me, Some(ids.mine), &sibling));
		assert!(ReactiveRule::OnAnyOtherSelected.matches(ids.me, Some(ids.mine), &stranger));
		assert!(!ReactiveRule::OnAnyOtherSelected.matches(
			ids.me,
			Some(ids.mine),
			&selected(ids.me, Some(ids.mine))
		));
		assert!(ReactiveRule::OnAnyInMyGroupSelected.matches(ids.me, Some(ids.mine), &sibling));
		assert!(!ReactiveRule::OnAnyInMyGroupSelected.matches(ids.me, Some(ids.mine), &stranger));
		assert!(!ReactiveRule::OnAnyInMyGroupSelected.matches(
			ids.me,
			None,
			&selected(ids.other, None)
		));

		let specific = ReactiveRule::OnSpecificBlocksSelected(vec![ids.third]);
		assert!(specific.matches(ids.me, Some(ids.mine), &stranger));
		assert!(!specific.matches(ids.me, Some(ids.mine), &sibling));

		let groups = ReactiveRule::OnAnyInSpecificGroupsSelected(vec![ids.elsewhere]);
		assert!(groups.matches(ids.me, Some(ids.mine), &stranger));
		assert!(!groups.matches(ids.me, Some(ids.mine), &sibling));
	}

	#[test]
	fn responses_keep_fixed_order() {
		let ids = ids();
		let rules = ReactiveRules {
			enable_when: ReactiveRule::OnAnyOtherSelected,
			hide_when: ReactiveRule::OnAnyInMyGroupSelected,
			show_when: ReactiveRule::Never,
			disable_when: ReactiveRule::OnSpecificBlocksSelected(vec![ids.other]),
		};
		assert_eq!(
			rules.responses(ids.me, Some(ids.mine), &selected(ids.other, Some(ids.mine))),
			vec![Command::Hide, Command::Disable, Command::Enable]
		);
	}

	#[test]
	fn empty_target_lists_are_rejected() {
		let rules = ReactiveRules {
			show_when: ReactiveRule::OnAnyInSpecificGroupsSelected(Vec::new()),
			..Default::default()
		};
		assert_eq!(
			rules.validate(),
			Err(SettingsError::EmptyTargetList { rule: "show" })
		);
		assert!(ReactiveRules::default().validate().is_ok());
	}
}
