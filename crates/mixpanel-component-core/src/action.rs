// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The profile-mutation action table.
//!
//! A set-property payload names an action (e.g. `profile-union`). The action
//! selects both the wire-level operator key in the `engage` body and the URL
//! fragment appended to the endpoint path. Unknown action names are a
//! defined error, never a silently mangled operator key.

use crate::error::CoreError;

/// A profile-mutation action carried in a set-property payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileAction {
	ProfileSet,
	ProfileSetOnce,
	ProfileNumericalAdd,
	ProfileUnion,
	ProfileListAppend,
	ProfileListRemove,
	GroupSet,
	GroupSetOnce,
	GroupRemoveFromList,
	GroupUnion,
}

impl ProfileAction {
	/// All actions in the table, in wire order.
	pub const ALL: [ProfileAction; 10] = [
		ProfileAction::ProfileSet,
		ProfileAction::ProfileSetOnce,
		ProfileAction::ProfileNumericalAdd,
		ProfileAction::ProfileUnion,
		ProfileAction::ProfileListAppend,
		ProfileAction::ProfileListRemove,
		ProfileAction::GroupSet,
		ProfileAction::GroupSetOnce,
		ProfileAction::GroupRemoveFromList,
		ProfileAction::GroupUnion,
	];

	/// The raw action name. Used verbatim as the `engage#` URL fragment.
	pub fn as_str(&self) -> &'static str {
		match self {
			ProfileAction::ProfileSet => "profile-set",
			ProfileAction::ProfileSetOnce => "profile-set-once",
			ProfileAction::ProfileNumericalAdd => "profile-numerical-add",
			ProfileAction::ProfileUnion => "profile-union",
			ProfileAction::ProfileListAppend => "profile-list-append",
			ProfileAction::ProfileListRemove => "profile-list-remove",
			ProfileAction::GroupSet => "group-set",
			ProfileAction::GroupSetOnce => "group-set-once",
			ProfileAction::GroupRemoveFromList => "group-remove-from-list",
			ProfileAction::GroupUnion => "group-union",
		}
	}

	/// The operator key this action writes into the `engage` request body.
	pub fn operator(&self) -> &'static str {
		match self {
			ProfileAction::ProfileSet | ProfileAction::GroupSet => "$set",
			ProfileAction::ProfileSetOnce | ProfileAction::GroupSetOnce => "$set_once",
			ProfileAction::ProfileNumericalAdd => "$add",
			ProfileAction::ProfileUnion | ProfileAction::GroupUnion => "$union",
			ProfileAction::ProfileListAppend => "$append",
			ProfileAction::ProfileListRemove | ProfileAction::GroupRemoveFromList => "$remove",
		}
	}

	/// Returns `true` when the operator takes comma-split list values.
	pub fn is_union(&self) -> bool {
		matches!(self, ProfileAction::ProfileUnion | ProfileAction::GroupUnion)
	}
}

impl std::fmt::Display for ProfileAction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for ProfileAction {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"profile-set" => Ok(ProfileAction::ProfileSet),
			"profile-set-once" => Ok(ProfileAction::ProfileSetOnce),
			"profile-numerical-add" => Ok(ProfileAction::ProfileNumericalAdd),
			"profile-union" => Ok(ProfileAction::ProfileUnion),
			"profile-list-append" => Ok(ProfileAction::ProfileListAppend),
			"profile-list-remove" => Ok(ProfileAction::ProfileListRemove),
			"group-set" => Ok(ProfileAction::GroupSet),
			"group-set-once" => Ok(ProfileAction::GroupSetOnce),
			"group-remove-from-list" => Ok(ProfileAction::GroupRemoveFromList),
			"group-union" => Ok(ProfileAction::GroupUnion),
			other => Err(CoreError::UnknownAction(other.to_string())),
		}
	}
}
