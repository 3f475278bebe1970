// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The typed inbound event model.
//!
//! The host delivers events as a kind string plus a JSON payload map.
//! [`EventKind::parse`] identifies the kind (unknown kinds are a no-op, not
//! an error) and [`EventPayload::from_raw`] extracts the per-kind payload,
//! stripping exactly the reserved keys each mapping consumes and passing
//! everything else through verbatim.

use serde_json::{Map, Value};
use std::str::FromStr;

use crate::action::ProfileAction;
use crate::error::{CoreError, Result};

/// The nine event kinds this component maps to API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Track,
	CreateAlias,
	Identify,
	SetUserProperty,
	SetGroupProperty,
	UnsetUserProperty,
	UnsetGroupProperty,
	DeleteUserProfile,
	DeleteGroupProfile,
}

impl EventKind {
	/// All supported kinds.
	pub const ALL: [EventKind; 9] = [
		EventKind::Track,
		EventKind::CreateAlias,
		EventKind::Identify,
		EventKind::SetUserProperty,
		EventKind::SetGroupProperty,
		EventKind::UnsetUserProperty,
		EventKind::UnsetGroupProperty,
		EventKind::DeleteUserProfile,
		EventKind::DeleteGroupProfile,
	];

	/// The host-side kind string.
	pub fn as_str(&self) -> &'static str {
		match self {
			EventKind::Track => "track",
			EventKind::CreateAlias => "create_alias",
			EventKind::Identify => "identify",
			EventKind::SetUserProperty => "set_user_property",
			EventKind::SetGroupProperty => "set_group_property",
			EventKind::UnsetUserProperty => "unset_user_property",
			EventKind::UnsetGroupProperty => "unset_group_property",
			EventKind::DeleteUserProfile => "delete_user_profile",
			EventKind::DeleteGroupProfile => "delete_group_profile",
		}
	}

	/// Identifies a host kind string. Unknown kinds yield `None`; no mapping
	/// fires for them.
	pub fn parse(s: &str) -> Option<Self> {
		EventKind::ALL.into_iter().find(|kind| kind.as_str() == s)
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Group profile identifiers, passed through to the wire verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupRef {
	pub key: Option<Value>,
	pub id: Option<Value>,
}

impl GroupRef {
	fn take_from(payload: &mut Map<String, Value>) -> Self {
		Self {
			key: payload.remove("$group_key"),
			id: payload.remove("$group_id"),
		}
	}
}

/// Payload for a generic custom event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPayload {
	/// The event name reported to the ingestion API.
	pub event: Option<String>,
	/// An identified-user id riding along on the event, if any.
	pub identified_id: Option<String>,
	/// Everything else in the payload; forwarded verbatim as properties.
	pub custom: Map<String, Value>,
}

/// Payload linking an alias to the visitor's identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasPayload {
	pub alias: Option<String>,
	pub identified_id: Option<String>,
}

/// Payload declaring the visitor's identified-user id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifyPayload {
	pub identified_id: Option<String>,
}

/// Payload for a set-property profile mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct SetProfilePayload {
	pub action: ProfileAction,
	pub group: GroupRef,
	/// The fields the operator applies to; everything the payload carried
	/// apart from the reserved keys.
	pub fields: Map<String, Value>,
}

/// Payload for an unset-property profile mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnsetProfilePayload {
	/// Comma-separated property names to unset.
	pub unset_list: Option<String>,
	pub group: GroupRef,
}

/// Payload for a profile deletion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteProfilePayload {
	/// Only honored when the payload supplied a JSON boolean.
	pub ignore_alias: Option<bool>,
	pub group: GroupRef,
}

/// A closed variant over the supported event kinds.
///
/// Each case carries its own typed payload, and the transformer matches
/// exhaustively over this enum, so a new kind cannot be added without a
/// body rule.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
	Track(TrackPayload),
	CreateAlias(AliasPayload),
	Identify(IdentifyPayload),
	SetUserProperty(SetProfilePayload),
	SetGroupProperty(SetProfilePayload),
	UnsetUserProperty(UnsetProfilePayload),
	UnsetGroupProperty(UnsetProfilePayload),
	DeleteUserProfile(DeleteProfilePayload),
	DeleteGroupProfile(DeleteProfilePayload),
}

fn take_string(payload: &mut Map<String, Value>, key: &str) -> Option<String> {
	match payload.remove(key) {
		Some(Value::String(s)) => Some(s),
		_ => None,
	}
}

impl EventPayload {
	/// The kind this payload belongs to.
	pub fn kind(&self) -> EventKind {
		match self {
			EventPayload::Track(_) => EventKind::Track,
			EventPayload::CreateAlias(_) => EventKind::CreateAlias,
			EventPayload::Identify(_) => EventKind::Identify,
			EventPayload::SetUserProperty(_) => EventKind::SetUserProperty,
			EventPayload::SetGroupProperty(_) => EventKind::SetGroupProperty,
			EventPayload::UnsetUserProperty(_) => EventKind::UnsetUserProperty,
			EventPayload::UnsetGroupProperty(_) => EventKind::UnsetGroupProperty,
			EventPayload::DeleteUserProfile(_) => EventKind::DeleteUserProfile,
			EventPayload::DeleteGroupProfile(_) => EventKind::DeleteGroupProfile,
		}
	}

	/// Extracts the typed payload for `kind` from the host's raw payload map.
	///
	/// Reserved keys are removed per kind; remaining fields pass through
	/// untouched, `$`-prefixed or not. A set-property payload with an action
	/// name outside the table is [`CoreError::UnknownAction`]; one with no
	/// action key at all is [`CoreError::MissingAction`].
	pub fn from_raw(kind: EventKind, mut payload: Map<String, Value>) -> Result<Self> {
		match kind {
			EventKind::Track => {
				let event = take_string(&mut payload, "event");
				let identified_id = take_string(&mut payload, "$identified_id");
				payload.remove("timestamp");
				payload.remove("$sr");
				Ok(EventPayload::Track(TrackPayload {
					event,
					identified_id,
					custom: payload,
				}))
			}
			EventKind::CreateAlias => Ok(EventPayload::CreateAlias(AliasPayload {
				alias: take_string(&mut payload, "alias"),
				identified_id: take_string(&mut payload, "$identified_id"),
			})),
			EventKind::Identify => Ok(EventPayload::Identify(IdentifyPayload {
				identified_id: take_string(&mut payload, "$identified_id"),
			})),
			EventKind::SetUserProperty | EventKind::SetGroupProperty => {
				// Both kinds accept either action key; user takes precedence.
				let user_action = take_string(&mut payload, "user-set-action");
				let group_action = take_string(&mut payload, "group-set-action");
				let name = user_action
					.or(group_action)
					.ok_or(CoreError::MissingAction)?;
				let action = ProfileAction::from_str(&name)?;
				payload.remove("timestamp");
				let group = GroupRef::take_from(&mut payload);
				let set = SetProfilePayload {
					action,
					group,
					fields: payload,
				};
				Ok(match kind {
					EventKind::SetUserProperty => EventPayload::SetUserProperty(set),
					_ => EventPayload::SetGroupProperty(set),
				})
			}
			EventKind::UnsetUserProperty | EventKind::UnsetGroupProperty => {
				let unset = UnsetProfilePayload {
					unset_list: take_string(&mut payload, "unsetList"),
					group: GroupRef::take_from(&mut payload),
				};
				Ok(match kind {
					EventKind::UnsetUserProperty => EventPayload::UnsetUserProperty(unset),
					_ => EventPayload::UnsetGroupProperty(unset),
				})
			}
			EventKind::DeleteUserProfile | EventKind::DeleteGroupProfile => {
				let ignore_alias = match payload.remove("$ignore_alias") {
					Some(Value::Bool(b)) => Some(b),
					_ => None,
				};
				let delete = DeleteProfilePayload {
					ignore_alias,
					group: GroupRef::take_from(&mut payload),
				};
				Ok(match kind {
					EventKind::DeleteUserProfile => EventPayload::DeleteUserProfile(delete),
					_ => EventPayload::DeleteGroupProfile(delete),
				})
			}
		}
	}
}
