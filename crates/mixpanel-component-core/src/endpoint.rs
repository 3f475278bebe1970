// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ingestion API endpoint construction.
//!
//! Paths mirror the upstream wire format exactly, including its quirks: the
//! `#fragment` labels sit before the `?verbose=1` query suffix.

use crate::action::ProfileAction;
use crate::event::EventKind;
use crate::settings::ComponentSettings;

const US_API_HOST: &str = "https://api.mixpanel.com";
const EU_API_HOST: &str = "https://api-eu.mixpanel.com";

/// The endpoint path for an event kind.
///
/// Set-property kinds label the path with the raw action name; the other
/// profile kinds carry fixed labels.
pub fn endpoint_path(kind: EventKind, action: Option<ProfileAction>) -> String {
	match kind {
		EventKind::Track => "track".to_string(),
		EventKind::Identify => "track#create-identity".to_string(),
		EventKind::CreateAlias => "track#identity-create-alias".to_string(),
		EventKind::SetUserProperty | EventKind::SetGroupProperty => {
			format!("engage#{}", action.map(|a| a.as_str()).unwrap_or_default())
		}
		EventKind::UnsetUserProperty => "engage#profile-unset".to_string(),
		EventKind::UnsetGroupProperty => "engage#group-unset".to_string(),
		EventKind::DeleteUserProfile => "engage#profile-delete".to_string(),
		EventKind::DeleteGroupProfile => "engage#group-delete".to_string(),
	}
}

/// The full endpoint URL for an event kind under the configured residency.
pub fn api_endpoint(
	settings: &ComponentSettings,
	kind: EventKind,
	action: Option<ProfileAction>,
) -> String {
	let host = if settings.is_eu { EU_API_HOST } else { US_API_HOST };
	format!("{host}/{}?verbose=1", endpoint_path(kind, action))
}
