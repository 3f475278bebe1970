// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Component configuration supplied by the host.

use serde::{Deserialize, Serialize};

/// Settings the host passes when instantiating the component.
///
/// `token` is the Mixpanel project token. It doubles as the storage key for
/// the per-visitor identity value. `is_eu` selects the EU data-residency
/// ingestion host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSettings {
	pub token: String,
	#[serde(rename = "isEU", default)]
	pub is_eu: bool,
}

impl ComponentSettings {
	/// Creates settings from a project token and residency flag.
	pub fn new(token: impl Into<String>, is_eu: bool) -> Self {
		Self {
			token: token.into(),
			is_eu,
		}
	}
}
