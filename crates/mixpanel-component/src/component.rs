// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The component entry point: raw host events in, dispatched requests out.
//!
//! This is the boundary where every anomaly is absorbed. An unknown kind, a
//! malformed payload, or a failed dispatch ends as a log line; nothing
//! propagates to the host.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use mixpanel_component_core::{ComponentSettings, EventKind, EventPayload};

use crate::client::{HostClient, UserAgentParser};
use crate::dispatch::Dispatch;
use crate::transform::{transform, HostEvent, RequestArgs};

/// A configured Mixpanel component.
pub struct MixpanelComponent {
	settings: ComponentSettings,
	ua_parser: Box<dyn UserAgentParser + Send + Sync>,
	dispatcher: Box<dyn Dispatch>,
}

impl MixpanelComponent {
	pub fn new(
		settings: ComponentSettings,
		ua_parser: Box<dyn UserAgentParser + Send + Sync>,
		dispatcher: Box<dyn Dispatch>,
	) -> Self {
		Self {
			settings,
			ua_parser,
			dispatcher,
		}
	}

	/// Builds the outbound request for a raw host event, or `None` when the
	/// event produces no request (unknown kind, malformed payload).
	pub fn build_request(
		&self,
		kind: &str,
		payload: Map<String, Value>,
		client: &dyn HostClient,
	) -> Option<RequestArgs> {
		let Some(kind) = EventKind::parse(kind) else {
			debug!(kind, "no mapping for event kind");
			return None;
		};

		let payload = match EventPayload::from_raw(kind, payload) {
			Ok(payload) => payload,
			Err(e) => {
				warn!(kind = %kind, error = %e, "dropping event with malformed payload");
				return None;
			}
		};

		let event = HostEvent {
			payload,
			client,
			ua_parser: &*self.ua_parser,
		};

		match transform(&self.settings, &event) {
			Ok(args) => Some(args),
			Err(e) => {
				warn!(kind = %kind, error = %e, "failed to build request");
				None
			}
		}
	}

	/// Handles one host event end to end: build the request, dispatch it,
	/// and swallow any dispatch failure.
	pub async fn handle_event(
		&self,
		kind: &str,
		payload: Map<String, Value>,
		client: &dyn HostClient,
	) {
		let Some(args) = self.build_request(kind, payload, client) else {
			return;
		};

		if let Err(e) = self.dispatcher.dispatch(&args).await {
			warn!(url = %args.url, error = %e, "analytics dispatch failed");
		}
	}
}
