// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The event transformer: one request rule per event kind.
//!
//! [`transform`] matches exhaustively over [`EventPayload`], so every
//! supported kind has exactly one endpoint/body pairing and a new kind
//! cannot compile without one. Two body encodings exist and must not be
//! mixed up: ingestion kinds send a raw JSON array, identity-linking kinds
//! (identify, alias) send a single `data` form field carrying JSON. Both go
//! out with the same fixed headers.

use serde_json::{Map, Value};

use mixpanel_component_core::{
	api_endpoint, AliasPayload, ComponentSettings, DeleteProfilePayload, EventKind, EventPayload,
	IdentifyPayload, SetProfilePayload, TrackPayload, UnsetProfilePayload,
};

use crate::client::{HostClient, UserAgentParser};
use crate::context::{EventProperties, ProfileProperties};
use crate::error::Result;

/// Method shared by every outbound request.
pub const METHOD: &str = "POST";

/// Headers shared by every outbound request, form-encoded bodies included.
pub const HEADERS: [(&str, &str); 2] = [
	("accept", "text/plain"),
	("content-type", "application/json"),
];

/// An inbound event paired with the host capabilities needed to enrich it.
pub struct HostEvent<'a> {
	pub payload: EventPayload,
	pub client: &'a dyn HostClient,
	pub ua_parser: &'a dyn UserAgentParser,
}

/// The request body, in one of the two wire encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
	/// A raw JSON array with one object (track and `engage` kinds).
	Json(Value),
	/// A single `data` form field carrying the JSON object (identify, alias).
	Form(Value),
}

impl RequestBody {
	/// Encodes the body to the exact wire bytes.
	pub fn encode(&self) -> Result<String> {
		match self {
			RequestBody::Json(value) => Ok(serde_json::to_string(value)?),
			RequestBody::Form(value) => {
				let json = serde_json::to_string(value)?;
				Ok(format!("data={}", urlencoding::encode(&json)))
			}
		}
	}
}

/// A fully built outbound request.
#[derive(Debug, Clone)]
pub struct RequestArgs {
	pub url: String,
	pub method: &'static str,
	pub headers: [(&'static str, &'static str); 2],
	pub body: RequestBody,
}

impl RequestArgs {
	fn post(url: String, body: RequestBody) -> Self {
		Self {
			url,
			method: METHOD,
			headers: HEADERS,
			body,
		}
	}
}

/// Splits a comma-separated list, trimming segments and dropping empties.
/// Duplicates are preserved.
fn split_comma_list(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|segment| !segment.is_empty())
		.map(str::to_string)
		.collect()
}

/// Applies `$union` list shaping: string values become comma-split arrays,
/// anything else passes through unchanged.
fn union_fields(fields: &Map<String, Value>) -> Map<String, Value> {
	fields
		.iter()
		.map(|(key, value)| {
			let shaped = match value {
				Value::String(s) => Value::Array(
					split_comma_list(s).into_iter().map(Value::String).collect(),
				),
				other => other.clone(),
			};
			(key.clone(), shaped)
		})
		.collect()
}

fn array_of_one(object: Map<String, Value>) -> RequestBody {
	RequestBody::Json(Value::Array(vec![Value::Object(object)]))
}

/// Builds the request for an event. The single exhaustive mapping from
/// event kind to endpoint and body.
pub fn transform(settings: &ComponentSettings, event: &HostEvent<'_>) -> Result<RequestArgs> {
	match &event.payload {
		EventPayload::Track(payload) => build_track(settings, event, payload),
		EventPayload::CreateAlias(payload) => build_alias(settings, event, payload),
		EventPayload::Identify(payload) => build_identify(settings, event, payload),
		EventPayload::SetUserProperty(payload) => {
			build_set(settings, event, EventKind::SetUserProperty, payload)
		}
		EventPayload::SetGroupProperty(payload) => {
			build_set(settings, event, EventKind::SetGroupProperty, payload)
		}
		EventPayload::UnsetUserProperty(payload) => {
			build_unset(settings, event, EventKind::UnsetUserProperty, payload)
		}
		EventPayload::UnsetGroupProperty(payload) => {
			build_unset(settings, event, EventKind::UnsetGroupProperty, payload)
		}
		EventPayload::DeleteUserProfile(payload) => {
			build_delete(settings, event, EventKind::DeleteUserProfile, payload)
		}
		EventPayload::DeleteGroupProfile(payload) => {
			build_delete(settings, event, EventKind::DeleteGroupProfile, payload)
		}
	}
}

fn build_track(
	settings: &ComponentSettings,
	event: &HostEvent<'_>,
	payload: &TrackPayload,
) -> Result<RequestArgs> {
	let bag = EventProperties::collect(
		settings,
		event.client,
		event.ua_parser,
		payload.identified_id.as_deref(),
	);

	// Custom fields first; the enriched bag wins on key collisions.
	let mut properties = payload.custom.clone();
	properties.extend(bag.into_map()?);

	let mut body = Map::new();
	if let Some(name) = &payload.event {
		body.insert("event".to_string(), Value::String(name.clone()));
	}
	body.insert("properties".to_string(), Value::Object(properties));

	Ok(RequestArgs::post(
		api_endpoint(settings, EventKind::Track, None),
		array_of_one(body),
	))
}

fn build_alias(
	settings: &ComponentSettings,
	event: &HostEvent<'_>,
	payload: &AliasPayload,
) -> Result<RequestArgs> {
	let bag = EventProperties::collect(
		settings,
		event.client,
		event.ua_parser,
		payload.identified_id.as_deref(),
	);

	let mut properties = bag.into_map()?;
	if let Some(alias) = &payload.alias {
		properties.insert("alias".to_string(), Value::String(alias.clone()));
	}

	let mut body = Map::new();
	body.insert(
		"event".to_string(),
		Value::String("$create_alias".to_string()),
	);
	body.insert("properties".to_string(), Value::Object(properties));

	Ok(RequestArgs::post(
		api_endpoint(settings, EventKind::CreateAlias, None),
		RequestBody::Form(Value::Object(body)),
	))
}

fn build_identify(
	settings: &ComponentSettings,
	event: &HostEvent<'_>,
	payload: &IdentifyPayload,
) -> Result<RequestArgs> {
	let bag = EventProperties::collect(
		settings,
		event.client,
		event.ua_parser,
		payload.identified_id.as_deref(),
	);

	// The anonymous device id, regardless of whether identity was already
	// resolved.
	let anon_id = bag.device_id.clone();
	let mut properties = bag.into_map()?;
	if let Some(id) = &payload.identified_id {
		properties.insert("$identified_id".to_string(), Value::String(id.clone()));
	}
	properties.insert("$anon_id".to_string(), Value::String(anon_id));

	let mut body = Map::new();
	body.insert("event".to_string(), Value::String("$identify".to_string()));
	body.insert("properties".to_string(), Value::Object(properties));

	Ok(RequestArgs::post(
		api_endpoint(settings, EventKind::Identify, None),
		RequestBody::Form(Value::Object(body)),
	))
}

fn build_set(
	settings: &ComponentSettings,
	event: &HostEvent<'_>,
	kind: EventKind,
	payload: &SetProfilePayload,
) -> Result<RequestArgs> {
	let mut body = ProfileProperties::collect(settings, event.client, &payload.group).into_map()?;

	let fields = if payload.action.is_union() {
		union_fields(&payload.fields)
	} else {
		payload.fields.clone()
	};
	body.insert(
		payload.action.operator().to_string(),
		Value::Object(fields),
	);

	Ok(RequestArgs::post(
		api_endpoint(settings, kind, Some(payload.action)),
		array_of_one(body),
	))
}

fn build_unset(
	settings: &ComponentSettings,
	event: &HostEvent<'_>,
	kind: EventKind,
	payload: &UnsetProfilePayload,
) -> Result<RequestArgs> {
	let mut body = ProfileProperties::collect(settings, event.client, &payload.group).into_map()?;

	let names = payload
		.unset_list
		.as_deref()
		.map(split_comma_list)
		.unwrap_or_default();
	body.insert(
		"$unset".to_string(),
		Value::Array(names.into_iter().map(Value::String).collect()),
	);

	Ok(RequestArgs::post(
		api_endpoint(settings, kind, None),
		array_of_one(body),
	))
}

fn build_delete(
	settings: &ComponentSettings,
	event: &HostEvent<'_>,
	kind: EventKind,
	payload: &DeleteProfilePayload,
) -> Result<RequestArgs> {
	let mut body = ProfileProperties::collect(settings, event.client, &payload.group).into_map()?;

	body.insert("$delete".to_string(), Value::Null);
	if let Some(ignore_alias) = payload.ignore_alias {
		body.insert("$ignore_alias".to_string(), Value::Bool(ignore_alias));
	}

	Ok(RequestArgs::post(
		api_endpoint(settings, kind, None),
		array_of_one(body),
	))
}
