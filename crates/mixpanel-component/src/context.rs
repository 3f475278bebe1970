// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context enrichment: the property bags shared by every outbound request.
//!
//! [`EventProperties`] is the full bag attached to track/alias/identify
//! requests. Every field serializes on every request — absent signals become
//! `null`, never a missing key — so the produced JSON is schema-stable.
//! [`ProfileProperties`] is the smaller identity bag the `engage` endpoints
//! take; there the group fields appear only when the payload supplied them.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use mixpanel_component_core::{referrer_or_direct, ComponentSettings, GroupRef};

use crate::client::{HostClient, UserAgentParser};
use crate::error::Result;
use crate::identity::resolve_visitor;

/// The common property set for ingestion (`track`-path) requests.
#[derive(Debug, Clone, Serialize)]
pub struct EventProperties {
	pub token: String,
	#[serde(rename = "$device_id")]
	pub device_id: String,
	/// The effective distinct id: the resolved user id when known, else the
	/// anonymous id.
	pub distinct_id: String,
	pub time: i64,
	/// Fresh random id per request, for server-side deduplication.
	#[serde(rename = "$insert_id")]
	pub insert_id: String,
	pub ip: String,
	#[serde(rename = "$referrer")]
	pub referrer: String,
	#[serde(rename = "$referring_domain")]
	pub referring_domain: String,
	#[serde(rename = "$current_url")]
	pub current_url: String,
	#[serde(rename = "$current_domain")]
	pub current_domain: String,
	#[serde(rename = "$current_page_title")]
	pub current_page_title: String,
	#[serde(rename = "$current_url_path")]
	pub current_url_path: String,
	/// Query string with its leading `?`, or empty.
	#[serde(rename = "$current_url_search")]
	pub current_url_search: String,
	/// Scheme with its trailing `:`.
	#[serde(rename = "$current_url_protocol")]
	pub current_url_protocol: String,
	#[serde(rename = "$screen_height")]
	pub screen_height: u32,
	#[serde(rename = "$screen_width")]
	pub screen_width: u32,
	#[serde(rename = "$browser")]
	pub browser: Option<String>,
	#[serde(rename = "$browser_version")]
	pub browser_version: Option<String>,
	#[serde(rename = "$os")]
	pub os: Option<String>,
	#[serde(rename = "$device")]
	pub device: Option<String>,
	#[serde(rename = "$gclid")]
	pub gclid: Option<String>,
	#[serde(rename = "$fbclid")]
	pub fbclid: Option<String>,
}

fn query_param(url: &url::Url, name: &str) -> Option<String> {
	url.query_pairs()
		.find(|(key, _)| key == name)
		.map(|(_, value)| value.into_owned())
}

impl EventProperties {
	/// Assembles the bag for the current request.
	///
	/// Resolves the visitor identity (persisting on create/upgrade), stamps
	/// request metadata, decomposes the page URL, and folds in the parsed
	/// user agent. The referrer is re-evaluated per request under the
	/// valid-URL-or-`$direct` rule; it is not the stored initial referrer.
	pub fn collect(
		settings: &ComponentSettings,
		client: &dyn HostClient,
		ua_parser: &dyn UserAgentParser,
		identified_id: Option<&str>,
	) -> Self {
		let record = resolve_visitor(client, &settings.token, identified_id);
		let parsed = ua_parser.parse(&client.user_agent());
		let url = client.url();
		let (referrer, referring_domain) = referrer_or_direct(client.referer().as_deref());

		Self {
			token: settings.token.clone(),
			device_id: record.device_id.clone(),
			distinct_id: record.effective_distinct_id().to_string(),
			time: client.timestamp(),
			insert_id: Uuid::new_v4().to_string(),
			ip: client.ip(),
			referrer,
			referring_domain,
			current_url: url.as_str().to_string(),
			current_domain: url.host_str().unwrap_or_default().to_string(),
			current_page_title: client.page_title(),
			current_url_path: url.path().to_string(),
			current_url_search: url
				.query()
				.filter(|q| !q.is_empty())
				.map(|q| format!("?{q}"))
				.unwrap_or_default(),
			current_url_protocol: format!("{}:", url.scheme()),
			screen_height: client.screen_height(),
			screen_width: client.screen_width(),
			browser: parsed.browser_name,
			browser_version: parsed.browser_version,
			os: parsed.os_name,
			device: parsed.device_model,
			gclid: query_param(&url, "gclid"),
			fbclid: query_param(&url, "fbclid"),
		}
	}

	/// The bag as a JSON object map, for merging into request bodies.
	pub fn into_map(self) -> Result<Map<String, Value>> {
		match serde_json::to_value(self)? {
			Value::Object(map) => Ok(map),
			_ => Ok(Map::new()),
		}
	}
}

/// The profile identity set for `engage`-path requests.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileProperties {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$group_key", skip_serializing_if = "Option::is_none")]
	pub group_key: Option<Value>,
	#[serde(rename = "$group_id", skip_serializing_if = "Option::is_none")]
	pub group_id: Option<Value>,
}

impl ProfileProperties {
	/// Assembles the profile bag. Resolution here never carries an
	/// identified id; it is a pure read apart from first creation.
	pub fn collect(
		settings: &ComponentSettings,
		client: &dyn HostClient,
		group: &GroupRef,
	) -> Self {
		let record = resolve_visitor(client, &settings.token, None);
		Self {
			token: settings.token.clone(),
			distinct_id: record.effective_distinct_id().to_string(),
			group_key: group.key.clone(),
			group_id: group.id.clone(),
		}
	}

	/// The bag as a JSON object map, for merging into request bodies.
	pub fn into_map(self) -> Result<Map<String, Value>> {
		match serde_json::to_value(self)? {
			Value::Object(map) => Ok(map),
			_ => Ok(Map::new()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client::ParsedUserAgent;
	use std::cell::RefCell;
	use url::Url;

	struct FakeClient {
		url: Url,
		referer: Option<String>,
		stored: RefCell<Option<String>>,
	}

	impl FakeClient {
		fn new(url: &str) -> Self {
			Self {
				url: Url::parse(url).unwrap(),
				referer: None,
				stored: RefCell::new(None),
			}
		}
	}

	impl HostClient for FakeClient {
		fn timestamp(&self) -> i64 {
			1670502437
		}
		fn ip(&self) -> String {
			"127.0.0.1".to_string()
		}
		fn referer(&self) -> Option<String> {
			self.referer.clone()
		}
		fn url(&self) -> Url {
			self.url.clone()
		}
		fn user_agent(&self) -> String {
			"Mozilla/5.0".to_string()
		}
		fn page_title(&self) -> String {
			"Test Page".to_string()
		}
		fn screen_width(&self) -> u32 {
			2560
		}
		fn screen_height(&self) -> u32 {
			1080
		}
		fn get(&self, _key: &str) -> Option<String> {
			self.stored.borrow().clone()
		}
		fn set(&self, _key: &str, value: &str) {
			*self.stored.borrow_mut() = Some(value.to_string());
		}
	}

	struct EmptyParser;

	impl UserAgentParser for EmptyParser {
		fn parse(&self, _user_agent: &str) -> ParsedUserAgent {
			ParsedUserAgent::default()
		}
	}

	fn settings() -> ComponentSettings {
		ComponentSettings::new("12345", true)
	}

	#[test]
	fn absent_signals_serialize_as_null_keys() {
		let client = FakeClient::new("http://127.0.0.1:1337");
		let bag = EventProperties::collect(&settings(), &client, &EmptyParser, None);
		let value = serde_json::to_value(bag).unwrap();
		let object = value.as_object().unwrap();

		for key in ["$browser", "$browser_version", "$os", "$device", "$gclid", "$fbclid"] {
			assert!(object.contains_key(key), "missing {key}");
			assert!(object[key].is_null(), "{key} should be null");
		}
		assert_eq!(object["$referrer"], "$direct");
		assert_eq!(object["$referring_domain"], "$direct");
	}

	#[test]
	fn url_decomposition_matches_wire_format() {
		let client = FakeClient::new("https://shop.example.com/cart/items?gclid=g123&fbclid=f456");
		let bag = EventProperties::collect(&settings(), &client, &EmptyParser, None);

		assert_eq!(
			bag.current_url,
			"https://shop.example.com/cart/items?gclid=g123&fbclid=f456"
		);
		assert_eq!(bag.current_domain, "shop.example.com");
		assert_eq!(bag.current_url_path, "/cart/items");
		assert_eq!(bag.current_url_search, "?gclid=g123&fbclid=f456");
		assert_eq!(bag.current_url_protocol, "https:");
		assert_eq!(bag.gclid.as_deref(), Some("g123"));
		assert_eq!(bag.fbclid.as_deref(), Some("f456"));
	}

	#[test]
	fn bare_origin_has_empty_search() {
		let client = FakeClient::new("http://127.0.0.1:1337");
		let bag = EventProperties::collect(&settings(), &client, &EmptyParser, None);
		assert_eq!(bag.current_url, "http://127.0.0.1:1337/");
		assert_eq!(bag.current_url_search, "");
		assert_eq!(bag.current_url_path, "/");
	}

	#[test]
	fn identified_id_switches_effective_distinct_id() {
		let client = FakeClient::new("http://127.0.0.1:1337");
		let bag = EventProperties::collect(&settings(), &client, &EmptyParser, Some("u1"));
		assert_eq!(bag.distinct_id, "u1");
		assert_ne!(bag.device_id, "u1");
	}

	#[test]
	fn insert_id_is_fresh_per_request() {
		let client = FakeClient::new("http://127.0.0.1:1337");
		let first = EventProperties::collect(&settings(), &client, &EmptyParser, None);
		let second = EventProperties::collect(&settings(), &client, &EmptyParser, None);
		assert_ne!(first.insert_id, second.insert_id);
		assert_eq!(first.distinct_id, second.distinct_id);
	}

	#[test]
	fn profile_bag_omits_absent_group_fields() {
		let client = FakeClient::new("http://127.0.0.1:1337");
		let bag = ProfileProperties::collect(&settings(), &client, &GroupRef::default());
		let map = bag.into_map().unwrap();
		assert!(map.contains_key("$token"));
		assert!(map.contains_key("$distinct_id"));
		assert!(!map.contains_key("$group_key"));
		assert!(!map.contains_key("$group_id"));
	}

	#[test]
	fn profile_bag_passes_group_fields_verbatim() {
		let client = FakeClient::new("http://127.0.0.1:1337");
		let group = GroupRef {
			key: Some(serde_json::json!("company")),
			id: Some(serde_json::json!(42)),
		};
		let bag = ProfileProperties::collect(&settings(), &client, &group);
		let map = bag.into_map().unwrap();
		assert_eq!(map["$group_key"], "company");
		assert_eq!(map["$group_id"], 42);
	}
}
