// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The host-provided capabilities, as traits at the seam.
//!
//! The component never owns a browser context or a cookie jar; the host
//! runtime supplies both. [`HostClient`] is the per-request view of the
//! visitor (request metadata plus get/set of one opaque value), and
//! [`UserAgentParser`] is the host's user-agent string parser. Tests
//! implement both with in-memory fakes.

use url::Url;

/// Per-request context for the visitor the event belongs to.
///
/// `get`/`set` store a single opaque string per visitor under a caller-chosen
/// key; the component keys it by project token. `set` takes `&self` because
/// the host owns the storage and the component only ever borrows the client.
pub trait HostClient {
	/// Event time as unix seconds.
	fn timestamp(&self) -> i64;
	/// Client IP address.
	fn ip(&self) -> String;
	/// The request referrer, when one was sent.
	fn referer(&self) -> Option<String>;
	/// The full page URL.
	fn url(&self) -> Url;
	/// The raw user-agent string.
	fn user_agent(&self) -> String;
	/// The page title.
	fn page_title(&self) -> String;
	fn screen_width(&self) -> u32;
	fn screen_height(&self) -> u32;
	/// Reads the opaque per-visitor value stored under `key`.
	fn get(&self, key: &str) -> Option<String>;
	/// Persists the opaque per-visitor value under `key`.
	fn set(&self, key: &str, value: &str);
}

/// Browser, OS, and device names extracted from a user-agent string.
///
/// Every field is optional; an unrecognized agent yields an empty parse and
/// the enriched property bag serializes the gaps as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUserAgent {
	pub browser_name: Option<String>,
	pub browser_version: Option<String>,
	pub os_name: Option<String>,
	pub device_model: Option<String>,
}

/// Host-provided user-agent parsing.
pub trait UserAgentParser {
	fn parse(&self, user_agent: &str) -> ParsedUserAgent;
}
