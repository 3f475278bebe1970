// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Referrer provenance handling.
//!
//! Both identity creation and per-request enrichment apply the same rule:
//! a referrer counts only when it parses as an absolute http(s) URL, and
//! anything else collapses to the `$direct` sentinel.

use url::Url;

/// Sentinel reported when no usable referrer is present.
pub const DIRECT: &str = "$direct";

/// Parses a string as an absolute http(s) URL.
pub fn parse_http_url(s: &str) -> Option<Url> {
	let url = Url::parse(s).ok()?;
	match url.scheme() {
		"http" | "https" => Some(url),
		_ => None,
	}
}

/// Returns the `(referrer, referring_domain)` pair for a raw referrer value.
///
/// A valid absolute http(s) referrer is passed through as given, paired with
/// its host (port included when present). Absent, empty, or unparseable
/// referrers yield the [`DIRECT`] sentinel for both.
pub fn referrer_or_direct(referrer: Option<&str>) -> (String, String) {
	let Some(raw) = referrer.filter(|r| !r.is_empty()) else {
		return (DIRECT.to_string(), DIRECT.to_string());
	};
	match parse_http_url(raw) {
		Some(url) => {
			let host = match url.port() {
				Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
				None => url.host_str().unwrap_or_default().to_string(),
			};
			(raw.to_string(), host)
		}
		None => (DIRECT.to_string(), DIRECT.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn valid_referrer_passes_through_with_host() {
		let (referrer, domain) = referrer_or_direct(Some("https://news.example.com/a?b=c"));
		assert_eq!(referrer, "https://news.example.com/a?b=c");
		assert_eq!(domain, "news.example.com");
	}

	#[test]
	fn host_keeps_explicit_port() {
		let (_, domain) = referrer_or_direct(Some("http://127.0.0.1:1337/page"));
		assert_eq!(domain, "127.0.0.1:1337");
	}

	#[test]
	fn default_port_is_not_reported() {
		let (_, domain) = referrer_or_direct(Some("https://example.com:443/"));
		assert_eq!(domain, "example.com");
	}

	#[test]
	fn absent_referrer_is_direct() {
		assert_eq!(
			referrer_or_direct(None),
			(DIRECT.to_string(), DIRECT.to_string())
		);
	}

	#[test]
	fn empty_referrer_is_direct() {
		assert_eq!(
			referrer_or_direct(Some("")),
			(DIRECT.to_string(), DIRECT.to_string())
		);
	}

	#[test]
	fn relative_or_garbage_referrer_is_direct() {
		assert_eq!(referrer_or_direct(Some("/internal/path")).0, DIRECT);
		assert_eq!(referrer_or_direct(Some("not a url")).0, DIRECT);
	}

	#[test]
	fn non_http_scheme_is_direct() {
		assert_eq!(referrer_or_direct(Some("ftp://example.com/file")).0, DIRECT);
		assert_eq!(referrer_or_direct(Some("android-app://com.app")).0, DIRECT);
	}
}
