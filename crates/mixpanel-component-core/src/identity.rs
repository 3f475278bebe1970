// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The persisted visitor identity record and its resolution rules.
//!
//! The record travels as a single opaque string: JSON with `$`-prefixed wire
//! names, percent-encoded for cookie safety. [`IdentityRecord::resolve`]
//! implements the full lifecycle — validate, create fresh, upgrade with an
//! identified-user id — and reports any mutation as an explicit pending
//! write rather than touching storage itself. Resolution never fails: an
//! undecodable stored value is replaced by a fresh record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::referrer::referrer_or_direct;

/// The visitor identity record persisted as the opaque per-visitor value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
	/// Anonymous browsing entity id. Reported outward unless an identified
	/// user id has been resolved.
	#[serde(default)]
	pub distinct_id: String,
	/// Equal to `distinct_id` at creation and fixed for the record's
	/// lifetime, even after identification.
	#[serde(rename = "$device_id", default)]
	pub device_id: String,
	/// Referrer observed at first creation, or `$direct`.
	#[serde(rename = "$initial_referrer", default)]
	pub initial_referrer: String,
	/// Host of the initial referrer, or `$direct`.
	#[serde(rename = "$initial_referring_domain", default)]
	pub initial_referring_domain: String,
	/// The identified-user id, once known. Set at most once.
	#[serde(rename = "$userId", default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
}

/// Why a resolution produced the record it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
	/// A valid record existed and was returned unchanged.
	Existing,
	/// No stored value existed; a fresh record was created.
	Created,
	/// A stored value existed but failed to decode; a fresh record replaced it.
	Recreated,
	/// A valid record gained its identified-user id.
	Upgraded,
}

/// The result of resolving a visitor's identity.
///
/// `pending_write` carries the encoded value to persist when the resolution
/// created or upgraded the record, and is `None` on the pure-read path, so
/// callers and tests can assert which path ran without counting mock calls.
#[derive(Debug, Clone)]
pub struct Resolution {
	pub record: IdentityRecord,
	pub pending_write: Option<String>,
	pub outcome: ResolutionOutcome,
}

impl IdentityRecord {
	/// Creates a fresh record: one new random id for both `distinct_id` and
	/// `device_id`, referrer provenance captured under the
	/// valid-URL-or-`$direct` rule, and `user_id` taken from `identified_id`
	/// when already known.
	pub fn create(referrer: Option<&str>, identified_id: Option<&str>) -> Self {
		let id = Uuid::new_v4().to_string();
		let (initial_referrer, initial_referring_domain) = referrer_or_direct(referrer);
		Self {
			distinct_id: id.clone(),
			device_id: id,
			initial_referrer,
			initial_referring_domain,
			user_id: identified_id.map(str::to_string),
		}
	}

	/// Decodes a stored value: percent-decode, JSON-parse, and require a
	/// non-empty `distinct_id`.
	pub fn decode(raw: &str) -> Result<Self> {
		let decoded = urlencoding::decode(raw)
			.map_err(|e| CoreError::InvalidIdentityRecord(e.to_string()))?;
		let record: IdentityRecord = serde_json::from_str(&decoded)
			.map_err(|e| CoreError::InvalidIdentityRecord(e.to_string()))?;
		if record.distinct_id.is_empty() {
			return Err(CoreError::MissingDistinctId);
		}
		Ok(record)
	}

	/// Encodes the record for storage (JSON, percent-encoded).
	pub fn encode(&self) -> String {
		let json = serde_json::to_string(self).unwrap_or_default();
		urlencoding::encode(&json).into_owned()
	}

	/// The distinct id reported outward: the identified-user id when
	/// resolved, else the anonymous id.
	pub fn effective_distinct_id(&self) -> &str {
		self.user_id.as_deref().unwrap_or(&self.distinct_id)
	}

	/// Resolves the visitor's identity from the stored value.
	///
	/// - Missing or undecodable stored value: a fresh record, with a write.
	/// - Valid record, no `user_id`, `identified_id` supplied: upgraded,
	///   with a write.
	/// - Otherwise: the record as stored, no write. An already-set `user_id`
	///   is never overwritten, even by a different `identified_id`.
	pub fn resolve(
		stored: Option<&str>,
		referrer: Option<&str>,
		identified_id: Option<&str>,
	) -> Resolution {
		let Some(raw) = stored else {
			let record = IdentityRecord::create(referrer, identified_id);
			return Resolution {
				pending_write: Some(record.encode()),
				record,
				outcome: ResolutionOutcome::Created,
			};
		};

		match IdentityRecord::decode(raw) {
			Ok(mut record) => {
				if let Some(id) = identified_id {
					if record.user_id.is_none() {
						record.user_id = Some(id.to_string());
						return Resolution {
							pending_write: Some(record.encode()),
							record,
							outcome: ResolutionOutcome::Upgraded,
						};
					}
				}
				Resolution {
					record,
					pending_write: None,
					outcome: ResolutionOutcome::Existing,
				}
			}
			Err(_) => {
				let record = IdentityRecord::create(referrer, identified_id);
				Resolution {
					pending_write: Some(record.encode()),
					record,
					outcome: ResolutionOutcome::Recreated,
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn stored_record() -> IdentityRecord {
		IdentityRecord {
			distinct_id: "f477ebf8-0ddc-451f-8091-65effa05ec87".to_string(),
			device_id: "f477ebf8-0ddc-451f-8091-65effa05ec87".to_string(),
			initial_referrer: "$direct".to_string(),
			initial_referring_domain: "$direct".to_string(),
			user_id: None,
		}
	}

	#[test]
	fn encode_decode_round_trip() {
		let record = stored_record();
		let decoded = IdentityRecord::decode(&record.encode()).unwrap();
		assert_eq!(decoded, record);
	}

	#[test]
	fn encoded_form_is_percent_encoded_json() {
		let encoded = stored_record().encode();
		assert!(encoded.starts_with("%7B"));
		assert!(!encoded.contains('{'));
		assert!(!encoded.contains('"'));
	}

	#[test]
	fn absent_user_id_is_not_serialized() {
		let json = serde_json::to_string(&stored_record()).unwrap();
		assert!(!json.contains("$userId"));
	}

	#[test]
	fn decode_rejects_garbage() {
		assert!(matches!(
			IdentityRecord::decode("not%20json"),
			Err(CoreError::InvalidIdentityRecord(_))
		));
	}

	#[test]
	fn decode_rejects_missing_distinct_id() {
		let encoded = urlencoding::encode(r#"{"$device_id":"abc"}"#).into_owned();
		assert!(matches!(
			IdentityRecord::decode(&encoded),
			Err(CoreError::MissingDistinctId)
		));
	}

	#[test]
	fn create_uses_one_id_for_both_fields() {
		let record = IdentityRecord::create(None, None);
		assert_eq!(record.distinct_id, record.device_id);
		assert!(Uuid::parse_str(&record.distinct_id).is_ok());
	}

	#[test]
	fn create_captures_valid_referrer() {
		let record = IdentityRecord::create(Some("http://127.0.0.1:1337/welcome"), None);
		assert_eq!(record.initial_referrer, "http://127.0.0.1:1337/welcome");
		assert_eq!(record.initial_referring_domain, "127.0.0.1:1337");
	}

	#[test]
	fn create_falls_back_to_direct() {
		let record = IdentityRecord::create(Some("not a url"), None);
		assert_eq!(record.initial_referrer, "$direct");
		assert_eq!(record.initial_referring_domain, "$direct");
	}

	#[test]
	fn resolve_missing_value_creates_and_writes() {
		let resolution = IdentityRecord::resolve(None, None, None);
		assert_eq!(resolution.outcome, ResolutionOutcome::Created);
		let written = IdentityRecord::decode(resolution.pending_write.as_deref().unwrap()).unwrap();
		assert_eq!(written, resolution.record);
	}

	#[test]
	fn resolve_corrupt_value_recreates() {
		let resolution = IdentityRecord::resolve(Some("%%%garbage"), None, None);
		assert_eq!(resolution.outcome, ResolutionOutcome::Recreated);
		assert!(resolution.pending_write.is_some());
		assert!(Uuid::parse_str(&resolution.record.distinct_id).is_ok());
	}

	#[test]
	fn resolve_valid_value_is_a_pure_read() {
		let stored = stored_record().encode();
		let resolution = IdentityRecord::resolve(Some(&stored), Some("http://x.example/"), None);
		assert_eq!(resolution.outcome, ResolutionOutcome::Existing);
		assert!(resolution.pending_write.is_none());
		assert_eq!(resolution.record, stored_record());
	}

	#[test]
	fn resolve_upgrades_once() {
		let stored = stored_record().encode();
		let resolution = IdentityRecord::resolve(Some(&stored), None, Some("user_12345"));
		assert_eq!(resolution.outcome, ResolutionOutcome::Upgraded);
		assert_eq!(resolution.record.user_id.as_deref(), Some("user_12345"));
		assert_eq!(
			resolution.record.device_id,
			stored_record().device_id,
			"device id survives identification"
		);

		// A later, different identified id never wins.
		let upgraded = resolution.pending_write.unwrap();
		let second = IdentityRecord::resolve(Some(&upgraded), None, Some("someone_else"));
		assert_eq!(second.outcome, ResolutionOutcome::Existing);
		assert!(second.pending_write.is_none());
		assert_eq!(second.record.user_id.as_deref(), Some("user_12345"));
	}

	#[test]
	fn resolve_creation_records_identified_id() {
		let resolution = IdentityRecord::resolve(None, None, Some("u1"));
		assert_eq!(resolution.record.user_id.as_deref(), Some("u1"));
		assert_ne!(resolution.record.distinct_id, "u1");
		assert_eq!(resolution.record.effective_distinct_id(), "u1");
	}

	#[test]
	fn effective_distinct_id_prefers_user_id() {
		let mut record = stored_record();
		assert_eq!(record.effective_distinct_id(), record.distinct_id);
		record.user_id = Some("u1".to_string());
		assert_eq!(record.effective_distinct_id(), "u1");
	}

	proptest! {
		#[test]
		fn round_trip_preserves_any_record(
			distinct_id in "[ -~]{1,40}",
			referrer in "[ -~]{0,40}",
			user_id in proptest::option::of("[ -~]{1,40}"),
		) {
			let record = IdentityRecord {
				distinct_id: distinct_id.clone(),
				device_id: distinct_id,
				initial_referrer: referrer.clone(),
				initial_referring_domain: referrer,
				user_id,
			};
			let decoded = IdentityRecord::decode(&record.encode()).unwrap();
			prop_assert_eq!(decoded, record);
		}

		#[test]
		fn device_id_is_stable_across_any_call_sequence(
			ids in proptest::collection::vec(proptest::option::of("[a-z0-9_]{1,20}"), 1..8),
		) {
			let mut stored = None;
			let mut device_id: Option<String> = None;
			for identified in ids {
				let resolution =
					IdentityRecord::resolve(stored.as_deref(), None, identified.as_deref());
				if let Some(expected) = &device_id {
					prop_assert_eq!(expected, &resolution.record.device_id);
				}
				device_id = Some(resolution.record.device_id.clone());
				if let Some(write) = resolution.pending_write {
					stored = Some(write);
				}
			}
		}

		#[test]
		fn user_id_is_monotonic(
			first in "[a-z0-9]{1,20}",
			second in "[a-z0-9]{1,20}",
		) {
			let created = IdentityRecord::resolve(None, None, Some(&first));
			let stored = created.pending_write.unwrap();
			let later = IdentityRecord::resolve(Some(&stored), None, Some(&second));
			prop_assert_eq!(later.record.user_id.as_deref(), Some(first.as_str()));
		}
	}
}
