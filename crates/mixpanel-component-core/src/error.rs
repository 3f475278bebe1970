// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core crate.

use thiserror::Error;

/// Errors raised by the core event model and identity codec.
///
/// None of these reach the host: identity decode failures are absorbed into
/// record re-creation, and payload errors are absorbed as a warn + no-op at
/// the component boundary.
#[derive(Debug, Error)]
pub enum CoreError {
	/// The stored identity value failed percent-decoding or JSON parsing.
	#[error("identity record failed to decode: {0}")]
	InvalidIdentityRecord(String),

	/// The stored identity value decoded but carries no distinct id.
	#[error("identity record is missing a distinct id")]
	MissingDistinctId,

	/// A profile-mutation payload named an action outside the mapping table.
	#[error("unknown profile action: {0}")]
	UnknownAction(String),

	/// A profile-mutation payload carried no action name at all.
	#[error("profile event carries no action")]
	MissingAction,
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_action_names_the_action() {
		let err = CoreError::UnknownAction("profile-increment".to_string());
		assert_eq!(
			err.to_string(),
			"unknown profile action: profile-increment"
		);
	}

	#[test]
	fn invalid_record_carries_cause() {
		let err = CoreError::InvalidIdentityRecord("expected value at line 1".to_string());
		assert!(err.to_string().contains("expected value"));
	}
}
