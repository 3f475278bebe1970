// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the component.

use thiserror::Error;

use mixpanel_component_core::CoreError;

/// Errors raised while building or dispatching a request.
///
/// Nothing here propagates to the host: the component boundary absorbs every
/// case as a warn + dropped event.
#[derive(Debug, Error)]
pub enum ComponentError {
	/// Payload extraction or identity decoding failed.
	#[error(transparent)]
	Core(#[from] CoreError),

	/// A request body failed to serialize.
	#[error("serialization failed: {0}")]
	Serialization(#[from] serde_json::Error),

	/// The outbound HTTP request failed at the transport level.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// The ingestion API answered with a non-success status.
	#[error("server error ({status})")]
	ServerError { status: u16 },
}

/// Result type alias for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;
