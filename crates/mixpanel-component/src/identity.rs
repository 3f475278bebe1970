// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The storage side of identity resolution.
//!
//! [`resolve_visitor`] is the only place the per-visitor opaque value is
//! read or written. The resolution rules themselves live in the core crate;
//! this adapter wires them to the host's get/set and applies the pending
//! write when resolution produced one.

use tracing::{debug, warn};

use mixpanel_component_core::{IdentityRecord, Resolution, ResolutionOutcome};

use crate::client::HostClient;

/// Resolves the visitor's identity record, persisting on create or upgrade.
///
/// Never fails: an undecodable stored value is replaced with a fresh record,
/// which silently orphans prior identity continuity but keeps the visitor
/// functional.
pub fn resolve_visitor(
	client: &dyn HostClient,
	token: &str,
	identified_id: Option<&str>,
) -> IdentityRecord {
	let stored = client.get(token);
	let Resolution {
		record,
		pending_write,
		outcome,
	} = IdentityRecord::resolve(stored.as_deref(), client.referer().as_deref(), identified_id);

	match outcome {
		ResolutionOutcome::Existing => {}
		ResolutionOutcome::Created => {
			debug!(distinct_id = %record.distinct_id, "created fresh visitor identity");
		}
		ResolutionOutcome::Recreated => {
			warn!(distinct_id = %record.distinct_id, "stored visitor identity was undecodable, recreated");
		}
		ResolutionOutcome::Upgraded => {
			debug!(distinct_id = %record.distinct_id, "linked identified user to visitor");
		}
	}

	if let Some(encoded) = pending_write {
		client.set(token, &encoded);
	}

	record
}
