// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Mixpanel managed component.
//!
//! This crate provides the pure, I/O-free half of the component: the typed
//! event model, the profile-action table, the visitor identity record and
//! its cookie codec, and ingestion API endpoint construction. The host-facing
//! half (context enrichment, request building, dispatch) lives in
//! `mixpanel-component`.
//!
//! # Overview
//!
//! Inbound events arrive from the host as a kind string plus a JSON payload
//! map. [`EventKind::parse`] and [`EventPayload::from_raw`] turn that pair
//! into a closed tagged variant, so every supported kind has a compile-time
//! body rule and an unknown kind is a no-op rather than an error.
//!
//! The visitor identity record is stored as a single opaque string
//! (percent-encoded JSON). [`IdentityRecord::resolve`] validates, creates,
//! or upgrades it and reports the mutation as an explicit pending write,
//! so callers can distinguish read-only resolution from a persisting one.
//!
//! # Example
//!
//! ```
//! use mixpanel_component_core::{ComponentSettings, EventKind, IdentityRecord};
//!
//! let settings = ComponentSettings::new("proj_token", true);
//! assert!(settings.is_eu);
//!
//! // Unknown kinds never fire a mapping.
//! assert!(EventKind::parse("ecommerce").is_none());
//!
//! // First resolution for a visitor creates a fresh record and a write.
//! let resolution = IdentityRecord::resolve(None, None, None);
//! assert!(resolution.pending_write.is_some());
//! assert_eq!(resolution.record.device_id, resolution.record.distinct_id);
//! ```

pub mod action;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod identity;
pub mod referrer;
pub mod settings;

pub use action::ProfileAction;
pub use endpoint::{api_endpoint, endpoint_path};
pub use error::{CoreError, Result};
pub use event::{
	AliasPayload, DeleteProfilePayload, EventKind, EventPayload, GroupRef, IdentifyPayload,
	SetProfilePayload, TrackPayload, UnsetProfilePayload,
};
pub use identity::{IdentityRecord, Resolution, ResolutionOutcome};
pub use referrer::{referrer_or_direct, DIRECT};
pub use settings::ComponentSettings;
