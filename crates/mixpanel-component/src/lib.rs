// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side Mixpanel managed component.
//!
//! Turns host-delivered analytics events (page views, custom events,
//! identity declarations, profile mutations) into Mixpanel ingestion API
//! requests, and maintains the per-visitor identity record stored as a
//! single opaque value on the host side.
//!
//! # Architecture
//!
//! - `client` - the host-provided capabilities (request context, opaque
//!   value store, user-agent parsing) as traits
//! - `identity` - the storage side of identity resolution
//! - `context` - the enriched property bags shared by outbound requests
//! - `transform` - one endpoint/body rule per event kind
//! - `dispatch` - fire-and-forget HTTP dispatch
//! - `component` - the entry point wiring a raw host event through all of
//!   the above
//!
//! # Example
//!
//! ```ignore
//! use mixpanel_component::{ComponentSettings, HttpDispatcher, MixpanelComponent};
//!
//! let component = MixpanelComponent::new(
//!     ComponentSettings::new("project_token", false),
//!     Box::new(host_ua_parser),
//!     Box::new(HttpDispatcher::new()?),
//! );
//!
//! // For each event the host delivers:
//! component.handle_event("track", payload, &client).await;
//! ```

pub mod client;
pub mod component;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod transform;

pub use client::{HostClient, ParsedUserAgent, UserAgentParser};
pub use component::MixpanelComponent;
pub use context::{EventProperties, ProfileProperties};
pub use dispatch::{Dispatch, HttpDispatcher};
pub use error::{ComponentError, Result};
pub use identity::resolve_visitor;
pub use transform::{transform, HostEvent, RequestArgs, RequestBody};

// Re-export core types for convenience
pub use mixpanel_component_core::*;
