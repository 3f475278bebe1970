// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound request dispatch.
//!
//! Fire-and-forget: the response body is always discarded, there is no retry
//! or batching, and callers are expected to log and drop any error. Timeout
//! and transport concerns end here.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ComponentError, Result};
use crate::transform::RequestArgs;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends a built request to the ingestion API.
#[async_trait]
pub trait Dispatch: Send + Sync {
	/// Dispatches one request. Success means the transport accepted it;
	/// nothing of the response survives beyond the status check.
	async fn dispatch(&self, args: &RequestArgs) -> Result<()>;
}

/// [`Dispatch`] over a shared `reqwest` client.
pub struct HttpDispatcher {
	client: reqwest::Client,
}

impl HttpDispatcher {
	/// Creates a dispatcher with the default timeout.
	pub fn new() -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(DEFAULT_TIMEOUT)
			.build()?;
		Ok(Self { client })
	}

	/// Creates a dispatcher over an existing client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Dispatch for HttpDispatcher {
	async fn dispatch(&self, args: &RequestArgs) -> Result<()> {
		let body = args.body.encode()?;

		let mut request = self.client.post(&args.url);
		for (name, value) in args.headers {
			request = request.header(name, value);
		}

		let response = request.body(body).send().await?;
		let status = response.status();
		if !status.is_success() {
			warn!(url = %args.url, status = status.as_u16(), "ingestion API rejected request");
			return Err(ComponentError::ServerError {
				status: status.as_u16(),
			});
		}

		debug!(url = %args.url, "dispatched analytics request");
		Ok(())
	}
}
