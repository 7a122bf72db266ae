//! Blocking Twitter REST 1.1 client built around an OAuth 1.0a signing core: canonical
//! parameter normalization, HMAC-SHA1 signatures, typed error classification, and
//! per-endpoint rate-limit tracking.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod analysis;
pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod sentiment;
pub mod sign;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use parking_lot::Mutex;
	// self
	use crate::{
		auth::OAuthToken,
		client::ApiClient,
		error::TransportError,
		http::{HttpRequest, HttpResponse, HttpTransport},
	};

	/// Scripted transport that records every request and replays queued responses.
	#[derive(Debug, Default)]
	pub struct StubTransport {
		requests: Mutex<Vec<HttpRequest>>,
		responses: Mutex<VecDeque<HttpResponse>>,
	}
	impl StubTransport {
		/// Builds a stub holding a single plain response with the provided status and body.
		pub fn respond(status: u16, body: &str) -> Arc<Self> {
			Self::respond_with_headers(status, body, &[])
		}

		/// Builds a stub holding a single response that also carries extra headers.
		pub fn respond_with_headers(status: u16, body: &str, headers: &[(&str, &str)]) -> Arc<Self> {
			let stub = Arc::new(Self::default());

			stub.push(status, body, headers);

			stub
		}

		/// Appends another scripted response to the replay queue.
		pub fn push(&self, status: u16, body: &str, headers: &[(&str, &str)]) {
			self.responses.lock().push_back(HttpResponse {
				status,
				headers: headers
					.iter()
					.map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
					.collect(),
				body: body.to_owned(),
			});
		}

		/// Number of requests the stub has received so far.
		pub fn calls(&self) -> usize {
			self.requests.lock().len()
		}

		/// The most recent request handed to the stub, if any.
		pub fn last_request(&self) -> Option<HttpRequest> {
			self.requests.lock().last().cloned()
		}
	}
	impl HttpTransport for StubTransport {
		fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
			self.requests.lock().push(request.clone());

			self.responses.lock().pop_front().ok_or_else(|| {
				TransportError::Io(std::io::Error::other("Stub transport has no scripted response."))
			})
		}
	}

	/// Builds a client with fixture credentials around the provided transport.
	pub fn authed_client(transport: Arc<StubTransport>) -> ApiClient {
		let consumer =
			OAuthToken::new("app-key", "app-secret").expect("Consumer fixture should be valid.");
		let access = OAuthToken::new("1234-accesskey", "access-secret")
			.expect("Access token fixture should be valid.");
		let mut client = ApiClient::with_transport(consumer, transport);

		client.set_oauth_access(access);

		client
	}
}

mod _prelude {
	// std
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};
	// crates.io
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Error as ReqwestError, blocking::Client as ReqwestClient};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	// self
	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
