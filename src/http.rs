//! Transport primitives for signed REST calls.
//!
//! The module exposes [`HttpTransport`] so the call pipeline can run against any blocking
//! HTTP stack: the reqwest-backed [`ReqwestTransport`] in production, scripted stubs in
//! tests. Transports return the raw `{status, headers, body}` triple; interpretation is
//! entirely the caller's concern.

// self
use crate::{_prelude::*, error::TransportError};

#[cfg(feature = "reqwest")] const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
#[cfg(feature = "reqwest")]
const USER_AGENT: &str = concat!("twitter-client/", env!("CARGO_PKG_VERSION"));

/// HTTP verbs the call pipeline can dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// Signed parameters travel in the query string.
	Get,
	/// Signed parameters travel in the form body with an `Authorization` header.
	Post,
}
impl HttpMethod {
	/// Parses a verb case-insensitively, rejecting anything outside GET/POST before
	/// dispatch.
	pub fn parse(method: &str) -> Result<Self> {
		match method.to_uppercase().as_str() {
			"GET" => Ok(Self::Get),
			"POST" => Ok(Self::Post),
			_ => Err(Error::UnsupportedMethod { method: method.to_owned() }),
		}
	}

	/// Canonical upper-case form of the verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request handed to a [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// Verb to dispatch with.
	pub method: HttpMethod,
	/// Absolute URL, query string included for GET calls.
	pub url: String,
	/// Header name/value pairs.
	pub headers: Vec<(String, String)>,
	/// Form-encoded body, for POST calls that carry one.
	pub body: Option<String>,
}

/// Raw response triple returned by a transport.
///
/// Header names are lower-cased; only `content-*` and `x-rate-limit-*` headers are
/// retained, the rest are ignored.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retained header name/value pairs.
	pub headers: Vec<(String, String)>,
	/// Response body text.
	pub body: String,
}
impl HttpResponse {
	/// Case-insensitive header lookup.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Blocking transport abstraction; one call occupies the thread for the full round trip.
///
/// Implementations surface connect failures, timeouts, and absent responses as
/// [`TransportError`] and never retry on their own.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Executes one request, returning the raw response or a transport failure.
	fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Whether a response header is worth keeping for the call pipeline.
pub(crate) fn retains_header(name: &str) -> bool {
	let name = name.to_ascii_lowercase();

	name.starts_with("content") || name.starts_with("x-rate")
}

/// Thin wrapper around a blocking [`ReqwestClient`] with the fixed connect/total timeout
/// ceiling and a descriptive user agent.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds the default transport.
	pub fn new() -> Result<Self, TransportError> {
		let client = ReqwestClient::builder()
			.connect_timeout(TIMEOUT)
			.timeout(TIMEOUT)
			.user_agent(USER_AGENT)
			.build()
			.map_err(TransportError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing blocking [`ReqwestClient`]; the caller owns its timeout policy.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
		let mut builder = match request.method {
			HttpMethod::Get => self.0.get(&request.url),
			HttpMethod::Post => self.0.post(&request.url),
		};

		for (name, value) in &request.headers {
			builder = builder.header(name, value);
		}
		if let Some(body) = &request.body {
			builder = builder
				.header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
				.body(body.clone());
		}

		let response = builder.send().map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter(|(name, _)| retains_header(name.as_str()))
			.map(|(name, value)| {
				(name.as_str().to_ascii_lowercase(), String::from_utf8_lossy(value.as_bytes()).into_owned())
			})
			.collect();
		let body = response.text().map_err(TransportError::from)?;

		Ok(HttpResponse { status, headers, body })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn method_parsing_is_case_insensitive_and_closed() {
		assert_eq!(HttpMethod::parse("get").expect("GET should parse."), HttpMethod::Get);
		assert_eq!(HttpMethod::parse("Post").expect("POST should parse."), HttpMethod::Post);

		let err = HttpMethod::parse("DELETE").expect_err("DELETE should be rejected.");

		assert!(matches!(err, Error::UnsupportedMethod { method } if method == "DELETE"));
	}

	#[test]
	fn header_lookup_ignores_case() {
		let response = HttpResponse {
			status: 200,
			headers: vec![("content-type".to_owned(), "application/json".to_owned())],
			body: String::new(),
		};

		assert_eq!(response.header("Content-Type"), Some("application/json"));
		assert_eq!(response.header("x-rate-limit-limit"), None);
	}

	#[test]
	fn only_content_and_rate_limit_headers_are_retained() {
		assert!(retains_header("Content-Type"));
		assert!(retains_header("content-length"));
		assert!(retains_header("X-Rate-Limit-Reset"));
		assert!(!retains_header("set-cookie"));
		assert!(!retains_header("server"));
	}
}
