//! Client-wide error taxonomy and the pure provider-error classifier.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// The first three variants are raised before any network attempt; the rest are raised
/// after an attempt and are never retried internally, backoff is the caller's decision.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Invalid input rejected before any I/O.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Client holds no usable access credentials; no network attempt was made.
	#[error("Twitter client not authenticated.")]
	Authentication,
	/// HTTP verb outside the supported GET/POST pair, rejected before dispatch.
	#[error("Unsupported HTTP method `{method}`.")]
	UnsupportedMethod {
		/// Verb supplied by the caller.
		method: String,
	},
	/// Network-level failure (connect, timeout, no response).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response arrived but its body was not structurally parseable.
	#[error("{message}")]
	Protocol {
		/// HTTP status observed on the malformed response.
		status: u16,
		/// Raw error text, or the default status phrase when none was available.
		message: String,
	},
	/// Provider-reported failure classified from the response payload.
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Input validation failures raised before any I/O.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// OAuth token construction was attempted with an empty key.
	#[error("OAuth token requires a key even when the secret is empty.")]
	EmptyTokenKey,
	/// Request argument could not be rendered as a string.
	#[error("Invalid Twitter parameter ({kind}) `{name}`.")]
	NonScalarArgument {
		/// Name of the offending argument.
		name: String,
		/// JSON kind of the rejected value.
		kind: &'static str,
	},
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure; the source carries the diagnostic.
	#[error("No response from Twitter.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling Twitter.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Provider-reported failure taxonomy keyed by HTTP status.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ApiError {
	/// Status 404; the requested resource does not exist.
	#[error("{message}")]
	NotFound {
		/// Provider error code, `-1` when the provider supplied none.
		code: i64,
		/// Provider error text or the default 404 phrase.
		message: String,
	},
	/// Status 429; the endpoint's rate-limit window is exhausted.
	#[error("{message}")]
	RateLimit {
		/// Provider error code, `-1` when the provider supplied none.
		code: i64,
		/// Provider error text or the default 429 phrase.
		message: String,
	},
	/// Any other provider-reported failure.
	#[error("{message}")]
	Response {
		/// HTTP status the failure arrived with.
		status: u16,
		/// Provider error code, `-1` when the provider supplied none.
		code: i64,
		/// Provider error text or the default phrase for the status.
		message: String,
	},
}
impl ApiError {
	/// HTTP status associated with this failure.
	pub fn status(&self) -> u16 {
		match self {
			Self::NotFound { .. } => 404,
			Self::RateLimit { .. } => 429,
			Self::Response { status, .. } => *status,
		}
	}

	/// Provider error code, `-1` when unknown.
	pub fn code(&self) -> i64 {
		match self {
			Self::NotFound { code, .. } | Self::RateLimit { code, .. } | Self::Response { code, .. } =>
				*code,
		}
	}

	/// Message carried by the failure.
	pub fn message(&self) -> &str {
		match self {
			Self::NotFound { message, .. }
			| Self::RateLimit { message, .. }
			| Self::Response { message, .. } => message,
		}
	}
}

/// Pure mapping from `(status, provider code, provider message)` to a typed [`ApiError`].
///
/// An empty or whitespace-only message is replaced by the default phrase from
/// [`http_status_text`].
pub fn classify(status: u16, code: i64, message: &str) -> ApiError {
	let message = {
		let trimmed = message.trim();

		if trimmed.is_empty() { http_status_text(status) } else { trimmed.to_owned() }
	};

	match status {
		404 => ApiError::NotFound { code, message },
		429 => ApiError::RateLimit { code, message },
		_ => ApiError::Response { status, code, message },
	}
}

/// HTTP status phrases, with the 429/5xx wording overridden for this service.
///
/// These never replace error text supplied by the provider; they cover complete API
/// failures where no message arrived at all.
pub fn http_status_text(status: u16) -> String {
	let text = match status {
		100 => "Continue",
		101 => "Switching Protocols",
		200 => "OK",
		201 => "Created",
		202 => "Accepted",
		203 => "Non-Authoritative Information",
		204 => "No Content",
		205 => "Reset Content",
		206 => "Partial Content",
		300 => "Multiple Choices",
		301 => "Moved Permanently",
		302 => "Found",
		303 => "See Other",
		304 => "Not Modified",
		305 => "Use Proxy",
		307 => "Temporary Redirect",
		400 => "Bad Request",
		401 => "Authorization Required",
		402 => "Payment Required",
		403 => "Forbidden",
		404 => "Not Found",
		405 => "Method Not Allowed",
		406 => "Not Acceptable",
		407 => "Proxy Authentication Required",
		408 => "Request Time-out",
		409 => "Conflict",
		410 => "Gone",
		411 => "Length Required",
		412 => "Precondition Failed",
		413 => "Request Entity Too Large",
		414 => "Request-URI Too Large",
		415 => "Unsupported Media Type",
		416 => "Requested range not satisfiable",
		417 => "Expectation Failed",
		429 => "Twitter API rate limit exceeded",
		500 => "Twitter server error",
		501 => "Not Implemented",
		502 => "Twitter is not responding",
		503 => "Twitter is too busy to respond",
		504 => "Gateway Time-out",
		505 => "HTTP Version not supported",
		other => return format!("Status {other} from Twitter"),
	};

	text.to_owned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn classify_maps_known_statuses_to_variants() {
		assert!(matches!(classify(404, 34, "Sorry, that page does not exist"), ApiError::NotFound {
			code: 34,
			..
		}));
		assert!(matches!(classify(429, 88, "Rate limit exceeded"), ApiError::RateLimit {
			code: 88,
			..
		}));
		assert!(matches!(classify(403, 64, "Suspended"), ApiError::Response {
			status: 403,
			code: 64,
			..
		}));
	}

	#[test]
	fn classify_substitutes_default_phrases_for_empty_messages() {
		let err = classify(500, -1, "");

		assert_eq!(err.message(), "Twitter server error");
		assert_eq!(err.status(), 500);
		assert_eq!(err.code(), -1);

		let err = classify(429, -1, "   ");

		assert_eq!(err.message(), "Twitter API rate limit exceeded");
		assert_eq!(classify(503, -1, "").message(), "Twitter is too busy to respond");
		assert_eq!(classify(418, -1, "").message(), "Status 418 from Twitter");
	}

	#[test]
	fn api_error_converts_into_client_error() {
		let err: Error = classify(404, -1, "").into();

		assert!(matches!(err, Error::Api(ApiError::NotFound { .. })));
		assert_eq!(err.to_string(), "Not Found");
	}
}
