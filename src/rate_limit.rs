//! Per-endpoint rate-limit snapshots parsed from response headers.

// self
use crate::{_prelude::*, http::HttpResponse};

/// Header carrying the window allowance.
pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
/// Header carrying the calls left in the window.
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
/// Header carrying the epoch second the window resets at.
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Most recently observed quota state for one endpoint path.
///
/// Snapshots are overwritten per path on each successful call that carries the headers
/// and persist until overwritten; they never expire on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
	/// Total calls allowed in the current window.
	pub limit: u32,
	/// Calls left in the current window.
	pub remaining: u32,
	/// Unix epoch second at which the window resets.
	pub reset: i64,
}
impl RateLimitSnapshot {
	/// Extracts a snapshot when the response carries a numeric allowance header.
	///
	/// The remaining/reset headers default to zero when absent or malformed, matching the
	/// provider's occasional habit of omitting them on error responses.
	pub fn from_response(response: &HttpResponse) -> Option<Self> {
		let limit = response.header(LIMIT_HEADER)?.trim().parse().ok()?;
		let remaining =
			response.header(REMAINING_HEADER).and_then(|raw| raw.trim().parse().ok()).unwrap_or(0);
		let reset =
			response.header(RESET_HEADER).and_then(|raw| raw.trim().parse().ok()).unwrap_or(0);

		Some(Self { limit, remaining, reset })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response_with(headers: &[(&str, &str)]) -> HttpResponse {
		HttpResponse {
			status: 200,
			headers: headers
				.iter()
				.map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
				.collect(),
			body: String::new(),
		}
	}

	#[test]
	fn full_header_trio_parses() {
		let response = response_with(&[
			(LIMIT_HEADER, "15"),
			(REMAINING_HEADER, "14"),
			(RESET_HEADER, "1700000000"),
		]);
		let snapshot = RateLimitSnapshot::from_response(&response)
			.expect("Snapshot should parse from the full header trio.");

		assert_eq!(snapshot, RateLimitSnapshot { limit: 15, remaining: 14, reset: 1_700_000_000 });
	}

	#[test]
	fn absent_allowance_header_yields_no_snapshot() {
		let response = response_with(&[(REMAINING_HEADER, "14")]);

		assert_eq!(RateLimitSnapshot::from_response(&response), None);
	}

	#[test]
	fn missing_companions_default_to_zero() {
		let response = response_with(&[(LIMIT_HEADER, "180")]);
		let snapshot = RateLimitSnapshot::from_response(&response)
			.expect("Snapshot should parse from the allowance header alone.");

		assert_eq!(snapshot, RateLimitSnapshot { limit: 180, remaining: 0, reset: 0 });
	}

	#[test]
	fn snapshot_serializes_for_diagnostics() {
		let snapshot = RateLimitSnapshot { limit: 15, remaining: 14, reset: 1_700_000_000 };
		let payload =
			serde_json::to_string(&snapshot).expect("Snapshot should serialize to JSON.");

		assert_eq!(payload, "{\"limit\":15,\"remaining\":14,\"reset\":1700000000}");
	}
}
