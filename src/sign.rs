//! OAuth 1.0a parameter canonicalization and HMAC-SHA1 request signing.
//!
//! A [`OAuthParams`] instance is created per call, seeded with the request arguments,
//! attached to the consumer and access tokens, signed once, and then serialized into
//! either a query string, a form body, or an `Authorization: OAuth` header. It is never
//! reused across calls, so no signing state can leak between requests.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
// self
use crate::{_prelude::*, auth::OAuthToken};

/// RFC 3986: everything outside the unreserved set (`A-Z a-z 0-9 - . _ ~`) is escaped.
/// Space becomes `%20`, never `+`.
const RFC3986_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

type HmacSha1 = Hmac<Sha1>;

/// Percent-encodes `value` with RFC 3986 unreserved-character rules.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, RFC3986_ENCODE_SET).to_string()
}

/// One parameter's value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
	/// Ordinary single-valued parameter.
	Single(String),
	/// Repeated parameter, serialized as one `key=value` pair per entry.
	Many(Vec<String>),
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Single(value)
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Single(value.to_owned())
	}
}

/// Per-call, ordered parameter set that builds, normalizes, serializes, and signs a
/// request's parameters.
///
/// Token secrets are retained only for the signing-key computation and are never
/// serialized.
#[derive(Clone, Debug)]
pub struct OAuthParams {
	args: Vec<(String, ParamValue)>,
	consumer_secret: String,
	token_secret: String,
}
impl OAuthParams {
	/// Seeds a parameter set with the caller's request arguments plus `oauth_version=1.0`.
	pub fn new(args: impl IntoIterator<Item = (String, ParamValue)>) -> Self {
		let mut params = Self {
			args: args.into_iter().collect(),
			consumer_secret: String::new(),
			token_secret: String::new(),
		};

		if params.get("oauth_version").is_none() {
			params.set("oauth_version", "1.0");
		}

		params
	}

	/// Sets `oauth_consumer_key` from the consumer token; its secret is kept for signing only.
	pub fn set_consumer(&mut self, consumer: &OAuthToken) {
		self.consumer_secret = consumer.secret().to_owned();
		self.set("oauth_consumer_key", consumer.key());
	}

	/// Sets `oauth_token` from an access or request token; its secret is kept for signing only.
	pub fn set_token(&mut self, token: &OAuthToken) {
		self.token_secret = token.secret().to_owned();
		self.set("oauth_token", token.key());
	}

	/// Returns the value currently held under `key`, if any.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.args.iter().find(|(name, _)| name == key).map(|(_, value)| value)
	}

	/// Sorts keys by byte-wise ascending comparison, and every multi-valued parameter's
	/// list with the same comparator. This is the canonical order the OAuth 1.0a base
	/// string requires.
	pub fn normalize(&mut self) {
		self.args.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

		for (_, value) in &mut self.args {
			if let ParamValue::Many(list) = value {
				list.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
			}
		}
	}

	/// Renders the parameters as percent-encoded `key=value` pairs joined with `&`, in the
	/// set's current order.
	///
	/// Signing operates on the normalized order; query strings and form bodies may use the
	/// natural order since the signature was already fixed beforehand.
	pub fn serialize(&self) -> String {
		let mut pairs = Vec::with_capacity(self.args.len());

		for (key, value) in &self.args {
			match value {
				ParamValue::Single(single) =>
					pairs.push(format!("{}={}", percent_encode(key), percent_encode(single))),
				ParamValue::Many(list) =>
					for entry in list {
						pairs.push(format!("{}={}", percent_encode(key), percent_encode(entry)));
					},
			}
		}

		pairs.join("&")
	}

	/// Signs the set for `method` against `url` (query string excluded), stamping the
	/// current Unix time and a nonce derived from a high-resolution clock reading.
	pub fn sign(&mut self, method: &str, url: &str) {
		let now = OffsetDateTime::now_utc();
		// Nanosecond resolution keeps the nonce unique within any realistic signing window.
		let nonce = now.unix_timestamp_nanos().to_string();

		self.sign_at(method, url, now.unix_timestamp(), &nonce);
	}

	/// Signs with an explicit timestamp and nonce; [`sign`](Self::sign) supplies
	/// clock-derived values.
	///
	/// Any prior `oauth_signature` is dropped before the base string is built. The token
	/// secret participates in the signing key even when empty, as it is during the
	/// request-token exchange.
	pub fn sign_at(&mut self, method: &str, url: &str, timestamp: i64, nonce: &str) {
		self.set("oauth_signature_method", "HMAC-SHA1");
		self.set("oauth_timestamp", timestamp.to_string());
		self.set("oauth_nonce", nonce);
		self.remove("oauth_signature");
		self.normalize();

		let base = format!(
			"{}&{}&{}",
			method.to_uppercase(),
			percent_encode(url),
			percent_encode(&self.serialize()),
		);
		let key = format!(
			"{}&{}",
			percent_encode(&self.consumer_secret),
			percent_encode(&self.token_secret),
		);
		let mut mac =
			HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length.");

		mac.update(base.as_bytes());

		self.set("oauth_signature", BASE64.encode(mac.finalize().into_bytes()));
	}

	/// Renders the set as an `OAuth k1="v1", k2="v2", …` header value with every key and
	/// value percent-encoded.
	pub fn oauth_header(&self) -> String {
		let mut pairs = Vec::with_capacity(self.args.len());

		for (key, value) in &self.args {
			match value {
				ParamValue::Single(single) =>
					pairs.push(format!("{}=\"{}\"", percent_encode(key), percent_encode(single))),
				ParamValue::Many(list) =>
					for entry in list {
						pairs.push(format!("{}=\"{}\"", percent_encode(key), percent_encode(entry)));
					},
			}
		}

		format!("OAuth {}", pairs.join(", "))
	}

	fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
		let value = value.into();

		match self.args.iter_mut().find(|(name, _)| name == key) {
			Some((_, slot)) => *slot = value,
			None => self.args.push((key.to_owned(), value)),
		}
	}

	fn remove(&mut self, key: &str) {
		self.args.retain(|(name, _)| name != key);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const SEARCH_URL: &str = "https://api.twitter.com/1.1/search/tweets.json";
	const TIMESTAMP: i64 = 1_700_000_000;
	const NONCE: &str = "1700000000123456789";

	fn single(key: &str, value: &str) -> (String, ParamValue) {
		(key.to_owned(), ParamValue::from(value))
	}

	fn consumer() -> OAuthToken {
		OAuthToken::new("app-key", "app-secret").expect("Consumer fixture should be valid.")
	}

	fn access() -> OAuthToken {
		OAuthToken::new("1234-accesskey", "access-secret")
			.expect("Access token fixture should be valid.")
	}

	#[test]
	fn percent_encoding_follows_rfc3986() {
		assert_eq!(percent_encode("hello world"), "hello%20world");
		assert_eq!(percent_encode("foo=bar&baz"), "foo%3Dbar%26baz");
		assert_eq!(percent_encode("keep-this_safe.txt~"), "keep-this_safe.txt~");
		assert_eq!(percent_encode("naïve"), "na%C3%AFve");
	}

	#[test]
	fn normalize_then_serialize_is_order_independent() {
		let mut forward = OAuthParams::new([single("a", "1"), single("m", "2"), single("z", "3")]);
		let mut reverse = OAuthParams::new([single("z", "3"), single("m", "2"), single("a", "1")]);

		forward.normalize();
		reverse.normalize();

		assert_eq!(forward.serialize(), reverse.serialize());
		assert_eq!(forward.serialize(), "a=1&m=2&oauth_version=1.0&z=3");
	}

	#[test]
	fn normalize_sorts_multi_valued_lists() {
		let mut params = OAuthParams::new([(
			"tag".to_owned(),
			ParamValue::Many(vec!["zebra".to_owned(), "alpha".to_owned()]),
		)]);

		params.normalize();

		assert_eq!(params.serialize(), "oauth_version=1.0&tag=alpha&tag=zebra");
	}

	#[test]
	fn caller_supplied_oauth_version_is_preserved() {
		let params = OAuthParams::new([single("oauth_version", "1.0a")]);

		assert_eq!(params.get("oauth_version"), Some(&ParamValue::from("1.0a")));
	}

	#[test]
	fn signature_matches_reference_vector() {
		let mut params = OAuthParams::new([single("q", "test tweet")]);

		params.set_consumer(&consumer());
		params.set_token(&access());
		params.sign_at("get", SEARCH_URL, TIMESTAMP, NONCE);

		assert_eq!(
			params.get("oauth_signature"),
			Some(&ParamValue::from("WiiltgC2PTUK+aQgmEurGmJsoKw=")),
		);
		assert_eq!(
			params.serialize(),
			"oauth_consumer_key=app-key&oauth_nonce=1700000000123456789&\
			 oauth_signature_method=HMAC-SHA1&oauth_timestamp=1700000000&\
			 oauth_token=1234-accesskey&oauth_version=1.0&q=test%20tweet&\
			 oauth_signature=WiiltgC2PTUK%2BaQgmEurGmJsoKw%3D",
		);
	}

	#[test]
	fn empty_token_secret_still_joins_the_signing_key() {
		let mut params = OAuthParams::new([single("oauth_callback", "oob")]);

		params.set_consumer(&consumer());
		params.sign_at("POST", "https://twitter.com/oauth/request_token", TIMESTAMP, NONCE);

		assert_eq!(
			params.get("oauth_signature"),
			Some(&ParamValue::from("3IksF5/ISIdrkj54pvJPtBLNdVc=")),
		);
	}

	#[test]
	fn resigning_drops_the_previous_signature() {
		let mut params = OAuthParams::new([single("q", "test tweet")]);

		params.set_consumer(&consumer());
		params.set_token(&access());
		params.sign_at("GET", SEARCH_URL, TIMESTAMP - 60, "older-nonce");
		params.sign_at("GET", SEARCH_URL, TIMESTAMP, NONCE);

		assert_eq!(
			params.get("oauth_signature"),
			Some(&ParamValue::from("WiiltgC2PTUK+aQgmEurGmJsoKw=")),
		);
	}

	#[test]
	fn oauth_header_percent_encodes_keys_and_values() {
		let mut params = OAuthParams::new([single("q", "test tweet")]);

		params.set_consumer(&consumer());
		params.set_token(&access());
		params.sign_at("GET", SEARCH_URL, TIMESTAMP, NONCE);

		let header = params.oauth_header();

		assert!(header.starts_with("OAuth "));
		assert!(header.contains("oauth_consumer_key=\"app-key\""));
		assert!(header.contains("q=\"test%20tweet\""));
		assert!(header.contains("oauth_signature=\"WiiltgC2PTUK%2BaQgmEurGmJsoKw%3D\""));
	}

	#[test]
	fn sign_stamps_timestamp_and_clock_derived_nonce() {
		let mut params = OAuthParams::new([]);

		params.set_consumer(&consumer());
		params.set_token(&access());
		params.sign("GET", SEARCH_URL);

		let Some(ParamValue::Single(nonce)) = params.get("oauth_nonce") else {
			panic!("Signing should stamp a nonce.");
		};

		assert!(!nonce.is_empty());
		assert!(nonce.bytes().all(|byte| byte.is_ascii_digit()));

		let Some(ParamValue::Single(timestamp)) = params.get("oauth_timestamp") else {
			panic!("Signing should stamp a timestamp.");
		};

		assert!(timestamp.parse::<i64>().expect("Timestamp should be numeric.") > TIMESTAMP);
	}
}
