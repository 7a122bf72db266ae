//! Injected cache capability for GET responses, plus the in-memory reference store.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Capability contract for response caches.
///
/// The store owns TTL-based expiry; the client never invalidates entries explicitly.
pub trait CacheStore
where
	Self: Send + Sync,
{
	/// Stores `value` under `key` for at most `ttl`. A zero TTL means no expiry.
	fn put(&self, key: &str, value: Value, ttl: Duration);

	/// Returns the value stored under `key`, when present and unexpired.
	fn get(&self, key: &str) -> Option<Value>;
}

/// Thread-safe in-process store for tests and single-host deployments.
#[derive(Debug, Default)]
pub struct MemoryCache(RwLock<HashMap<String, (Value, Option<OffsetDateTime>)>>);
impl CacheStore for MemoryCache {
	fn put(&self, key: &str, value: Value, ttl: Duration) {
		let expires_at = (!ttl.is_zero()).then(|| OffsetDateTime::now_utc() + ttl);

		self.0.write().insert(key.to_owned(), (value, expires_at));
	}

	fn get(&self, key: &str) -> Option<Value> {
		let guard = self.0.read();
		let (value, expires_at) = guard.get(key)?;

		match expires_at {
			Some(deadline) if OffsetDateTime::now_utc() >= *deadline => None,
			_ => Some(value.clone()),
		}
	}
}

/// Builds the cache key for a sanitized GET call: namespace, path, and a fingerprint of
/// the serialized arguments, suffixed with the numeric account discriminator extracted
/// from the token key when one is present.
pub fn cache_key(namespace: &str, path: &str, serialized_args: &str, token_key: &str) -> String {
	let digest = Sha256::digest(serialized_args.as_bytes());
	let fingerprint: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
	let mut key = format!("{namespace}{path}_{fingerprint}");

	if let Some(account) = account_discriminator(token_key) {
		key.push('_');
		key.push_str(account);
	}

	key
}

/// Digits preceding the first `-` of an access-token key identify the account.
fn account_discriminator(token_key: &str) -> Option<&str> {
	let (digits, _) = token_key.split_once('-')?;

	(!digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())).then_some(digits)
}
