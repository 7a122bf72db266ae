//! Authenticated REST call pipeline: validate, cache, sign, dispatch, interpret.
//!
//! [`ApiClient`] executes one blocking call at a time against the versioned REST surface.
//! Per-call work is handed to a fresh [`OAuthParams`] so signing state never crosses
//! calls; the only state shared across calls is the per-path rate-limit registry and the
//! injected cache store.

// crates.io
use tracing::{debug, warn};
// self
use crate::{
	_prelude::*,
	auth::{OAuthToken, UserIdentity},
	cache::{CacheStore, cache_key},
	error::{ValidationError, classify, http_status_text},
	http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport},
	rate_limit::RateLimitSnapshot,
	sign::{OAuthParams, ParamValue, percent_encode},
};

/// REST API root; calls target `{API_BASE}/{path}.json`.
pub const API_BASE: &str = "https://api.twitter.com/1.1";
/// Fixed endpoint for the request-token leg of the OAuth dance.
pub const REQUEST_TOKEN_URL: &str = "https://twitter.com/oauth/request_token";
/// Fixed endpoint for the access-token exchange.
pub const ACCESS_TOKEN_URL: &str = "https://twitter.com/oauth/access_token";
/// Cache-key prefix used when the caller does not supply one.
pub const DEFAULT_CACHE_NAMESPACE: &str = "twitter_api_";

/// Service endpoints the client dispatches against.
///
/// Production code uses [`Default`]; tests point the set at a mock server.
#[derive(Clone, Debug)]
pub struct Endpoints {
	/// REST API root.
	pub api_base: String,
	/// Request-token exchange URL.
	pub request_token: String,
	/// Access-token exchange URL.
	pub access_token: String,
}
impl Default for Endpoints {
	fn default() -> Self {
		Self {
			api_base: API_BASE.to_owned(),
			request_token: REQUEST_TOKEN_URL.to_owned(),
			access_token: ACCESS_TOKEN_URL.to_owned(),
		}
	}
}

struct CacheConfig {
	store: Arc<dyn CacheStore>,
	ttl: Duration,
	namespace: String,
}

/// Blocking client that executes one authenticated REST call per invocation.
///
/// Not internally synchronized: mutating credentials while a signed call is in flight is
/// unsupported. Use one client per thread or serialize access externally.
pub struct ApiClient {
	consumer: OAuthToken,
	access: Option<OAuthToken>,
	transport: Arc<dyn HttpTransport>,
	endpoints: Endpoints,
	cache: Option<CacheConfig>,
	last_rate: HashMap<String, RateLimitSnapshot>,
	last_call: Option<String>,
}
impl ApiClient {
	/// Builds a client over the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(consumer: OAuthToken) -> Result<Self> {
		let transport = Arc::new(crate::http::ReqwestTransport::new()?);

		Ok(Self::with_transport(consumer, transport))
	}

	/// Builds a client over a caller-provided transport.
	pub fn with_transport(consumer: OAuthToken, transport: Arc<impl HttpTransport + 'static>) -> Self {
		Self {
			consumer,
			access: None,
			transport,
			endpoints: Endpoints::default(),
			cache: None,
			last_rate: HashMap::new(),
			last_call: None,
		}
	}

	/// Replaces both credential pairs; an empty access pair leaves the client
	/// unauthenticated for REST calls.
	pub fn set_oauth(
		&mut self,
		consumer_key: &str,
		consumer_secret: &str,
		access_key: &str,
		access_secret: &str,
	) -> Result<&mut Self, ValidationError> {
		self.deauthorize();

		self.consumer = OAuthToken::new(consumer_key, consumer_secret)?;

		if !access_key.is_empty() && !access_secret.is_empty() {
			self.access = Some(OAuthToken::new(access_key, access_secret)?);
		}

		Ok(self)
	}

	/// Replaces the consumer token.
	pub fn set_oauth_consumer(&mut self, token: OAuthToken) -> &mut Self {
		self.consumer = token;

		self
	}

	/// Replaces the access (or request) token.
	pub fn set_oauth_access(&mut self, token: OAuthToken) -> &mut Self {
		self.access = Some(token);

		self
	}

	/// Drops the access token. Useful after the provider reports revoked credentials.
	pub fn deauthorize(&mut self) -> &mut Self {
		self.access = None;

		self
	}

	/// Whether the client holds a full credential set. Does not validate them remotely.
	pub fn has_auth(&self) -> bool {
		self.access.as_ref().is_some_and(|token| !token.secret().is_empty())
	}

	/// Redirects subsequent calls at a different endpoint set (mock servers, proxies).
	pub fn set_endpoints(&mut self, endpoints: Endpoints) -> &mut Self {
		self.endpoints = endpoints;

		self
	}

	/// Enables caching of GET responses in `store` under `namespace`-prefixed keys.
	///
	/// A zero TTL delegates "no expiry" semantics to the store.
	pub fn enable_cache(
		&mut self,
		store: Arc<dyn CacheStore>,
		ttl: Duration,
		namespace: impl Into<String>,
	) -> &mut Self {
		self.cache = Some(CacheConfig { store, ttl, namespace: namespace.into() });

		self
	}

	/// Disables caching for subsequent calls. Existing entries expire on their own.
	pub fn disable_cache(&mut self) -> &mut Self {
		self.cache = None;

		self
	}

	/// Executes one authenticated call and returns the parsed structured response.
	///
	/// `path` is the versioned API method (for example `search/tweets`), `method` the HTTP
	/// verb. Argument values follow the sanitization rules: strings pass through, `true`
	/// becomes `"true"`, `false`/null become `"false"`, numbers render in string form, and
	/// arrays or objects are rejected before any I/O.
	pub fn call(&mut self, path: &str, args: &[(&str, Value)], method: &str) -> Result<Value> {
		if !self.has_auth() {
			return Err(Error::Authentication);
		}

		let args = sanitize_args(args)?;
		let cachekey = match (&self.cache, HttpMethod::parse(method)) {
			(Some(cache), Ok(HttpMethod::Get)) => {
				let token_key =
					self.access.as_ref().map(OAuthToken::key).unwrap_or_default();
				let key =
					cache_key(&cache.namespace, path, &serialize_args(&args), token_key);

				if let Some(hit) = cache.store.get(&key) {
					debug!(path, "serving cached response");

					return Ok(hit);
				}

				Some(key)
			},
			_ => None,
		};
		let response = self.rest_request(path, &args, method)?;
		let status = response.status;
		let data = match serde_json::from_str::<Value>(&response.body) {
			Ok(value) if value.is_object() || value.is_array() => value,
			_ => {
				let raw = response.body.trim();
				let message =
					if raw.is_empty() { http_status_text(status) } else { raw.to_owned() };

				return Err(Error::Protocol { status, message });
			},
		};

		if let Some(errors) = data.get("errors").and_then(Value::as_array).filter(|list| !list.is_empty())
		{
			// Entries are drained in order; every error but the last is advisory.
			for (index, entry) in errors.iter().enumerate() {
				let code = entry.get("code").and_then(Value::as_i64).unwrap_or(-1);
				let message = entry.get("message").and_then(Value::as_str).unwrap_or_default();

				if index + 1 < errors.len() {
					warn!(code, error = message, "advisory Twitter error");
				} else {
					return Err(classify(status, code, message).into());
				}
			}
		}

		self.last_call = Some(path.to_owned());

		if let Some(snapshot) = RateLimitSnapshot::from_response(&response) {
			self.last_rate.insert(path.to_owned(), snapshot);
		}
		if let (Some(key), Some(cache)) = (cachekey, &self.cache) {
			cache.store.put(&key, data.clone(), cache.ttl);
		}

		Ok(data)
	}

	/// Executes one authenticated call and returns the raw response triple, bypassing
	/// caching, parsing, error classification, and rate-limit bookkeeping.
	pub fn raw(&mut self, path: &str, args: &[(&str, Value)], method: &str) -> Result<HttpResponse> {
		if !self.has_auth() {
			return Err(Error::Authentication);
		}

		let args = sanitize_args(args)?;

		self.rest_request(path, &args, method)
	}

	/// Contacts the provider for a request token, later exchanged for an access token.
	///
	/// `callback` is the return URL, or `oob` for out-of-band (desktop) flows.
	pub fn request_token(&self, callback: &str) -> Result<OAuthToken> {
		let endpoint = self.endpoints.request_token.clone();
		let params =
			self.oauth_exchange(&endpoint, vec![("oauth_callback".to_owned(), callback.to_owned())])?;

		exchange_token(&params)
	}

	/// Exchanges the held request token for an access token after the user authorized it.
	///
	/// The request token must already be attached via [`set_oauth_access`](Self::set_oauth_access).
	/// The returned token carries the provider-reported [`UserIdentity`] when present.
	pub fn access_token(&self, verifier: &str) -> Result<OAuthToken> {
		let endpoint = self.endpoints.access_token.clone();
		let params =
			self.oauth_exchange(&endpoint, vec![("oauth_verifier".to_owned(), verifier.to_owned())])?;
		let mut token = exchange_token(&params)?;

		if let (Some(id), Some(screen_name)) = (lookup(&params, "user_id"), lookup(&params, "screen_name"))
		{
			token = token.with_user(UserIdentity {
				id: id.to_owned(),
				screen_name: screen_name.to_owned(),
			});
		}

		Ok(token)
	}

	/// Most recent rate-limit snapshot for `path`, defaulting to the last called path when
	/// `path` is empty. Never triggers network activity.
	pub fn last_rate_limit_data(&self, path: &str) -> Option<&RateLimitSnapshot> {
		let path = if path.is_empty() { self.last_call.as_deref()? } else { path };

		self.last_rate.get(path)
	}

	/// Window allowance from the most recent snapshot for `path`.
	pub fn last_rate_limit_allowance(&self, path: &str) -> Option<u32> {
		self.last_rate_limit_data(path).map(|snapshot| snapshot.limit)
	}

	/// Calls remaining from the most recent snapshot for `path`.
	pub fn last_rate_limit_remaining(&self, path: &str) -> Option<u32> {
		self.last_rate_limit_data(path).map(|snapshot| snapshot.remaining)
	}

	/// Window reset epoch from the most recent snapshot for `path`.
	pub fn last_rate_limit_reset(&self, path: &str) -> Option<i64> {
		self.last_rate_limit_data(path).map(|snapshot| snapshot.reset)
	}

	/// Signs and dispatches one REST call; shared by [`call`](Self::call) and
	/// [`raw`](Self::raw).
	fn rest_request(&self, path: &str, args: &[(String, String)], method: &str) -> Result<HttpResponse> {
		let access = self.access.as_ref().ok_or(Error::Authentication)?;
		// The query string is excluded from the URL at signing time.
		let endpoint = format!("{}/{path}.json", self.endpoints.api_base);
		let mut params = OAuthParams::new(
			args.iter().map(|(key, value)| (key.clone(), ParamValue::from(value.clone()))),
		);

		params.set_consumer(&self.consumer);
		params.set_token(access);
		params.sign(method, &endpoint);

		let method = HttpMethod::parse(method)?;
		let request = match method {
			HttpMethod::Get => HttpRequest {
				method,
				url: format!("{endpoint}?{}", params.serialize()),
				headers: Vec::new(),
				body: None,
			},
			HttpMethod::Post => HttpRequest {
				method,
				url: endpoint,
				headers: vec![("Authorization".to_owned(), params.oauth_header())],
				body: Some(params.serialize()),
			},
		};

		debug!(path, method = %request.method, "dispatching signed request");

		Ok(self.transport.execute(&request)?)
	}

	/// Performs an OAuth token-exchange request; these differ from regular API calls in
	/// that all parameters travel in the `Authorization` header and the response body is
	/// form-urlencoded rather than JSON.
	fn oauth_exchange(&self, endpoint: &str, args: Vec<(String, String)>) -> Result<Vec<(String, String)>> {
		let mut params =
			OAuthParams::new(args.into_iter().map(|(key, value)| (key, ParamValue::Single(value))));

		params.set_consumer(&self.consumer);

		if let Some(access) = &self.access {
			params.set_token(access);
		}

		params.sign("POST", endpoint);

		let request = HttpRequest {
			method: HttpMethod::Post,
			url: endpoint.to_owned(),
			headers: vec![("Authorization".to_owned(), params.oauth_header())],
			body: None,
		};
		let response = self.transport.execute(&request)?;
		let body = response.body.trim();

		if response.status != 200 {
			return Err(classify(response.status, -1, body).into());
		}

		Ok(url::form_urlencoded::parse(body.as_bytes()).into_owned().collect())
	}
}

fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
	params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
}

/// Builds a token from an exchange response, which must carry both `oauth_token` and
/// `oauth_token_secret`.
fn exchange_token(params: &[(String, String)]) -> Result<OAuthToken> {
	match (lookup(params, "oauth_token"), lookup(params, "oauth_token_secret")) {
		(Some(key), Some(secret)) => Ok(OAuthToken::new(key, secret)?),
		_ => Err(Error::Protocol { status: 200, message: "Malformed response from Twitter".to_owned() }),
	}
}

/// Renders every argument value as a string, rejecting non-scalar values before any I/O.
fn sanitize_args(args: &[(&str, Value)]) -> Result<Vec<(String, String)>, ValidationError> {
	args.iter()
		.map(|(key, value)| {
			let rendered = match value {
				Value::String(text) => text.clone(),
				Value::Bool(true) => "true".to_owned(),
				Value::Bool(false) | Value::Null => "false".to_owned(),
				Value::Number(number) => number.to_string(),
				Value::Array(_) =>
					return Err(ValidationError::NonScalarArgument {
						name: (*key).to_owned(),
						kind: "array",
					}),
				Value::Object(_) =>
					return Err(ValidationError::NonScalarArgument {
						name: (*key).to_owned(),
						kind: "object",
					}),
			};

			Ok(((*key).to_owned(), rendered))
		})
		.collect()
}

/// Deterministic serialization of sanitized arguments, fingerprinted into cache keys.
fn serialize_args(args: &[(String, String)]) -> String {
	args.iter()
		.map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>()
		.join("&")
}
