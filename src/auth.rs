//! OAuth 1.0a token material and the fixed user-facing authorization URLs.

// self
use crate::{_prelude::*, error::ValidationError, sign::percent_encode};

/// Endpoint a user visits to authorize an application (always prompts).
pub const AUTHORIZE_URL: &str = "https://twitter.com/oauth/authorize";
/// Endpoint a user visits to authenticate (skips the prompt for known apps).
pub const AUTHENTICATE_URL: &str = "https://twitter.com/oauth/authenticate";

/// Immutable OAuth key/secret pair with optional identity metadata.
///
/// The secret may legitimately be empty during the request-token phase; the key never is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthToken {
	key: String,
	secret: String,
	verifier: Option<String>,
	user: Option<UserIdentity>,
}
impl OAuthToken {
	/// Creates a token, rejecting an empty key with [`ValidationError::EmptyTokenKey`].
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, ValidationError> {
		let key = key.into();

		if key.is_empty() {
			return Err(ValidationError::EmptyTokenKey);
		}

		Ok(Self { key, secret: secret.into(), verifier: None, user: None })
	}

	/// Attaches a verifier passed back from the authorization redirect.
	pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
		self.verifier = Some(verifier.into());

		self
	}

	/// Attaches the account identity returned alongside an access token.
	pub fn with_user(mut self, user: UserIdentity) -> Self {
		self.user = Some(user);

		self
	}

	/// Public token key.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Token secret; empty during the request-token phase.
	pub fn secret(&self) -> &str {
		&self.secret
	}

	/// Verifier from the authorization redirect, if one was attached.
	pub fn verifier(&self) -> Option<&str> {
		self.verifier.as_deref()
	}

	/// Account identity from the access-token exchange, if known.
	pub fn user(&self) -> Option<&UserIdentity> {
		self.user.as_ref()
	}

	/// URL a user visits to authorize the application with this request token.
	pub fn authorization_url(&self) -> String {
		format!("{AUTHORIZE_URL}?oauth_token={}", percent_encode(&self.key))
	}

	/// URL a user visits to authenticate with this request token.
	pub fn authentication_url(&self) -> String {
		format!("{AUTHENTICATE_URL}?oauth_token={}", percent_encode(&self.key))
	}
}

/// Account identity returned alongside an access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
	/// Numeric account identifier, in the string form the provider reports.
	pub id: String,
	/// Handle associated with the account.
	pub screen_name: String,
}
