//! Thin client for the external text-classification service.
//!
//! Structurally the same call/parse/classify shape as the REST core, but with a far
//! simpler auth scheme: a static shared key appended to each form-encoded POST, no OAuth.
//! Success is indicated by an explicit status flag in the reply envelope; failure by a
//! code/message pair. Kept deliberately outside the signing core.

// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{HttpMethod, HttpRequest, HttpTransport},
};

/// Service root the classification endpoints hang off.
pub const SENTIMENT_API_BASE: &str = "http://api.datumbox.com/1.0";

/// Failures raised by the classification collaborator.
#[derive(Debug, ThisError)]
pub enum SentimentError {
	/// Network failure reaching the classification service.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Reply did not match the documented envelope shape.
	#[error("Malformed reply from the classification service.")]
	Malformed {
		/// Structured parse failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Provider-reported failure with its code and message.
	#[error("Classification service error {code}: {message}.")]
	Service {
		/// Provider error code.
		code: i64,
		/// Provider error text.
		message: String,
	},
	/// Envelope parsed but carried neither a usable result nor an error.
	#[error("Classification service reply carried no result.")]
	MissingResult,
}

#[derive(Debug, Deserialize)]
struct Envelope {
	output: Option<EnvelopeOutput>,
	error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeOutput {
	status: i64,
	result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
	#[serde(rename = "ErrorCode")]
	code: i64,
	#[serde(rename = "ErrorMessage")]
	message: String,
}

/// Client holding the static shared key for the classification service.
pub struct SentimentClient {
	api_key: String,
	base: String,
	transport: Arc<dyn HttpTransport>,
}
impl SentimentClient {
	/// Builds a client over the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(api_key: impl Into<String>) -> Result<Self, TransportError> {
		let transport = Arc::new(crate::http::ReqwestTransport::new()?);

		Ok(Self::with_transport(api_key, transport))
	}

	/// Builds a client over a caller-provided transport.
	pub fn with_transport(
		api_key: impl Into<String>,
		transport: Arc<impl HttpTransport + 'static>,
	) -> Self {
		Self { api_key: api_key.into(), base: SENTIMENT_API_BASE.to_owned(), transport }
	}

	/// Redirects subsequent calls at a different service root (mock servers).
	pub fn with_base(mut self, base: impl Into<String>) -> Self {
		self.base = base.into();

		self
	}

	/// Classifies general text as `positive`, `negative`, or `neutral`.
	pub fn sentiment(&self, text: &str) -> Result<String, SentimentError> {
		self.call_label("SentimentAnalysis", text)
	}

	/// Classifies tweet text as `positive`, `negative`, or `neutral`; tuned for the short,
	/// noisy register of tweets.
	pub fn twitter_sentiment(&self, text: &str) -> Result<String, SentimentError> {
		self.call_label("TwitterSentimentAnalysis", text)
	}

	/// Classifies text as `objective` or `subjective`.
	pub fn subjectivity(&self, text: &str) -> Result<String, SentimentError> {
		self.call_label("SubjectivityAnalysis", text)
	}

	/// Detects the ISO 639-1 language code of the text.
	pub fn language(&self, text: &str) -> Result<String, SentimentError> {
		self.call_label("LanguageDetection", text)
	}

	fn call_label(&self, operation: &str, text: &str) -> Result<String, SentimentError> {
		self.call_service(operation, text)?
			.as_str()
			.map(str::to_owned)
			.ok_or(SentimentError::MissingResult)
	}

	fn call_service(&self, operation: &str, text: &str) -> Result<Value, SentimentError> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("text", text)
			.append_pair("api_key", &self.api_key)
			.finish();
		let request = HttpRequest {
			method: HttpMethod::Post,
			url: format!("{}/{operation}.json", self.base),
			headers: Vec::new(),
			body: Some(body),
		};
		let response = self.transport.execute(&request)?;
		let deserializer = &mut serde_json::Deserializer::from_str(&response.body);
		let envelope: Envelope = serde_path_to_error::deserialize(deserializer)
			.map_err(|source| SentimentError::Malformed { source })?;

		if let Some(output) = envelope.output
			&& output.status == 1
			&& let Some(result) = output.result
		{
			return Ok(result);
		}
		if let Some(error) = envelope.error {
			return Err(SentimentError::Service { code: error.code, message: error.message });
		}

		Err(SentimentError::MissingResult)
	}
}
